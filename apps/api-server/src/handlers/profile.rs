//! Profile handlers: the site owner's résumé and its sub-collections.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::DomainError;
use folio_core::domain::{
    EducationFields, ExperienceFields, Language, LanguageLevel, MAX_BIO_CHARS, Profile,
    ProfileDetails, SkillCategory, SkillFields, SkillLevel,
};
use folio_core::error::RepoError;
use folio_shared::dto::{EducationRequest, ExperienceRequest, ProfileRequest, SkillRequest};
use folio_shared::{ApiResponse, Validate, Violations};

use super::{created, non_blank, ok, push_domain_error, validate};
use crate::middleware::auth::AdminUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Profile not found".to_string())
}

fn updated(profile: Profile, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok_with_message(profile, message))
}

async fn load(state: &AppState) -> AppResult<Profile> {
    state.profile.get().await?.ok_or_else(not_found)
}

/// Edit the stored profile in place; concurrent edits apply one after another.
async fn modify<F>(state: &AppState, mutation: F) -> AppResult<Profile>
where
    F: FnOnce(&mut Profile) -> Result<(), DomainError> + Send + 'static,
{
    state
        .profile
        .modify(Box::new(mutation))
        .await
        .map_err(|e| match e {
            RepoError::NotFound => not_found(),
            other => other.into(),
        })
}

/// Parse an optional enum value; a blank value means "use the default".
fn parse_or_default<T>(v: &mut Violations, raw: Option<String>) -> T
where
    T: std::str::FromStr<Err = DomainError> + Default,
{
    match non_blank(raw) {
        None => T::default(),
        Some(raw) => raw.to_lowercase().parse().unwrap_or_else(|e| {
            push_domain_error(v, e);
            T::default()
        }),
    }
}

fn details_from(req: ProfileRequest) -> AppResult<ProfileDetails> {
    let mut v = Violations::new();
    if let Err(errors) = req.validate() {
        v.extend(errors);
    }
    if let Some(bio) = &req.bio {
        v.max_chars("bio", bio, MAX_BIO_CHARS);
    }

    let mut languages = Vec::with_capacity(req.languages.len());
    for (i, language) in req.languages.into_iter().enumerate() {
        let level = match non_blank(language.level) {
            None => None,
            Some(raw) => match raw.to_lowercase().parse::<LanguageLevel>() {
                Ok(level) => Some(level),
                Err(DomainError::Validation { field, message }) => {
                    v.push(format!("languages[{i}].{field}"), message);
                    None
                }
                Err(other) => {
                    push_domain_error(&mut v, other);
                    None
                }
            },
        };
        languages.push(Language {
            name: language.name.trim().to_string(),
            level,
        });
    }

    v.into_result().map_err(AppError::Validation)?;

    Ok(ProfileDetails {
        name: req.name.trim().to_string(),
        title: req.title.trim().to_string(),
        bio: non_blank(req.bio),
        email: req.email.trim().to_string(),
        phone: non_blank(req.phone),
        location: non_blank(req.location),
        website: non_blank(req.website),
        github: non_blank(req.github),
        linkedin: non_blank(req.linkedin),
        twitter: non_blank(req.twitter),
        languages,
    })
}

fn experience_from(req: ExperienceRequest) -> AppResult<ExperienceFields> {
    validate(&req)?;
    let start_date = req
        .start_date
        .ok_or_else(|| AppError::validation("start_date", "is required"))?;

    Ok(ExperienceFields {
        title: req.title.trim().to_string(),
        company: req.company.trim().to_string(),
        location: non_blank(req.location),
        start_date,
        end_date: req.end_date,
        current: req.current,
        description: non_blank(req.description),
    })
}

fn education_from(req: EducationRequest) -> AppResult<EducationFields> {
    validate(&req)?;

    Ok(EducationFields {
        degree: req.degree.trim().to_string(),
        institution: req.institution.trim().to_string(),
        location: non_blank(req.location),
        start_date: req.start_date,
        end_date: req.end_date,
        current: req.current,
        description: non_blank(req.description),
    })
}

fn skill_from(req: SkillRequest) -> AppResult<SkillFields> {
    let mut v = Violations::new();
    if let Err(errors) = req.validate() {
        v.extend(errors);
    }
    let category: SkillCategory = parse_or_default(&mut v, req.category);
    let level: SkillLevel = parse_or_default(&mut v, req.level);
    v.into_result().map_err(AppError::Validation)?;

    Ok(SkillFields {
        name: req.name.trim().to_string(),
        category,
        level,
    })
}

/// GET /api/profile
pub async fn get_profile(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(ok(load(&state).await?))
}

/// POST /api/profile
pub async fn create_profile(
    state: web::Data<AppState>,
    admin: AdminUser,
    body: web::Json<ProfileRequest>,
) -> AppResult<HttpResponse> {
    let details = details_from(body.into_inner())?;

    let profile = state
        .profile
        .create(Profile::new(details))
        .await
        .map_err(|e| match e {
            RepoError::Constraint(_) => AppError::Conflict("Profile already exists".to_string()),
            other => other.into(),
        })?;

    tracing::info!(admin_id = %admin.id, "Profile created");

    Ok(created(profile, "Profile created successfully"))
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<ProfileRequest>,
) -> AppResult<HttpResponse> {
    let details = details_from(body.into_inner())?;

    let profile = modify(&state, move |p| {
        p.update_details(details);
        Ok(())
    })
    .await?;

    Ok(updated(profile, "Profile updated successfully"))
}

/// POST /api/profile/experience
pub async fn add_experience(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<ExperienceRequest>,
) -> AppResult<HttpResponse> {
    let fields = experience_from(body.into_inner())?;

    let profile = modify(&state, move |p| {
        p.add_experience(fields);
        Ok(())
    })
    .await?;

    tracing::debug!(experience_id = ?profile.experience.last().map(|e| e.id), "Experience added");
    Ok(created(profile, "Experience added"))
}

/// PUT /api/profile/experience/{id}
pub async fn update_experience(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<ExperienceRequest>,
) -> AppResult<HttpResponse> {
    let fields = experience_from(body.into_inner())?;

    let id = path.into_inner();
    let profile = modify(&state, move |p| p.update_experience(id, fields)).await?;

    Ok(updated(profile, "Experience updated"))
}

/// DELETE /api/profile/experience/{id}
pub async fn delete_experience(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let profile = modify(&state, move |p| p.remove_experience(id)).await?;

    Ok(updated(profile, "Experience removed"))
}

/// POST /api/profile/education
pub async fn add_education(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<EducationRequest>,
) -> AppResult<HttpResponse> {
    let fields = education_from(body.into_inner())?;

    let profile = modify(&state, move |p| {
        p.add_education(fields);
        Ok(())
    })
    .await?;

    tracing::debug!(education_id = ?profile.education.last().map(|e| e.id), "Education added");
    Ok(created(profile, "Education added"))
}

/// PUT /api/profile/education/{id}
pub async fn update_education(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<EducationRequest>,
) -> AppResult<HttpResponse> {
    let fields = education_from(body.into_inner())?;

    let id = path.into_inner();
    let profile = modify(&state, move |p| p.update_education(id, fields)).await?;

    Ok(updated(profile, "Education updated"))
}

/// DELETE /api/profile/education/{id}
pub async fn delete_education(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let profile = modify(&state, move |p| p.remove_education(id)).await?;

    Ok(updated(profile, "Education removed"))
}

/// POST /api/profile/skills
pub async fn add_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    body: web::Json<SkillRequest>,
) -> AppResult<HttpResponse> {
    let fields = skill_from(body.into_inner())?;

    let profile = modify(&state, move |p| {
        p.add_skill(fields);
        Ok(())
    })
    .await?;

    tracing::debug!(skill_id = ?profile.skills.last().map(|e| e.id), "Skill added");
    Ok(created(profile, "Skill added"))
}

/// PUT /api/profile/skills/{id}
pub async fn update_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<SkillRequest>,
) -> AppResult<HttpResponse> {
    let fields = skill_from(body.into_inner())?;

    let id = path.into_inner();
    let profile = modify(&state, move |p| p.update_skill(id, fields)).await?;

    Ok(updated(profile, "Skill updated"))
}

/// DELETE /api/profile/skills/{id}
pub async fn delete_skill(
    state: web::Data<AppState>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let profile = modify(&state, move |p| p.remove_skill(id)).await?;

    Ok(updated(profile, "Skill removed"))
}
