//! Data Transfer Objects - request/response types for the API.
//!
//! String fields default to empty so that a missing field surfaces as a
//! field-level validation error instead of a body parse failure.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::FieldError;
use crate::validation::{Validate, Violations, is_username};

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        let username = self.username.trim();
        v.min_chars("username", username, MIN_USERNAME_CHARS);
        v.check(
            username.is_empty() || is_username(username),
            "username",
            "may only contain letters, digits and underscores",
        );
        v.email("email", &self.email);
        v.check(
            self.password.chars().count() >= MIN_PASSWORD_CHARS,
            "password",
            format!("must be at least {MIN_PASSWORD_CHARS} characters"),
        );
        v.into_result()
    }
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.email("email", &self.email);
        v.check(!self.password.is_empty(), "password", "is required");
        v.into_result()
    }
}

/// A user's public information. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Issued credentials plus the account they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

/// Body of post create and update. Only these fields are writable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub slug: Option<String>,
    pub summary: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

impl Validate for PostRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.require("title", &self.title);
        v.require("summary", &self.summary);
        v.require("content", &self.content);
        v.into_result()
    }
}

/// Query string of the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPostsQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    /// `None` when the author account no longer exists.
    pub author: Option<AuthorSummary>,
    pub cover_image: Option<String>,
    pub published: bool,
    pub views: i64,
    pub read_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: i64,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageRequest {
    pub name: String,
    pub level: Option<String>,
}

/// Body of profile create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub name: String,
    pub title: String,
    pub bio: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub languages: Vec<LanguageRequest>,
}

impl Validate for ProfileRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.require("name", &self.name);
        v.require("title", &self.title);
        v.email("email", &self.email);
        for (i, language) in self.languages.iter().enumerate() {
            v.require(&format!("languages[{i}].name"), &language.name);
        }
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRequest {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl Validate for ExperienceRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.require("title", &self.title);
        v.require("company", &self.company);
        v.check(self.start_date.is_some(), "start_date", "is required");
        check_date_order(&mut v, self.start_date, self.end_date);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRequest {
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

impl Validate for EducationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.require("degree", &self.degree);
        v.require("institution", &self.institution);
        check_date_order(&mut v, self.start_date, self.end_date);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRequest {
    pub name: String,
    pub category: Option<String>,
    pub level: Option<String>,
}

impl Validate for SkillRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut v = Violations::new();
        v.require("name", &self.name);
        v.into_result()
    }
}

fn check_date_order(v: &mut Violations, start: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let (Some(start), Some(end)) = (start, end) {
        v.check(end >= start, "end_date", "must not be before start_date");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(result: Result<(), Vec<FieldError>>) -> Vec<String> {
        result
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_register_rules() {
        let ok = RegisterUserRequest {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterUserRequest {
            username: "a-".to_string(),
            email: "ada".to_string(),
            password: "123".to_string(),
        };
        assert_eq!(
            fields(bad.validate()),
            vec!["username", "username", "email", "password"]
        );
    }

    #[test]
    fn test_missing_json_fields_become_validation_errors() {
        let req: PostRequest = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(fields(req.validate()), vec!["summary", "content"]);
    }

    #[test]
    fn test_experience_requires_start_date_and_order() {
        let req = ExperienceRequest {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_date: NaiveDate::from_ymd_opt(2022, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2021, 1, 1),
            ..Default::default()
        };
        assert_eq!(fields(req.validate()), vec!["end_date"]);

        let req = ExperienceRequest {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            ..Default::default()
        };
        assert_eq!(fields(req.validate()), vec!["start_date"]);
    }

    #[test]
    fn test_profile_language_names_required() {
        let req = ProfileRequest {
            name: "Grace".to_string(),
            title: "Engineer".to_string(),
            email: "grace@example.com".to_string(),
            languages: vec![LanguageRequest::default()],
            ..Default::default()
        };
        assert_eq!(fields(req.validate()), vec!["languages[0].name"]);
    }
}
