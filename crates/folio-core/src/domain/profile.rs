use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const MAX_BIO_CHARS: usize = 500;

/// Declares a lowercase string-backed enum with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])* $name:ident, $field:literal,
        { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(DomainError::validation(
                        $field,
                        concat!("must be one of", $(" ", $text),+),
                    )),
                }
            }
        }
    };
}

string_enum!(
    /// Proficiency for a listed skill.
    #[derive(Default)]
    SkillLevel, "level", {
        Basic => "basic",
        #[default]
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
    }
);

string_enum!(
    #[derive(Default)]
    SkillCategory, "category", {
        Frontend => "frontend",
        Backend => "backend",
        Database => "database",
        Tools => "tools",
        #[default]
        Other => "other",
    }
);

string_enum!(
    /// Spoken-language fluency.
    LanguageLevel, "level", {
        Basic => "basic",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Native => "native",
    }
);

/// An owned sub-collection item, addressed by its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Entry<T> {
    pub fn new(fields: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceFields {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationFields {
    pub degree: String,
    pub institution: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFields {
    pub name: String,
    pub category: SkillCategory,
    pub level: SkillLevel,
}

pub type Experience = Entry<ExperienceFields>;
pub type Education = Entry<EducationFields>;
pub type Skill = Entry<SkillFields>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub level: Option<LanguageLevel>,
}

/// The scalar profile fields clients may set on create and update.
#[derive(Debug, Clone, Default)]
pub struct ProfileDetails {
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
    pub languages: Vec<Language>,
}

/// Profile entity - the single résumé of the site owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
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
    pub languages: Vec<Language>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(details: ProfileDetails) -> Self {
        let now = Utc::now();
        let mut profile = Self {
            name: String::new(),
            title: String::new(),
            bio: None,
            email: String::new(),
            phone: None,
            location: None,
            website: None,
            github: None,
            linkedin: None,
            twitter: None,
            languages: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        profile.set_details(details);
        profile
    }

    /// Replace the scalar fields, leaving the sub-collections untouched.
    pub fn update_details(&mut self, details: ProfileDetails) {
        self.set_details(details);
        self.updated_at = Utc::now();
    }

    pub fn add_experience(&mut self, fields: ExperienceFields) -> Uuid {
        self.updated_at = Utc::now();
        push_entry(&mut self.experience, fields)
    }

    pub fn update_experience(
        &mut self,
        id: Uuid,
        fields: ExperienceFields,
    ) -> Result<(), DomainError> {
        replace_entry(&mut self.experience, "Experience", id, fields)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_experience(&mut self, id: Uuid) -> Result<(), DomainError> {
        remove_entry(&mut self.experience, "Experience", id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_education(&mut self, fields: EducationFields) -> Uuid {
        self.updated_at = Utc::now();
        push_entry(&mut self.education, fields)
    }

    pub fn update_education(
        &mut self,
        id: Uuid,
        fields: EducationFields,
    ) -> Result<(), DomainError> {
        replace_entry(&mut self.education, "Education", id, fields)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_education(&mut self, id: Uuid) -> Result<(), DomainError> {
        remove_entry(&mut self.education, "Education", id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_skill(&mut self, fields: SkillFields) -> Uuid {
        self.updated_at = Utc::now();
        push_entry(&mut self.skills, fields)
    }

    pub fn update_skill(
        &mut self,
        id: Uuid,
        fields: SkillFields,
    ) -> Result<(), DomainError> {
        replace_entry(&mut self.skills, "Skill", id, fields)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_skill(&mut self, id: Uuid) -> Result<(), DomainError> {
        remove_entry(&mut self.skills, "Skill", id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn set_details(&mut self, details: ProfileDetails) {
        self.name = details.name;
        self.title = details.title;
        self.bio = details.bio;
        self.email = details.email;
        self.phone = details.phone;
        self.location = details.location;
        self.website = details.website;
        self.github = details.github;
        self.linkedin = details.linkedin;
        self.twitter = details.twitter;
        self.languages = details.languages;
    }
}

fn push_entry<T>(entries: &mut Vec<Entry<T>>, fields: T) -> Uuid {
    let entry = Entry::new(fields);
    let id = entry.id;
    entries.push(entry);
    id
}

fn replace_entry<T>(
    entries: &mut [Entry<T>],
    entity_type: &'static str,
    id: Uuid,
    fields: T,
) -> Result<(), DomainError> {
    let entry = entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| DomainError::not_found(entity_type, id))?;
    entry.fields = fields;
    Ok(())
}

fn remove_entry<T>(
    entries: &mut Vec<Entry<T>>,
    entity_type: &'static str,
    id: Uuid,
) -> Result<(), DomainError> {
    let before = entries.len();
    entries.retain(|e| e.id != id);
    if entries.len() == before {
        return Err(DomainError::not_found(entity_type, id));
    }
    Ok(())
}
