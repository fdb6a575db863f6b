//! Profile entity for SeaORM.
//!
//! The table holds at most one row, keyed by [`SINGLETON_ID`]; the primary key
//! constraint is what rejects a second profile.

use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

use folio_core::domain::{Education, Experience, Language, Skill};

pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Languages(pub Vec<Language>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ExperienceList(pub Vec<Experience>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct EducationList(pub Vec<Education>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SkillList(pub Vec<Skill>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub languages: Languages,
    #[sea_orm(column_type = "JsonBinary")]
    pub experience: ExperienceList,
    #[sea_orm(column_type = "JsonBinary")]
    pub education: EducationList,
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: SkillList,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for folio_core::domain::Profile {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            title: model.title,
            bio: model.bio,
            email: model.email,
            phone: model.phone,
            location: model.location,
            website: model.website,
            github: model.github,
            linkedin: model.linkedin,
            twitter: model.twitter,
            languages: model.languages.0,
            experience: model.experience.0,
            education: model.education.0,
            skills: model.skills.0,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<folio_core::domain::Profile> for ActiveModel {
    fn from(profile: folio_core::domain::Profile) -> Self {
        Self {
            id: Set(SINGLETON_ID),
            name: Set(profile.name),
            title: Set(profile.title),
            bio: Set(profile.bio),
            email: Set(profile.email),
            phone: Set(profile.phone),
            location: Set(profile.location),
            website: Set(profile.website),
            github: Set(profile.github),
            linkedin: Set(profile.linkedin),
            twitter: Set(profile.twitter),
            languages: Set(Languages(profile.languages)),
            experience: Set(ExperienceList(profile.experience)),
            education: Set(EducationList(profile.education)),
            skills: Set(SkillList(profile.skills)),
            created_at: Set(profile.created_at.into()),
            updated_at: Set(profile.updated_at.into()),
        }
    }
}
