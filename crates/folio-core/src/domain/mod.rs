//! Domain entities - the core business objects and the rules attached to them.

mod post;
mod profile;
mod slug;
mod user;

pub use post::{
    Category, MAX_SUMMARY_CHARS, MAX_TITLE_CHARS, MIN_CONTENT_CHARS, Post, PostDraft,
    WORDS_PER_MINUTE, estimate_read_time,
};
pub use profile::{
    Education, EducationFields, Entry, Experience, ExperienceFields, Language, LanguageLevel,
    MAX_BIO_CHARS, Profile, ProfileDetails, Skill, SkillCategory, SkillFields, SkillLevel,
};
pub use slug::slugify;
pub use user::{Role, User};
