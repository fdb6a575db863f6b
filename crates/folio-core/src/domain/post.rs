use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;
use super::user::User;
use crate::error::DomainError;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_SUMMARY_CHARS: usize = 300;
pub const MIN_CONTENT_CHARS: usize = 1000;
pub const WORDS_PER_MINUTE: usize = 200;

/// Blog post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Fullstack,
    Devops,
    Security,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Frontend,
        Category::Backend,
        Category::Fullstack,
        Category::Devops,
        Category::Security,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Fullstack => "fullstack",
            Category::Devops => "devops",
            Category::Security => "security",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(
                    "category",
                    "must be one of frontend, backend, fullstack, devops, security, other",
                )
            })
    }
}

/// The editable fields of a post. Anything not listed here cannot be set by clients.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub slug: Option<String>,
    pub summary: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// Post entity - a blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub cover_image: Option<String>,
    pub published: bool,
    pub views: i64,
    /// Estimated reading time in minutes.
    pub read_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create an unpublished post owned by `author_id`.
    ///
    /// The slug comes from the draft when given, otherwise from the title.
    pub fn create(author_id: Uuid, draft: PostDraft) -> Result<Self, DomainError> {
        let slug = derive_slug(draft.slug.as_deref(), &draft.title)?;
        check_content(&draft.content)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            read_time: estimate_read_time(&draft.content),
            title: draft.title,
            slug,
            summary: draft.summary,
            content: draft.content,
            category: draft.category,
            tags: normalize_tags(draft.tags),
            author_id,
            cover_image: draft.cover_image,
            published: false,
            views: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields. The slug only changes when the draft names one.
    pub fn apply(&mut self, draft: PostDraft) -> Result<(), DomainError> {
        check_content(&draft.content)?;
        if let Some(explicit) = draft.slug.as_deref() {
            self.slug = derive_slug(Some(explicit), &draft.title)?;
        }

        self.read_time = estimate_read_time(&draft.content);
        self.title = draft.title;
        self.summary = draft.summary;
        self.content = draft.content;
        self.category = draft.category;
        self.tags = normalize_tags(draft.tags);
        self.cover_image = draft.cover_image;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Flip the publish state and return the new value.
    pub fn toggle_published(&mut self) -> bool {
        self.published = !self.published;
        self.updated_at = Utc::now();
        self.published
    }

    /// Unpublished posts exist only for admins.
    pub fn is_visible_to(&self, viewer: Option<&User>) -> bool {
        self.published || viewer.is_some_and(User::is_admin)
    }
}

/// Minutes needed to read `content` at 200 words per minute, never below one.
pub fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

fn derive_slug(explicit: Option<&str>, title: &str) -> Result<String, DomainError> {
    let (field, source) = match explicit {
        Some(slug) if !slug.trim().is_empty() => ("slug", slug),
        _ => ("title", title),
    };

    let slug = slugify(source);
    if slug.is_empty() {
        return Err(DomainError::validation(
            field,
            "must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}

fn check_content(content: &str) -> Result<(), DomainError> {
    if content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(DomainError::validation(
            "content",
            format!("must be at least {MIN_CONTENT_CHARS} characters"),
        ));
    }
    Ok(())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn long_content(words: usize) -> String {
        let mut content = "lorem ".repeat(words);
        while content.len() < MIN_CONTENT_CHARS {
            content.push_str("ipsum ");
        }
        content
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            summary: "A short summary".to_string(),
            content: long_content(250),
            ..Default::default()
        }
    }

    fn user(role: Role) -> User {
        User::new(
            "someone".to_string(),
            "someone@example.com".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn test_create_derives_slug_from_title() {
        let post = Post::create(Uuid::new_v4(), draft("My First Post!")).unwrap();

        assert_eq!(post.slug, "my-first-post");
        assert!(!post.published);
        assert_eq!(post.views, 0);
        assert_eq!(post.read_time, 2);
    }

    #[test]
    fn test_explicit_slug_is_normalized() {
        let mut d = draft("Ignored For Slug");
        d.slug = Some("Custom Slug!!".to_string());

        let post = Post::create(Uuid::new_v4(), d).unwrap();
        assert_eq!(post.slug, "custom-slug");
    }

    #[test]
    fn test_blank_explicit_slug_falls_back_to_title() {
        let mut d = draft("Fallback Title");
        d.slug = Some("   ".to_string());

        let post = Post::create(Uuid::new_v4(), d).unwrap();
        assert_eq!(post.slug, "fallback-title");
    }

    #[test]
    fn test_title_without_slug_characters_is_rejected() {
        let err = Post::create(Uuid::new_v4(), draft("¿¡!?")).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }

    #[test]
    fn test_short_content_is_rejected() {
        let mut d = draft("Short");
        d.content = "too short".to_string();

        let err = Post::create(Uuid::new_v4(), d).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));
    }

    #[test]
    fn test_padding_does_not_count_towards_content_length() {
        let mut d = draft("Padded");
        d.content = format!("a{}", " ".repeat(MIN_CONTENT_CHARS));

        let err = Post::create(Uuid::new_v4(), d).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));
    }

    #[test]
    fn test_apply_keeps_slug_and_recomputes_read_time() {
        let mut post = Post::create(Uuid::new_v4(), draft("Original Title")).unwrap();

        let mut update = draft("Renamed Title");
        update.content = long_content(1001);
        post.apply(update).unwrap();

        assert_eq!(post.slug, "original-title");
        assert_eq!(post.title, "Renamed Title");
        assert_eq!(post.read_time, 6);
    }

    #[test]
    fn test_apply_rejects_short_content_without_mutating() {
        let mut post = Post::create(Uuid::new_v4(), draft("Stable")).unwrap();
        let before = post.content.clone();

        let mut update = draft("Changed");
        update.content = "nope".to_string();
        assert!(post.apply(update).is_err());

        assert_eq!(post.title, "Stable");
        assert_eq!(post.content, before);
    }

    #[test]
    fn test_read_time_rounds_up_with_minimum_of_one() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time("one two three"), 1);
        assert_eq!(estimate_read_time(&"w ".repeat(200)), 1);
        assert_eq!(estimate_read_time(&"w ".repeat(201)), 2);
        assert_eq!(estimate_read_time(&"w\n\t".repeat(400)), 2);
    }

    #[test]
    fn test_tags_are_trimmed_and_deduplicated() {
        let mut d = draft("Tagged");
        d.tags = vec![
            " rust ".to_string(),
            "web".to_string(),
            "".to_string(),
            "rust".to_string(),
        ];

        let post = Post::create(Uuid::new_v4(), d).unwrap();
        assert_eq!(post.tags, vec!["rust", "web"]);
    }

    #[test]
    fn test_visibility_depends_on_publish_state_and_role() {
        let mut post = Post::create(Uuid::new_v4(), draft("Hidden")).unwrap();
        let admin = user(Role::Admin);
        let reader = user(Role::User);

        assert!(!post.is_visible_to(None));
        assert!(!post.is_visible_to(Some(&reader)));
        assert!(post.is_visible_to(Some(&admin)));

        assert!(post.toggle_published());
        assert!(post.is_visible_to(None));
        assert!(post.is_visible_to(Some(&reader)));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("devops".parse::<Category>().unwrap(), Category::Devops);
        assert!("seguridad".parse::<Category>().is_err());
        assert_eq!(Category::default(), Category::Other);
    }
}
