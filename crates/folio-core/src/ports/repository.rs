use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, Profile, User};
use crate::error::{DomainError, RepoError};

/// Operations every entity store provides.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity. Unique-field collisions are `RepoError::Constraint`.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Listing criteria for posts. Results are newest first.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub published_only: bool,
    pub category: Option<Category>,
    pub tag: Option<String>,
    /// Case-insensitive match against title, summary and content.
    pub search: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            published_only: true,
            category: None,
            tag: None,
            search: None,
            offset: 0,
            limit: 10,
        }
    }
}

/// One page of posts plus the number of posts matching the filter.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: u64,
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError>;

    /// Overwrite an existing post's editable fields. The stored view count is
    /// kept as is. `RepoError::NotFound` if the post is gone.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Atomically add one view and return the new count.
    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError>;
}

/// An in-place edit applied to the stored profile.
pub type ProfileMutation = Box<dyn FnOnce(&mut Profile) -> Result<(), DomainError> + Send>;

/// Storage for the singleton profile.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Profile>, RepoError>;

    /// Store the profile if none exists yet, otherwise `RepoError::Constraint`.
    async fn create(&self, profile: Profile) -> Result<Profile, RepoError>;

    /// Apply `mutation` to the stored profile and persist the result, with no
    /// other writer in between. `RepoError::NotFound` if none exists; a
    /// refused mutation surfaces as `RepoError::Rejected` and nothing is written.
    async fn modify(&self, mutation: ProfileMutation) -> Result<Profile, RepoError>;
}
