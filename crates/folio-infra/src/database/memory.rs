//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Each collection sits behind one async `RwLock`; uniqueness checks and the
//! view counter run under the write lock, so they are atomic per process.
//! Data is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Post, Profile, User};
use folio_core::error::RepoError;
use folio_core::ports::{
    BaseRepository, PostFilter, PostPage, PostRepository, ProfileMutation, ProfileRepository,
    UserRepository,
};

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("email already registered".to_string()));
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

/// In-memory post store.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slug_taken(posts: &HashMap<Uuid, Post>, slug: &str, except: Uuid) -> bool {
        posts.values().any(|p| p.slug == slug && p.id != except)
    }

    fn matches(post: &Post, filter: &PostFilter) -> bool {
        if filter.published_only && !post.published {
            return false;
        }
        if filter.category.is_some_and(|c| c != post.category) {
            return false;
        }
        if let Some(tag) = &filter.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = [&post.title, &post.summary, &post.content]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        if Self::slug_taken(&posts, &post.slug, post.id) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' is already in use",
                post.slug
            )));
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError> {
        let posts = self.posts.read().await;

        let mut matching: Vec<&Post> = posts
            .values()
            .filter(|p| Self::matches(p, filter))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(filter.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(filter.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(PostPage { items, total })
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        post.views = posts.get(&post.id).ok_or(RepoError::NotFound)?.views;
        if Self::slug_taken(&posts, &post.slug, post.id) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' is already in use",
                post.slug
            )));
        }

        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.views += 1;
        Ok(post.views)
    }
}

/// In-memory profile slot.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    profile: RwLock<Option<Profile>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn get(&self) -> Result<Option<Profile>, RepoError> {
        Ok(self.profile.read().await.clone())
    }

    async fn create(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut slot = self.profile.write().await;
        if slot.is_some() {
            return Err(RepoError::Constraint("profile already exists".to_string()));
        }
        *slot = Some(profile.clone());
        Ok(profile)
    }

    async fn modify(&self, mutation: ProfileMutation) -> Result<Profile, RepoError> {
        let mut slot = self.profile.write().await;
        let mut next = slot.as_ref().ok_or(RepoError::NotFound)?.clone();
        mutation(&mut next)?;
        *slot = Some(next.clone());
        Ok(next)
    }
}
