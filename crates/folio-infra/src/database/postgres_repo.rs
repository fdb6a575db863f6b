//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use folio_core::domain::{Post, Profile, User};
use folio_core::error::RepoError;
use folio_core::ports::{
    BaseRepository, PostFilter, PostPage, PostRepository, ProfileMutation, ProfileRepository,
    UserRepository,
};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::profile::{self, Entity as ProfileEntity, SINGLETON_ID};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, like_pattern, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL profile repository.
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if filter.published_only {
        condition = condition.add(post::Column::Published.eq(true));
    }
    if let Some(category) = filter.category {
        condition = condition.add(post::Column::Category.eq(category.as_str()));
    }
    if let Some(tag) = &filter.tag {
        condition = condition.add(Expr::cust_with_values(
            "tags @> ?",
            [serde_json::json!([tag])],
        ));
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        condition = condition.add(Expr::cust_with_values(
            "(title ILIKE ? OR summary ILIKE ? OR content ILIKE ?)",
            [pattern.clone(), pattern.clone(), pattern],
        ));
    }

    condition
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &PostFilter) -> Result<PostPage, RepoError> {
        let condition = post_condition(filter);

        let total = PostEntity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let items = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::CreatedAt)
            .offset(filter.offset)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(PostPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        // views only ever move through increment_views
        let mut active = post::ActiveModel::from(entity);
        active.views = NotSet;

        let model = active
            .update(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<i64, RepoError> {
        // Single UPDATE ... RETURNING; concurrent increments serialize on the row lock.
        let updated = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        updated
            .into_iter()
            .next()
            .map(|model| model.views)
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn get(&self) -> Result<Option<Profile>, RepoError> {
        let result = ProfileEntity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, entity: Profile) -> Result<Profile, RepoError> {
        let model = profile::ActiveModel::from(entity)
            .insert(&self.db)
            .await
            .map_err(|e| match map_db_err(e) {
                RepoError::Constraint(_) => {
                    RepoError::Constraint("profile already exists".to_string())
                }
                other => other,
            })?;

        Ok(model.into())
    }

    async fn modify(&self, mutation: ProfileMutation) -> Result<Profile, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let current = ProfileEntity::find_by_id(SINGLETON_ID)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut profile = Profile::from(current);
        mutation(&mut profile)?;

        let model = profile::ActiveModel::from(profile)
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        txn.commit().await.map_err(map_db_err)?;

        Ok(model.into())
    }
}
