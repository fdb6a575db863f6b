//! Blog post handlers.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::domain::{
    Category, MAX_SUMMARY_CHARS, MAX_TITLE_CHARS, MIN_CONTENT_CHARS, Post, PostDraft, User,
};
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, PostFilter};
use folio_shared::dto::{AuthorSummary, ListPostsQuery, PostRequest, PostResponse, ViewsResponse};
use folio_shared::{ApiResponse, Pagination, Validate, Violations};

use super::{created, non_blank, ok, push_domain_error};
use crate::middleware::auth::{AdminUser, MaybeUser};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// Validate a create/update body and turn it into a draft.
fn draft_from(req: PostRequest) -> AppResult<PostDraft> {
    let mut v = Violations::new();
    if let Err(errors) = req.validate() {
        v.extend(errors);
    }
    v.max_chars("title", &req.title, MAX_TITLE_CHARS);
    v.max_chars("summary", &req.summary, MAX_SUMMARY_CHARS);
    if !req.content.trim().is_empty() {
        v.check(
            req.content.trim().chars().count() >= MIN_CONTENT_CHARS,
            "content",
            format!("must be at least {MIN_CONTENT_CHARS} characters"),
        );
    }

    let category = match non_blank(req.category) {
        None => Category::default(),
        Some(raw) => raw.to_lowercase().parse::<Category>().unwrap_or_else(|e| {
            push_domain_error(&mut v, e);
            Category::default()
        }),
    };

    v.into_result().map_err(AppError::Validation)?;

    Ok(PostDraft {
        title: req.title.trim().to_string(),
        slug: non_blank(req.slug),
        summary: req.summary.trim().to_string(),
        content: req.content,
        category,
        tags: req.tags,
        cover_image: non_blank(req.cover_image),
    })
}

fn not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

fn slug_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Constraint(_) => {
            AppError::Conflict("A post with this slug already exists".to_string())
        }
        other => other.into(),
    }
}

async fn find_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state.posts.find_by_id(id).await?.ok_or_else(not_found)
}

/// Look a post up by slug; posts the viewer may not see do not exist.
async fn find_visible(state: &AppState, slug: &str, viewer: Option<&User>) -> AppResult<Post> {
    state
        .posts
        .find_by_slug(slug)
        .await?
        .filter(|post| post.is_visible_to(viewer))
        .ok_or_else(not_found)
}

async fn ensure_slug_free(state: &AppState, slug: &str, owner: Option<Uuid>) -> AppResult<()> {
    match state.posts.find_by_slug(slug).await? {
        Some(existing) if Some(existing.id) != owner => Err(AppError::Conflict(format!(
            "A post with slug '{slug}' already exists"
        ))),
        _ => Ok(()),
    }
}

async fn author_summary(state: &AppState, author_id: Uuid) -> AppResult<Option<AuthorSummary>> {
    let author = state.users.find_by_id(author_id).await?;
    Ok(author.map(|user| AuthorSummary {
        id: user.id,
        username: user.username,
    }))
}

fn to_response(post: Post, author: Option<AuthorSummary>) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        summary: post.summary,
        content: post.content,
        category: post.category.as_str().to_string(),
        tags: post.tags,
        author,
        cover_image: post.cover_image,
        published: post.published,
        views: post.views,
        read_time: post.read_time,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

async fn post_response(state: &AppState, post: Post) -> AppResult<PostResponse> {
    let author = author_summary(state, post.author_id).await?;
    Ok(to_response(post, author))
}

/// GET /api/blog
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let category = non_blank(query.category)
        .map(|raw| raw.to_lowercase().parse::<Category>())
        .transpose()
        .map_err(AppError::from)?;

    let filter = PostFilter {
        published_only: !viewer.is_admin(),
        category,
        tag: non_blank(query.tag),
        search: non_blank(query.search),
        offset: (page - 1).saturating_mul(limit),
        limit,
    };
    let result = state.posts.list(&filter).await?;

    let mut authors: HashMap<Uuid, Option<AuthorSummary>> = HashMap::new();
    let mut items = Vec::with_capacity(result.items.len());
    for post in result.items {
        let author = match authors.get(&post.author_id) {
            Some(cached) => cached.clone(),
            None => {
                let found = author_summary(&state, post.author_id).await?;
                authors.insert(post.author_id, found.clone());
                found
            }
        };
        items.push(to_response(post, author));
    }

    Ok(HttpResponse::Ok()
        .json(ApiResponse::ok(items).with_pagination(Pagination::new(page, limit, result.total))))
}

/// GET /api/blog/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = find_visible(&state, &path, viewer.user()).await?;
    Ok(ok(post_response(&state, post).await?))
}

/// POST /api/blog/{slug}/view
pub async fn record_view(
    state: web::Data<AppState>,
    viewer: MaybeUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = find_visible(&state, &path, viewer.user()).await?;
    let views = state.posts.increment_views(post.id).await?;

    Ok(ok(ViewsResponse { views }))
}

/// POST /api/blog
pub async fn create_post(
    state: web::Data<AppState>,
    admin: AdminUser,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = draft_from(body.into_inner())?;
    let post = Post::create(admin.id, draft)?;

    ensure_slug_free(&state, &post.slug, None).await?;
    let post = state.posts.insert(post).await.map_err(slug_conflict)?;

    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");

    Ok(created(
        post_response(&state, post).await?,
        "Post created successfully",
    ))
}

/// PUT /api/blog/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = draft_from(body.into_inner())?;
    let mut post = find_post(&state, path.into_inner()).await?;

    post.apply(draft)?;
    ensure_slug_free(&state, &post.slug, Some(post.id)).await?;
    let post = state.posts.update(post).await.map_err(slug_conflict)?;

    tracing::info!(post_id = %post.id, admin_id = %admin.id, "Post updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(&state, post).await?,
        "Post updated successfully",
    )))
}

/// DELETE /api/blog/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    state.posts.delete(post.id).await?;

    tracing::info!(post_id = %post.id, admin_id = %admin.id, "Post deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully")))
}

/// PATCH /api/blog/{id}/publish
pub async fn toggle_publish(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, path.into_inner()).await?;
    let published = post.toggle_published();
    let post = state.posts.update(post).await?;

    tracing::info!(post_id = %post.id, admin_id = %admin.id, published, "Post publish state toggled");

    let message = if published {
        "Post published"
    } else {
        "Post unpublished"
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(&state, post).await?,
        message,
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::handlers::test_support::{
        self, ADMIN_EMAIL, bearer, long_content, register, test_app,
    };

    /// Create a post as `$token` and evaluate to the response.
    macro_rules! create_post {
        ($app:expr, $token:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/blog")
                .insert_header(bearer($token))
                .set_json($body)
                .to_request();
            test::call_service($app, req).await
        }};
    }

    fn post_body(title: &str) -> Value {
        json!({
            "title": title,
            "summary": "A short summary",
            "content": long_content(),
            "category": "backend",
            "tags": ["rust", " actix ", "rust"],
        })
    }

    #[actix_web::test]
    async fn test_create_derives_slug_and_defaults() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);

        let res = create_post!(&app, &admin, post_body("My First Post!"));
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(res).await;
        let post = &body["data"];
        assert_eq!(post["slug"], "my-first-post");
        assert_eq!(post["published"], false);
        assert_eq!(post["views"], 0);
        assert_eq!(post["category"], "backend");
        assert_eq!(post["tags"], json!(["rust", "actix"]));
        assert_eq!(post["author"]["username"], "owner");
        assert_eq!(post["read_time"], 1);
    }

    #[actix_web::test]
    async fn test_identical_titles_conflict() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);

        let first = create_post!(&app, &admin, post_body("Same Title"));
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = create_post!(&app, &admin, post_body("Same Title"));
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_short_content_and_bad_category_are_field_errors() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);

        let res = create_post!(
            &app,
            &admin,
            json!({ "title": "Tiny", "summary": "s", "content": "too short", "category": "poetry" })
        );
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["content", "category"]);
    }

    #[actix_web::test]
    async fn test_padded_content_is_too_short() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);

        let mut body = post_body("Padded");
        body["content"] = json!(format!("{}{}", "a".repeat(999), " ".repeat(50)));
        let res = create_post!(&app, &admin, body);
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"][0]["field"], "content");
    }

    #[actix_web::test]
    async fn test_non_admin_cannot_create() {
        let app = test_app!(test_support::state());
        let user = register!(&app, "reader", "reader@example.com");

        let res = create_post!(&app, &user, post_body("Sneaky"));
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/blog")
            .set_json(post_body("Anonymous"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unpublished_post_is_hidden_from_non_admins() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let reader = register!(&app, "reader", "reader@example.com");
        create_post!(&app, &admin, post_body("Draft Notes"));

        let req = test::TestRequest::get().uri("/api/blog/draft-notes").to_request();
        let hidden = test::call_service(&app, req).await;
        assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
        let hidden: Value = test::read_body_json(hidden).await;

        let req = test::TestRequest::get().uri("/api/blog/no-such-post").to_request();
        let missing = test::call_service(&app, req).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let missing: Value = test::read_body_json(missing).await;
        assert_eq!(hidden, missing);

        let req = test::TestRequest::get()
            .uri("/api/blog/draft-notes")
            .insert_header(bearer(&reader))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri("/api/blog/draft-notes/view").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/blog/draft-notes")
            .insert_header(bearer(&admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/blog").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pagination"]["total_items"], 0);

        let req = test::TestRequest::get()
            .uri("/api/blog")
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["pagination"]["total_items"], 1);
    }

    #[actix_web::test]
    async fn test_non_admin_toggle_is_forbidden_and_changes_nothing() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let reader = register!(&app, "reader", "reader@example.com");
        let created: Value = test::read_body_json(create_post!(&app, &admin, post_body("Guarded"))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/blog/{id}/publish"))
            .insert_header(bearer(&reader))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/api/blog/guarded")
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["published"], false);
    }

    #[actix_web::test]
    async fn test_publish_then_count_views() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let created: Value = test::read_body_json(create_post!(&app, &admin, post_body("Popular"))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/blog/{id}/publish"))
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["published"], true);
        assert_eq!(body["message"], "Post published");

        for expected in 1..=2 {
            let req = test::TestRequest::post().uri("/api/blog/popular/view").to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["data"]["views"], expected);
        }

        let req = test::TestRequest::get().uri("/api/blog/popular").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["views"], 2);
    }

    #[actix_web::test]
    async fn test_garbage_bearer_reads_as_anonymous() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let shown: Value = test::read_body_json(create_post!(&app, &admin, post_body("Shown"))).await;
        create_post!(&app, &admin, post_body("Hidden"));

        let req = test::TestRequest::patch()
            .uri(&format!("/api/blog/{}/publish", shown["data"]["id"].as_str().unwrap()))
            .insert_header(bearer(&admin))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get()
            .uri("/api/blog")
            .insert_header(bearer("garbage"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["pagination"]["total_items"], 1);
        assert_eq!(body["data"][0]["title"], "Shown");
    }

    #[actix_web::test]
    async fn test_edits_keep_the_view_count() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let created: Value = test::read_body_json(create_post!(&app, &admin, post_body("Counted"))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let publish = test::TestRequest::patch()
            .uri(&format!("/api/blog/{id}/publish"))
            .insert_header(bearer(&admin))
            .to_request();
        test::call_service(&app, publish).await;
        for _ in 0..2 {
            let req = test::TestRequest::post().uri("/api/blog/counted/view").to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{id}"))
            .insert_header(bearer(&admin))
            .set_json(post_body("Counted Again"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["views"], 2);

        let unpublish = test::TestRequest::patch()
            .uri(&format!("/api/blog/{id}/publish"))
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, unpublish).await;
        assert_eq!(body["data"]["published"], false);
        assert_eq!(body["data"]["views"], 2);
    }

    #[actix_web::test]
    async fn test_update_keeps_slug_unless_given_and_delete_removes() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        let created: Value = test::read_body_json(create_post!(&app, &admin, post_body("Original"))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        create_post!(&app, &admin, post_body("Taken"));

        let mut update = post_body("Renamed");
        update["content"] = json!("word ".repeat(450));
        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{id}"))
            .insert_header(bearer(&admin))
            .set_json(&update)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["title"], "Renamed");
        assert_eq!(body["data"]["slug"], "original");
        assert_eq!(body["data"]["read_time"], 3);

        update["slug"] = json!("taken");
        let req = test::TestRequest::put()
            .uri(&format!("/api/blog/{id}"))
            .insert_header(bearer(&admin))
            .set_json(&update)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/blog/{id}"))
            .insert_header(bearer(&admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/blog/{id}"))
            .insert_header(bearer(&admin))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_paginates_and_filters() {
        let app = test_app!(test_support::state());
        let admin = register!(&app, "owner", ADMIN_EMAIL);
        for title in ["Alpha", "Beta", "Gamma"] {
            create_post!(&app, &admin, post_body(title));
        }
        let mut frontend = post_body("Delta");
        frontend["category"] = json!("frontend");
        create_post!(&app, &admin, frontend);

        let req = test::TestRequest::get()
            .uri("/api/blog?page=2&limit=3")
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["pagination"]["current_page"], 2);
        assert_eq!(body["pagination"]["total_pages"], 2);
        assert_eq!(body["pagination"]["total_items"], 4);

        let req = test::TestRequest::get()
            .uri("/api/blog?category=frontend")
            .insert_header(bearer(&admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["title"], "Delta");

        let req = test::TestRequest::get().uri("/api/blog?category=poetry").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::get().uri("/api/blog?page=abc").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
