//! Forum endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use ratenextdoor_common::{AppError, AppResult, VoteDirection};
use ratenextdoor_core::{
    CategoryInfo, CreatePostInput, CreateReplyInput, CreatedPost, DeletedPost, PostDetail,
    PostView, UpdatePostInput, UploadedImage,
};
use ratenextdoor_db::{
    entities::forum_post::ForumCategory,
    repositories::{PostListQuery, PostSort, VoteOutcome},
};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, ApiQuery, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Largest page the index will return.
const MAX_PAGE_SIZE: u64 = 100;

/// Forum index query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub category: Option<ForumCategory>,
    #[serde(default)]
    pub sort: PostSort,
    pub search: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl From<ListPostsQuery> for PostListQuery {
    fn from(q: ListPostsQuery) -> Self {
        Self {
            category: q.category,
            sort: q.sort,
            search: q.search.filter(|s| !s.trim().is_empty()),
            limit: q.limit.map(|l| l.clamp(1, MAX_PAGE_SIZE)),
            offset: q.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

async fn categories(State(state): State<AppState>) -> ApiResponse<&'static [CategoryInfo]> {
    ApiResponse::ok(state.forum_service.categories())
}

async fn list_posts(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state
        .forum_service
        .list_posts(&query.into(), viewer.actor())
        .await?;
    Ok(ApiResponse::ok(posts))
}

async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePostInput>,
) -> AppResult<ApiResponse<CreatedPost>> {
    let created = state.forum_service.create_post(user.actor(), input).await?;
    Ok(ApiResponse::created(created))
}

/// `GET /posts/{slug}`: a post with its replies.
async fn show_post(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<PostDetail>> {
    let detail = state.forum_service.post_detail(&slug, viewer.actor()).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<UpdatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let post = state
        .forum_service
        .update_post(user.actor(), &post_id, input)
        .await?;
    Ok(ApiResponse::ok(post))
}

async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<DeletedPost>> {
    let deleted = state.forum_service.delete_post(user.actor(), &post_id).await?;
    Ok(ApiResponse::ok(deleted))
}

async fn create_reply(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<CreateReplyInput>,
) -> AppResult<ApiResponse<PostView>> {
    let reply = state
        .forum_service
        .create_reply(user.actor(), &post_id, input)
        .await?;
    Ok(ApiResponse::created(reply))
}

async fn vote(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> AppResult<ApiResponse<VoteOutcome>> {
    let outcome = state
        .vote_service
        .cast(user.actor(), &post_id, req.direction)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// Upload an image via multipart form (`file` field).
async fn upload_image(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let image: UploadedImage = state
            .image_service
            .upload(user.actor(), &content_type, data)
            .await?;
        return Ok(ApiResponse::created(image));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories))
        .route("/posts", get(list_posts).post(create_post))
        // Lookup is by slug; mutations are by id.
        .route(
            "/posts/{post}",
            get(show_post).patch(update_post).delete(delete_post),
        )
        .route("/posts/{post}/replies", post(create_reply))
        .route("/posts/{post}/vote", post(vote))
        .route("/images", post(upload_image))
}
