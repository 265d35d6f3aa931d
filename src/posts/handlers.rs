use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::auth::Identity;
use crate::db::Post;
use crate::error::AppError;
use crate::AppState;
use tracing::info;

/// Fixed listing size; there is no pagination.
const POSTS_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub success: bool,
    pub message: String,
    pub post_id: i32,
}

pub async fn create_post(
    identity: Identity,
    req: web::Json<CreatePostRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if req.content.is_empty() {
        return Err(AppError::ValidationError(
            "Content cannot be empty".to_string(),
        ));
    }

    let post_id = state.db.create_post(identity.user_id, &req.content).await?;
    info!(user_id = identity.user_id, post_id, "Post created");

    Ok(HttpResponse::Ok().json(CreatePostResponse {
        success: true,
        message: "Post created".to_string(),
        post_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    pub success: bool,
    pub posts: Vec<Post>,
}

pub async fn list_posts(
    _identity: Identity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let posts = state.db.list_recent_posts(POSTS_LIMIT).await?;
    Ok(HttpResponse::Ok().json(ListPostsResponse {
        success: true,
        posts,
    }))
}
