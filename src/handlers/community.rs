use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::handlers::auth::current_user_id;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    title: String,

    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters"))]
    content: String,
}

#[derive(Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be between 1 and 5000 characters"))]
    content: String,
}

// POST /community/posts
pub async fn create_post(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let user_id = current_user_id(&req)?;

    let post = db::community::create_post(&pool, user_id, &payload.title, &payload.content).await?;
    Ok(HttpResponse::Created().json(post))
}

// GET /community/posts
pub async fn get_posts(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let posts = db::community::list_posts(&pool).await?;
    Ok(HttpResponse::Ok().json(posts))
}

// POST /community/posts/{post_id}/comments
pub async fn create_comment(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
    payload: web::Json<CommentRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let user_id = current_user_id(&req)?;

    if !db::community::post_exists(&pool, *post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let comment = db::community::create_comment(&pool, user_id, *post_id, &payload.content).await?;
    Ok(HttpResponse::Created().json(comment))
}

// GET /community/posts/{post_id}/comments
pub async fn get_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let comments = db::community::list_comments(&pool, *post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}
