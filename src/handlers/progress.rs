use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;
use chrono::{DateTime, Utc};

use crate::db;
use crate::errors::AppError;
use crate::handlers::auth::current_user_id;
use crate::utils::validation::{validate_payload, validate_photo_url};

#[derive(Deserialize, Validate)]
pub struct ProgressRequest {
    #[validate(range(min = 10.0, max = 1000.0, message = "Weight must be between 10 and 1000 kg"))]
    weight: f64,

    date: Option<DateTime<Utc>>,

    #[validate(range(min = 0, max = 20000, message = "Calories must be between 0 and 20000"))]
    calories: i32,

    photo_url: Option<String>,
}

// POST /progress
pub async fn add_progress(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<ProgressRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    if let Some(photo_url) = &payload.photo_url {
        validate_photo_url(photo_url)?;
    }
    let user_id = current_user_id(&req)?;

    if !db::users::exists(&pool, user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let progress = db::progress::create(
        &pool,
        user_id,
        payload.weight,
        payload.date.unwrap_or_else(Utc::now),
        payload.calories,
        payload.photo_url.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(progress))
}

// GET /progress/{user_id}
pub async fn get_progress(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let records = db::progress::list_by_user(&pool, *user_id).await?;
    Ok(HttpResponse::Ok().json(records))
}
