use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;
use log::debug;

use crate::db;
use crate::errors::AppError;
use crate::handlers::auth::current_user_id;
use crate::models::reminder::ReminderType;
use crate::services::scheduler::ReminderScheduler;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct ReminderRequest {
    #[serde(rename = "type")]
    reminder_type: ReminderType,

    #[validate(length(min = 1, max = 100, message = "Time must be a cron expression"))]
    time: String,

    #[validate(length(min = 1, max = 500, message = "Message must be between 1 and 500 characters"))]
    message: String,
}

// POST /reminders
pub async fn create_reminder(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    scheduler: web::Data<ReminderScheduler>,
    payload: web::Json<ReminderRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let user_id = current_user_id(&req)?;

    let reminder = db::reminders::create(
        &pool,
        user_id,
        payload.reminder_type,
        &payload.time,
        &payload.message,
    )
    .await?;

    // The row stays persisted when the expression cannot be scheduled.
    scheduler.schedule_reminder(&reminder)?;

    Ok(HttpResponse::Created().json(reminder))
}

// GET /reminders
pub async fn get_reminders(
    req: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user_id(&req)?;
    let reminders = db::reminders::list_active(&pool, user_id).await?;
    Ok(HttpResponse::Ok().json(reminders))
}

// PUT /reminders/{reminder_id}/disable
pub async fn disable_reminder(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    scheduler: web::Data<ReminderScheduler>,
    reminder_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user_id(&req)?;

    let reminder = db::reminders::find_owned(&pool, *reminder_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reminder not found".to_string()))?;

    if reminder.active {
        db::reminders::deactivate(&pool, reminder.id).await?;
    }
    if !scheduler.remove_reminder(reminder.id) {
        debug!("Reminder {} had no scheduled job", reminder.id);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Reminder disabled" })))
}
