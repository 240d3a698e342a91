use sqlx::PgPool;

use crate::models::reminder::{Reminder, ReminderType};

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    reminder_type: ReminderType,
    time: &str,
    message: &str,
) -> Result<Reminder, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(
        "INSERT INTO reminders (user_id, reminder_type, time, message, active, created_at)
        VALUES ($1, $2, $3, $4, TRUE, NOW())
        RETURNING *",
    )
    .bind(user_id)
    .bind(reminder_type.as_str())
    .bind(time)
    .bind(message)
    .fetch_one(pool)
    .await
}

pub async fn find_owned(pool: &PgPool, reminder_id: i64, user_id: i64) -> Result<Option<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = $1 AND user_id = $2")
        .bind(reminder_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_active(pool: &PgPool, user_id: i64) -> Result<Vec<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE user_id = $1 AND active = TRUE ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Soft-disables; rows are never deleted.
pub async fn deactivate(pool: &PgPool, reminder_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reminders SET active = FALSE WHERE id = $1")
        .bind(reminder_id)
        .execute(pool)
        .await?;
    Ok(())
}
