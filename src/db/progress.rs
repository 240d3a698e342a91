use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::user::Progress;

/// How many recent entries the streak check looks at.
pub const RECENT_DAYS_LIMIT: i64 = 7;

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    weight: f64,
    date: DateTime<Utc>,
    calories: i32,
    photo_url: Option<&str>,
) -> Result<Progress, sqlx::Error> {
    sqlx::query_as::<_, Progress>(
        "INSERT INTO progress (user_id, weight, date, calories, photo_url, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *",
    )
    .bind(user_id)
    .bind(weight)
    .bind(date)
    .bind(calories)
    .bind(photo_url)
    .fetch_one(pool)
    .await
}

pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>("SELECT * FROM progress WHERE user_id = $1 ORDER BY date DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Most recent progress dates, newest first.
pub async fn recent_days(pool: &PgPool, user_id: i64) -> Result<Vec<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT date FROM progress WHERE user_id = $1 ORDER BY date DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(RECENT_DAYS_LIMIT)
    .fetch_all(pool)
    .await
}
