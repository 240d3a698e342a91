use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::user::{GetUserCredentials, NewUser, User};

// Everything but the password hash, which only login reads.
const USER_COLUMNS: &str = "id, name, height, weight, age, gender, activity_level, eating_habits, goal, waist_circumference, last_updated, created_at, updated_at";

/// Returns `None` when the name is already taken.
pub async fn create(pool: &PgPool, user: &NewUser) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, password, height, weight, age, gender, activity_level, eating_habits, goal, waist_circumference, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
        ON CONFLICT (name) DO NOTHING
        RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(user.height)
    .bind(user.weight)
    .bind(user.age)
    .bind(&user.gender)
    .bind(user.activity_level.as_str())
    .bind(&user.eating_habits)
    .bind(user.goal.as_str())
    .bind(user.waist_circumference)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_credentials(pool: &PgPool, name: &str) -> Result<Option<GetUserCredentials>, sqlx::Error> {
    sqlx::query_as::<_, GetUserCredentials>("SELECT id, password FROM users WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
        .fetch_all(pool)
        .await
}

pub async fn list_ids(pool: &PgPool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Writes the mutable profile attributes and stamps `last_updated`, but only
/// while the previous update is no newer than `not_after`. `None` means the
/// row was updated too recently (or is gone). Concurrent callers serialise on
/// the row lock, so at most one of them passes the check.
pub async fn update_profile(
    conn: &mut PgConnection,
    user: &User,
    now: DateTime<Utc>,
    not_after: DateTime<Utc>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET height = $1, weight = $2, waist_circumference = $3, activity_level = $4, eating_habits = $5, goal = $6, last_updated = $7, updated_at = $7
        WHERE id = $8 AND (last_updated IS NULL OR last_updated <= $9)
        RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user.height)
    .bind(user.weight)
    .bind(user.waist_circumference)
    .bind(user.activity_level.as_str())
    .bind(&user.eating_habits)
    .bind(user.goal.as_str())
    .bind(now)
    .bind(user.id)
    .bind(not_after)
    .fetch_optional(&mut *conn)
    .await
}
