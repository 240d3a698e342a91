//! Helpers for tests that need PostgreSQL.
//!
//! These tests run against `DATABASE_URL` and return early when it is unset.
//! Every call to [`create_user`] makes a fresh user so tests can share one
//! database and run in parallel.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db;
use crate::models::user::{ActivityLevel, Goal, NewUser, User};
use crate::utils::jwt::JwtKeys;

static NEXT_USER: AtomicU64 = AtomicU64::new(0);

pub const SECRET: &str = "test-secret";

pub async fn pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    Some(pool)
}

/// The reference user: 80 kg, 180 cm, 30 year old male with average activity.
pub async fn create_user(pool: &PgPool, goal: Goal, last_updated: Option<DateTime<Utc>>) -> User {
    let name = format!(
        "user-{}-{}-{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        NEXT_USER.fetch_add(1, Ordering::SeqCst)
    );
    let new_user = NewUser {
        name,
        password_hash: "not-a-real-hash".to_string(),
        height: 180.0,
        weight: 80.0,
        age: 30,
        gender: "male".to_string(),
        activity_level: ActivityLevel::Average,
        eating_habits: String::new(),
        goal,
        waist_circumference: 85.0,
    };
    let user = db::users::create(pool, &new_user)
        .await
        .unwrap()
        .expect("unique test user name");

    sqlx::query("UPDATE users SET last_updated = $1 WHERE id = $2")
        .bind(last_updated)
        .bind(user.id)
        .execute(pool)
        .await
        .unwrap();
    db::users::find_by_id(pool, user.id).await.unwrap().unwrap()
}

/// Stored `(meal items, exercise items)` for a user.
pub async fn plan_item_counts(pool: &PgPool, user_id: i64) -> (i64, i64) {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT
            (SELECT COUNT(*) FROM meal_plan_items WHERE user_id = $1),
            (SELECT COUNT(*) FROM exercise_plan_items WHERE user_id = $1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn keys() -> JwtKeys {
    JwtKeys::new(SECRET, 24)
}

pub fn bearer(user_id: i64) -> (&'static str, String) {
    let token = keys().generate_token(user_id).unwrap();
    ("Authorization", format!("Bearer {}", token))
}
