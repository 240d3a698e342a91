use sqlx::PgPool;

use crate::models::gamification::{Achievement, NewAchievement, NewPoint, Point};

pub async fn add_point(pool: &PgPool, point: &NewPoint) -> Result<Point, sqlx::Error> {
    sqlx::query_as::<_, Point>(
        "INSERT INTO points (user_id, points, reason, created_at) VALUES ($1, $2, $3, NOW()) RETURNING *",
    )
    .bind(point.user_id)
    .bind(point.points)
    .bind(&point.reason)
    .fetch_one(pool)
    .await
}

pub async fn list_points(pool: &PgPool, user_id: i64) -> Result<Vec<Point>, sqlx::Error> {
    sqlx::query_as::<_, Point>("SELECT * FROM points WHERE user_id = $1 ORDER BY created_at, id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn add_achievement(pool: &PgPool, achievement: &NewAchievement) -> Result<Achievement, sqlx::Error> {
    sqlx::query_as::<_, Achievement>(
        "INSERT INTO achievements (user_id, name, created_at) VALUES ($1, $2, NOW()) RETURNING *",
    )
    .bind(achievement.user_id)
    .bind(&achievement.name)
    .fetch_one(pool)
    .await
}

pub async fn list_achievements(pool: &PgPool, user_id: i64) -> Result<Vec<Achievement>, sqlx::Error> {
    sqlx::query_as::<_, Achievement>("SELECT * FROM achievements WHERE user_id = $1 ORDER BY created_at, id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
