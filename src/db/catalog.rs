use sqlx::PgPool;

use crate::models::plan::{Exercise, Meal};

/// Catalog meals in id order, optionally capped at `max_calories`.
pub async fn list_meals(pool: &PgPool, max_calories: Option<i32>) -> Result<Vec<Meal>, sqlx::Error> {
    match max_calories {
        Some(max) => {
            sqlx::query_as::<_, Meal>("SELECT * FROM meals WHERE calories <= $1 ORDER BY id")
                .bind(max)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as::<_, Meal>("SELECT * FROM meals ORDER BY id")
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn list_exercises(pool: &PgPool) -> Result<Vec<Exercise>, sqlx::Error> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY id")
        .fetch_all(pool)
        .await
}
