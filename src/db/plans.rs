use sqlx::{PgConnection, PgPool};

use crate::models::plan::{PlannedExercise, PlannedMeal};

/// Replaces the user's plan in its own transaction.
pub async fn replace(
    pool: &PgPool,
    user_id: i64,
    meals: &[PlannedMeal],
    exercises: &[PlannedExercise],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    replace_in(&mut *tx, user_id, meals, exercises).await?;
    tx.commit().await
}

/// Drops the user's previous assignments and stores the new plan on a
/// connection the caller holds a transaction on. The owner row is locked
/// first so concurrent replacements for one user run one after the other.
pub async fn replace_in(
    conn: &mut PgConnection,
    user_id: i64,
    meals: &[PlannedMeal],
    exercises: &[PlannedExercise],
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM meal_plan_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM exercise_plan_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for item in meals {
        sqlx::query(
            "INSERT INTO meal_plan_items (user_id, meal_id, position, target_calories, created_at)
            VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(user_id)
        .bind(item.meal.id)
        .bind(item.position)
        .bind(item.target_calories)
        .execute(&mut *conn)
        .await?;
    }

    for item in exercises {
        sqlx::query(
            "INSERT INTO exercise_plan_items (user_id, exercise_id, position, created_at)
            VALUES ($1, $2, $3, NOW())",
        )
        .bind(user_id)
        .bind(item.exercise.id)
        .bind(item.position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
