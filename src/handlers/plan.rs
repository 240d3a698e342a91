use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::plan::{PlannedExercise, PlannedMeal};
use crate::services::calculator;

#[derive(Serialize)]
struct PlanResponse {
    tdee: f64,
    calories: i32,
    meal_plan: Vec<PlannedMeal>,
    exercise_plan: Vec<PlannedExercise>,
}

// GET /plan/{user_id}
pub async fn get_plan(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = db::users::find_by_id(&pool, *user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let tdee = calculator::user_tdee(&user);
    let meal_plan = calculator::generate_meal_plan(&pool, &user, tdee).await?;
    let exercise_plan = calculator::generate_exercise_plan(&pool, &user).await?;

    db::plans::replace(&pool, user.id, &meal_plan, &exercise_plan).await?;

    Ok(HttpResponse::Ok().json(PlanResponse {
        tdee,
        calories: calculator::recommend_calories(tdee, user.goal),
        meal_plan,
        exercise_plan,
    }))
}
