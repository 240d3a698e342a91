use actix_web::{web, HttpResponse, HttpRequest};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;
use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::db;
use crate::errors::AppError;
use crate::handlers::auth::current_user_id;
use crate::models::plan::{PlannedExercise, PlannedMeal};
use crate::models::user::{ActivityLevel, Goal, User};
use crate::services::calculator;
use crate::utils::validation::validate_payload;

/// Physical attributes may change at most once per this many days.
pub const UPDATE_INTERVAL_DAYS: i64 = 30;

#[derive(Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(range(min = 50.0, max = 300.0, message = "Height must be between 50 and 300 cm"))]
    height: f64,

    #[validate(range(min = 10.0, max = 1000.0, message = "Weight must be between 10 and 1000 kg"))]
    weight: f64,

    #[validate(range(min = 0.0, max = 500.0, message = "Waist circumference must be between 0 and 500 cm"))]
    waist_circumference: Option<f64>,

    activity_level: Option<ActivityLevel>,

    #[validate(length(max = 500, message = "Eating habits must be at most 500 characters"))]
    eating_habits: Option<String>,

    goal: Option<Goal>,
}

#[derive(Serialize)]
struct ProfileResponse {
    user: User,
    tdee: f64,
    meal_plan: Vec<PlannedMeal>,
    exercise_plan: Vec<PlannedExercise>,
}

fn update_forbidden() -> AppError {
    AppError::Forbidden("Can only update once per month".to_string())
}

/// Allowed when the profile was never updated or the last update is at least
/// [`UPDATE_INTERVAL_DAYS`] old.
pub fn ensure_update_allowed(last_updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), AppError> {
    match last_updated {
        Some(last) if now - last < Duration::days(UPDATE_INTERVAL_DAYS) => Err(update_forbidden()),
        _ => Ok(()),
    }
}

impl ProfileUpdate {
    fn apply(self, user: &mut User) {
        user.height = self.height;
        user.weight = self.weight;
        if let Some(waist) = self.waist_circumference {
            user.waist_circumference = waist;
        }
        if let Some(level) = self.activity_level {
            user.activity_level = level;
        }
        if let Some(habits) = self.eating_habits.filter(|h| !h.is_empty()) {
            user.eating_habits = habits;
        }
        if let Some(goal) = self.goal {
            user.goal = goal;
        }
    }
}

// PUT /update
pub async fn update_profile(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    updates: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*updates)?;
    let user_id = current_user_id(&req)?;

    let mut user = db::users::find_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = Utc::now();
    ensure_update_allowed(user.last_updated, now)?;

    updates.into_inner().apply(&mut user);
    let (tdee, meal_plan, exercise_plan) = calculator::update_user_plan(&pool, &user).await?;

    // The write re-checks the window; profile and plan commit together.
    let mut tx = pool.begin().await?;
    let user = db::users::update_profile(&mut *tx, &user, now, now - Duration::days(UPDATE_INTERVAL_DAYS))
        .await?
        .ok_or_else(update_forbidden)?;
    db::plans::replace_in(&mut *tx, user.id, &meal_plan, &exercise_plan).await?;
    tx.commit().await?;
    info!("Profile of user {} updated, plan regenerated", user.id);

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user,
        tdee,
        meal_plan,
        exercise_plan,
    }))
}

// GET /users
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let users = db::users::list(&pool).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use crate::test_support;
    use crate::utils::jwt::validator;

    fn user() -> User {
        let created = Utc::now() - Duration::days(90);
        User {
            id: 1,
            name: "Malika".to_string(),
            height: 165.0,
            weight: 60.0,
            age: 28,
            gender: "female".to_string(),
            activity_level: ActivityLevel::Low,
            eating_habits: "vegetarian".to_string(),
            goal: Goal::Maintenance,
            waist_circumference: 70.0,
            last_updated: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn first_update_is_allowed() {
        assert!(ensure_update_allowed(None, Utc::now()).is_ok());
    }

    #[test]
    fn second_update_within_window_is_forbidden() {
        let now = Utc::now();
        let result = ensure_update_allowed(Some(now - Duration::days(29)), now);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn update_after_window_is_allowed() {
        let now = Utc::now();
        assert!(ensure_update_allowed(Some(now - Duration::days(30)), now).is_ok());
        assert!(ensure_update_allowed(Some(now - Duration::days(45)), now).is_ok());
    }

    #[test]
    fn apply_keeps_unset_optional_fields() {
        let update: ProfileUpdate = serde_json::from_value(serde_json::json!({
            "height": 166.0,
            "weight": 58.5,
            "eating_habits": "",
            "goal": "weight_loss"
        }))
        .unwrap();
        let mut user = user();
        update.apply(&mut user);

        assert_eq!(user.height, 166.0);
        assert_eq!(user.weight, 58.5);
        assert_eq!(user.waist_circumference, 70.0);
        assert_eq!(user.activity_level, ActivityLevel::Low);
        assert_eq!(user.eating_habits, "vegetarian");
        assert_eq!(user.goal, Goal::WeightLoss);
    }

    fn update_request(user_id: i64, body: serde_json::Value) -> actix_test::TestRequest {
        actix_test::TestRequest::put()
            .uri("/update")
            .insert_header(test_support::bearer(user_id))
            .set_json(body)
    }

    #[actix_web::test]
    async fn update_after_window_replaces_stored_plan() {
        let Some(pool) = test_support::pool().await else { return };
        let user = test_support::create_user(&pool, Goal::Maintenance, Some(Utc::now() - Duration::days(31))).await;
        let (_, meals, exercises) = calculator::update_user_plan(&pool, &user).await.unwrap();
        db::plans::replace(&pool, user.id, &meals, &exercises).await.unwrap();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(test_support::keys()))
                .service(
                    web::resource("/update")
                        .wrap(HttpAuthentication::bearer(validator))
                        .route(web::put().to(update_profile)),
                ),
        )
        .await;

        let body = serde_json::json!({ "height": 180.0, "weight": 75.0, "goal": "weight_loss" });
        let resp = actix_test::call_service(&app, update_request(user.id, body.clone()).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(json["user"]["goal"], "weight_loss");
        assert!(!json["user"]["last_updated"].is_null());

        // 75 kg: BMR 1730, TDEE 2378.75, weight-loss target 2021, 336 per meal
        let meal_plan = json["meal_plan"].as_array().unwrap();
        let exercise_plan = json["exercise_plan"].as_array().unwrap();
        assert_eq!(
            test_support::plan_item_counts(&pool, user.id).await,
            (meal_plan.len() as i64, exercise_plan.len() as i64)
        );
        let targets = sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT target_calories FROM meal_plan_items WHERE user_id = $1",
        )
        .bind(user.id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(targets, vec![336]);

        let resp = actix_test::call_service(&app, update_request(user.id, body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn concurrent_updates_pass_the_window_once() {
        let Some(pool) = test_support::pool().await else { return };
        let user = test_support::create_user(&pool, Goal::Maintenance, None).await;

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(test_support::keys()))
                .service(
                    web::resource("/update")
                        .wrap(HttpAuthentication::bearer(validator))
                        .route(web::put().to(update_profile)),
                ),
        )
        .await;

        let body = serde_json::json!({ "height": 181.0, "weight": 79.0 });
        let (first, second) = tokio::join!(
            actix_test::call_service(&app, update_request(user.id, body.clone()).to_request()),
            actix_test::call_service(&app, update_request(user.id, body).to_request()),
        );
        let mut statuses = vec![first.status(), second.status()];
        statuses.sort();
        assert_eq!(statuses, vec![StatusCode::OK, StatusCode::FORBIDDEN]);

        let (meal_items, _) = test_support::plan_item_counts(&pool, user.id).await;
        assert_eq!(meal_items, calculator::MEALS_PER_DAY as i64);
    }
}
