use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use log::info;

use crate::db;
use crate::errors::AppError;
use crate::handlers::auth::current_user_id;
use crate::models::gamification::{Achievement, Point};
use crate::services::calculator;

#[derive(Deserialize)]
pub struct CompleteRequest {
    // "meal" or "exercise"; anything else is recorded with zero points
    action: String,
}

#[derive(Serialize)]
struct CompleteResponse {
    points: Point,
    achievements: Vec<Achievement>,
}

#[derive(Serialize)]
struct GamificationResponse {
    total_points: i64,
    points: Vec<Point>,
    achievements: Vec<Achievement>,
}

pub fn total_points(points: &[Point]) -> i64 {
    points.iter().map(|p| i64::from(p.points)).sum()
}

// POST /complete
pub async fn complete_action(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<CompleteRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = current_user_id(&req)?;

    let point = calculator::award_points(user_id, &payload.action);
    let points = db::gamification::add_point(&pool, &point).await?;

    let mut achievements = Vec::new();
    if payload.action == "exercise" {
        let recent_days = db::progress::recent_days(&pool, user_id).await?;
        for achievement in calculator::check_achievements(user_id, &recent_days) {
            let stored = db::gamification::add_achievement(&pool, &achievement).await?;
            info!("User {} earned '{}'", user_id, stored.name);
            achievements.push(stored);
        }
    }

    Ok(HttpResponse::Ok().json(CompleteResponse { points, achievements }))
}

// GET /gamification/{user_id}
pub async fn get_gamification(
    pool: web::Data<PgPool>,
    user_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let points = db::gamification::list_points(&pool, *user_id).await?;
    let achievements = db::gamification::list_achievements(&pool, *user_id).await?;

    Ok(HttpResponse::Ok().json(GamificationResponse {
        total_points: total_points(&points),
        points,
        achievements,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use actix_web_httpauth::middleware::HttpAuthentication;
    use chrono::{Duration, Utc};
    use crate::models::user::Goal;
    use crate::test_support;
    use crate::utils::jwt::validator;

    fn point(points: i32) -> Point {
        Point {
            id: 0,
            user_id: 1,
            points,
            reason: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn total_is_sum_of_history() {
        assert_eq!(total_points(&[]), 0);
        assert_eq!(total_points(&[point(10), point(20), point(0), point(20)]), 50);
    }

    fn complete_request(user_id: i64, action: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/complete")
            .insert_header(test_support::bearer(user_id))
            .set_json(serde_json::json!({ "action": action }))
    }

    #[actix_web::test]
    async fn exercise_streak_is_stored_on_every_completion() {
        let Some(pool) = test_support::pool().await else { return };
        let user = test_support::create_user(&pool, Goal::Maintenance, None).await;
        let now = Utc::now();
        for day in 0..5 {
            db::progress::create(&pool, user.id, 80.0, now - Duration::days(day), 2000, None)
                .await
                .unwrap();
        }

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(test_support::keys()))
                .service(
                    web::resource("/complete")
                        .wrap(HttpAuthentication::bearer(validator))
                        .route(web::post().to(complete_action)),
                )
                .service(
                    web::resource("/gamification/{user_id}")
                        .wrap(HttpAuthentication::bearer(validator))
                        .route(web::get().to(get_gamification)),
                ),
        )
        .await;

        let resp = actix_test::call_service(&app, complete_request(user.id, "meal").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(json["points"]["points"], 10);
        assert_eq!(json["achievements"], serde_json::json!([]));

        // No idempotency check: a second qualifying completion earns it again
        for _ in 0..2 {
            let resp = actix_test::call_service(&app, complete_request(user.id, "exercise").to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let json: serde_json::Value = actix_test::read_body_json(resp).await;
            assert_eq!(json["points"]["points"], 20);
            assert_eq!(json["achievements"][0]["name"], calculator::STREAK_ACHIEVEMENT);
        }

        let req = actix_test::TestRequest::get()
            .uri(&format!("/gamification/{}", user.id))
            .insert_header(test_support::bearer(user.id))
            .to_request();
        let json: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["total_points"], 50);
        let achievements = json["achievements"].as_array().unwrap();
        assert_eq!(achievements.len(), 2);
        assert!(achievements.iter().all(|a| a["name"] == calculator::STREAK_ACHIEVEMENT));
    }

    #[actix_web::test]
    async fn exercise_without_streak_earns_points_only() {
        let Some(pool) = test_support::pool().await else { return };
        let user = test_support::create_user(&pool, Goal::Maintenance, None).await;
        db::progress::create(&pool, user.id, 80.0, Utc::now(), 2000, None).await.unwrap();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(pool.clone()))
                .app_data(web::Data::new(test_support::keys()))
                .service(
                    web::resource("/complete")
                        .wrap(HttpAuthentication::bearer(validator))
                        .route(web::post().to(complete_action)),
                ),
        )
        .await;

        let resp = actix_test::call_service(&app, complete_request(user.id, "exercise").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(db::gamification::list_achievements(&pool, user.id).await.unwrap().is_empty());
        assert_eq!(total_points(&db::gamification::list_points(&pool, user.id).await.unwrap()), 20);
    }
}
