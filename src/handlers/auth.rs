use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use bcrypt::{hash, verify};
use validator::Validate;
use actix_web::rt::task::spawn_blocking;
use log::info;

use crate::db;
use crate::errors::AppError;
use crate::models::user::{ActivityLevel, Goal, NewUser, User};
use crate::services::calculator;
use crate::utils::jwt::{Claims, JwtKeys};
use crate::utils::validation::{validate_gender, validate_payload};

const BCRYPT_COST: u32 = 10;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 60, message = "Name must be between 2 and 60 characters"))]
    name: String,

    #[validate(length(min = 8, max = 32, message = "Password must be between 8 and 32 characters"))]
    password: String,

    #[validate(range(min = 50.0, max = 300.0, message = "Height must be between 50 and 300 cm"))]
    height: f64,

    #[validate(range(min = 10.0, max = 1000.0, message = "Weight must be between 10 and 1000 kg"))]
    weight: f64,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    age: i32,

    gender: String,

    activity_level: ActivityLevel,

    #[serde(default)]
    #[validate(length(max = 500, message = "Eating habits must be at most 500 characters"))]
    eating_habits: String,

    #[serde(default)]
    goal: Goal,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 500.0, message = "Waist circumference must be between 0 and 500 cm"))]
    waist_circumference: f64,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    user: User,
    bmi: f64,
    bmr: f64,
    tdee: f64,
    calories: i32,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    user_id: i64,
    token: String,
}

/// The user id the bearer middleware stored for this request.
pub fn current_user_id(req: &HttpRequest) -> Result<i64, AppError> {
    req.extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?
        .user_id()
}

// POST /register
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;
    validate_gender(&req.gender)?;

    let req = req.into_inner();
    let password = req.password.clone();
    let password_hash = spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let new_user = NewUser {
        name: req.name,
        password_hash,
        height: req.height,
        weight: req.weight,
        age: req.age,
        gender: req.gender,
        activity_level: req.activity_level,
        eating_habits: req.eating_habits,
        goal: req.goal,
        waist_circumference: req.waist_circumference,
    };

    let user = db::users::create(&pool, &new_user)
        .await?
        .ok_or_else(|| AppError::Conflict("User name already exists".to_string()))?;

    let bmi = calculator::calculate_bmi(user.weight, user.height);
    let bmr = calculator::calculate_bmr(user.weight, user.height, user.age, &user.gender);
    let tdee = calculator::calculate_tdee(bmr, user.activity_level);
    let calories = calculator::recommend_calories(tdee, user.goal);
    info!("Registered user {} ({})", user.id, user.name);

    Ok(HttpResponse::Created().json(RegisterResponse {
        user,
        bmi,
        bmr,
        tdee,
        calories,
    }))
}

// POST /login
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    let credentials = db::users::find_credentials(&pool, &req.name)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let password = req.into_inner().password;
    let stored = credentials.password;
    let is_valid = spawn_blocking(move || verify(password.as_str(), &stored))
        .await
        .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !is_valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = keys
        .generate_token(credentials.id)
        .map_err(|_| AppError::InternalServerError("Token generation error".to_string()))?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user_id: credentials.id,
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn register_body(json: serde_json::Value) -> RegisterRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn registration_defaults_goal_and_habits() {
        let req = register_body(serde_json::json!({
            "name": "Aziz",
            "password": "password123",
            "height": 180.0,
            "weight": 80.0,
            "age": 30,
            "gender": "male",
            "activity_level": "average"
        }));
        assert!(req.validate().is_ok());
        assert_eq!(req.goal, Goal::Maintenance);
        assert!(req.eating_habits.is_empty());
        assert_eq!(req.waist_circumference, 0.0);
    }

    #[test]
    fn registration_rejects_out_of_range_values() {
        let req = register_body(serde_json::json!({
            "name": "A",
            "password": "short",
            "height": 20.0,
            "weight": 80.0,
            "age": 30,
            "gender": "female",
            "activity_level": "low",
            "goal": "weight_gain"
        }));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("height"));
        assert!(!fields.contains_key("weight"));
    }

    #[test]
    fn registration_rejects_unknown_activity_level() {
        let parsed = serde_json::from_value::<RegisterRequest>(serde_json::json!({
            "name": "Aziz",
            "password": "password123",
            "height": 180.0,
            "weight": 80.0,
            "age": 30,
            "gender": "male",
            "activity_level": "couch"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn current_user_requires_claims() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(current_user_id(&req), Err(AppError::Unauthorized(_))));

        req.extensions_mut().insert(Claims { sub: "12".to_string(), exp: 0 });
        assert_eq!(current_user_id(&req).unwrap(), 12);
    }
}
