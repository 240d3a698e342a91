//! Metabolic calculations, plan selection and gamification rules.
//!
//! Everything except the plan generators is a pure function over its inputs.
//! The generators read the catalog and hand the rows to the pure selectors.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db;
use crate::models::gamification::{NewAchievement, NewPoint};
use crate::models::plan::{Exercise, Meal, PlannedExercise, PlannedMeal};
use crate::models::user::{ActivityLevel, Goal, User};

pub const MEALS_PER_DAY: usize = 6;
/// Upper calorie bound for catalog meals offered to users trying to lose weight.
pub const WEIGHT_LOSS_MEAL_CALORIES: i32 = 250;
/// Exercises above this burn are always included for weight loss.
pub const CARDIO_CALORIES_BURNED: i32 = 100;
pub const DEFAULT_EXERCISE_CAP: usize = 3;
pub const STREAK_ACHIEVEMENT: &str = "5-Day Workout Streak";
const STREAK_ENTRIES: usize = 5;
const STREAK_MAX_GAP_HOURS: i64 = 48;

pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / height_m.powi(2)
}

/// Mifflin-St Jeor. Anything other than `"male"` takes the female constant.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: i32, gender: &str) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    if gender == "male" {
        base + 5.0
    } else {
        base - 161.0
    }
}

pub fn activity_coefficient(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Low => 1.2,
        ActivityLevel::Average => 1.375,
        ActivityLevel::High => 1.55,
        ActivityLevel::Athlete => 1.9,
    }
}

pub fn calculate_tdee(bmr: f64, level: ActivityLevel) -> f64 {
    bmr * activity_coefficient(level)
}

/// Daily calorie target, truncated toward zero.
pub fn recommend_calories(tdee: f64, goal: Goal) -> i32 {
    match goal {
        Goal::WeightLoss => (tdee * 0.85) as i32,
        Goal::WeightGain => (tdee * 1.15) as i32,
        Goal::Maintenance => tdee as i32,
    }
}

/// BMR then TDEE from the user's current attributes.
pub fn user_tdee(user: &User) -> f64 {
    let bmr = calculate_bmr(user.weight, user.height, user.age, &user.gender);
    calculate_tdee(bmr, user.activity_level)
}

/// Picks at most [`MEALS_PER_DAY`] meals from `pool`, cycling through it in
/// catalog order. Each pick carries an equal share of the daily target; the
/// catalog row itself is left untouched.
pub fn select_meals(pool: &[Meal], daily_calories: i32) -> Vec<PlannedMeal> {
    if pool.is_empty() {
        return Vec::new();
    }

    let per_meal = daily_calories / MEALS_PER_DAY as i32;
    (0..MEALS_PER_DAY.min(pool.len()))
        .map(|i| PlannedMeal {
            position: i as i32,
            target_calories: per_meal,
            meal: pool[i % pool.len()].clone(),
        })
        .collect()
}

/// Catalog order is preserved. For weight loss every high-burn exercise is
/// taken; otherwise (and for low-burn exercises) only until the cap is hit.
pub fn select_exercises(catalog: &[Exercise], goal: Goal) -> Vec<PlannedExercise> {
    let mut selected: Vec<&Exercise> = Vec::new();
    for exercise in catalog {
        let cardio = goal == Goal::WeightLoss && exercise.calories_burned > CARDIO_CALORIES_BURNED;
        if cardio || selected.len() < DEFAULT_EXERCISE_CAP {
            selected.push(exercise);
        }
    }

    selected
        .into_iter()
        .enumerate()
        .map(|(i, exercise)| PlannedExercise {
            position: i as i32,
            exercise: exercise.clone(),
        })
        .collect()
}

pub async fn generate_meal_plan(
    pool: &PgPool,
    user: &User,
    tdee: f64,
) -> Result<Vec<PlannedMeal>, sqlx::Error> {
    let daily = recommend_calories(tdee, user.goal);
    let max_calories = match user.goal {
        Goal::WeightLoss => Some(WEIGHT_LOSS_MEAL_CALORIES),
        _ => None,
    };
    let catalog = db::catalog::list_meals(pool, max_calories).await?;
    Ok(select_meals(&catalog, daily))
}

pub async fn generate_exercise_plan(
    pool: &PgPool,
    user: &User,
) -> Result<Vec<PlannedExercise>, sqlx::Error> {
    let catalog = db::catalog::list_exercises(pool).await?;
    Ok(select_exercises(&catalog, user.goal))
}

/// Recomputes TDEE and regenerates both plans. Nothing is persisted here.
pub async fn update_user_plan(
    pool: &PgPool,
    user: &User,
) -> Result<(f64, Vec<PlannedMeal>, Vec<PlannedExercise>), sqlx::Error> {
    let tdee = user_tdee(user);
    let meal_plan = generate_meal_plan(pool, user, tdee).await?;
    let exercise_plan = generate_exercise_plan(pool, user).await?;
    Ok((tdee, meal_plan, exercise_plan))
}

pub fn award_points(user_id: i64, action: &str) -> NewPoint {
    let (points, reason) = match action {
        "meal" => (10, "Completed meal"),
        "exercise" => (20, "Completed exercise"),
        _ => (0, ""),
    };
    NewPoint {
        user_id,
        points,
        reason: reason.to_string(),
    }
}

/// `recent_days` are progress dates, newest first.
pub fn check_achievements(user_id: i64, recent_days: &[DateTime<Utc>]) -> Vec<NewAchievement> {
    check_achievements_at(user_id, recent_days, Utc::now())
}

pub fn check_achievements_at(
    user_id: i64,
    recent_days: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Vec<NewAchievement> {
    if recent_days.len() < STREAK_ENTRIES {
        return Vec::new();
    }

    let max_gap = chrono::Duration::hours(STREAK_MAX_GAP_HOURS);
    let streak = recent_days[..STREAK_ENTRIES]
        .windows(2)
        .all(|pair| pair[0] - pair[1] <= max_gap);

    // No lookup of earlier awards: every qualifying call yields a new one.
    if streak && recent_days[0].date_naive() == now.date_naive() {
        vec![NewAchievement {
            user_id,
            name: STREAK_ACHIEVEMENT.to_string(),
        }]
    } else {
        Vec::new()
    }
}
