use serde::{Deserialize, Serialize};

/// Catalog entry. Catalog rows are read-only; plans reference them by id.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
    pub meal_type: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub duration: i32,
    pub calories_burned: i32,
    pub image_url: String,
}

/// A catalog meal assigned to a user with the per-meal calorie target
/// derived from their recommended daily intake.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlannedMeal {
    pub position: i32,
    pub target_calories: i32,
    pub meal: Meal,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlannedExercise {
    pub position: i32,
    pub exercise: Exercise,
}
