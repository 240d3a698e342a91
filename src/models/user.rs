use serde::{Deserialize, Serialize};
use chrono::Utc;
use std::fmt;

/// Raised when a stored enum column holds a value this build does not know.
#[derive(Debug)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Average,
    High,
    Athlete,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Average => "average",
            ActivityLevel::High => "high",
            ActivityLevel::Athlete => "athlete",
        }
    }
}

impl TryFrom<String> for ActivityLevel {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "low" => Ok(ActivityLevel::Low),
            "average" => Ok(ActivityLevel::Average),
            "high" => Ok(ActivityLevel::High),
            "athlete" => Ok(ActivityLevel::Athlete),
            _ => Err(UnknownVariant { kind: "activity level", value }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    WeightGain,
    #[default]
    Maintenance,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::WeightGain => "weight_gain",
            Goal::Maintenance => "maintenance",
        }
    }
}

impl TryFrom<String> for Goal {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "weight_loss" => Ok(Goal::WeightLoss),
            "weight_gain" => Ok(Goal::WeightGain),
            "maintenance" | "" => Ok(Goal::Maintenance),
            _ => Err(UnknownVariant { kind: "goal", value }),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub height: f64,
    pub weight: f64,
    pub age: i32,
    pub gender: String,
    #[sqlx(try_from = "String")]
    pub activity_level: ActivityLevel,
    pub eating_habits: String,
    #[sqlx(try_from = "String")]
    pub goal: Goal,
    pub waist_circumference: f64,
    pub last_updated: Option<chrono::DateTime<Utc>>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

/// Attributes of a user that has not been stored yet.
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
    pub height: f64,
    pub weight: f64,
    pub age: i32,
    pub gender: String,
    pub activity_level: ActivityLevel,
    pub eating_habits: String,
    pub goal: Goal,
    pub waist_circumference: f64,
}

#[derive(sqlx::FromRow)]
pub struct GetUserCredentials {
    pub id: i64,
    pub password: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Progress {
    pub id: i64,
    pub user_id: i64,
    pub weight: f64,
    pub date: chrono::DateTime<Utc>,
    pub calories: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}
