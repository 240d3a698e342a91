use serde::{Deserialize, Serialize};
use chrono::Utc;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Point {
    pub id: i64,
    pub user_id: i64,
    pub points: i32,
    pub reason: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    pub user_id: i64,
    pub points: i32,
    pub reason: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAchievement {
    pub user_id: i64,
    pub name: String,
}
