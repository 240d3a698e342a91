use serde::{Deserialize, Serialize};
use chrono::Utc;

use super::user::UnknownVariant;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Meal,
    Exercise,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Meal => "meal",
            ReminderType::Exercise => "exercise",
        }
    }
}

impl TryFrom<String> for ReminderType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "meal" => Ok(ReminderType::Meal),
            "exercise" => Ok(ReminderType::Exercise),
            _ => Err(UnknownVariant { kind: "reminder type", value }),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub reminder_type: ReminderType,
    // Cron expression, e.g. "0 8 * * *" for 08:00 every day
    pub time: String,
    pub message: String,
    pub active: bool,
    pub created_at: chrono::DateTime<Utc>,
}
