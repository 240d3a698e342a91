//! Query functions per table. Each takes the pool (or an open transaction)
//! and returns `sqlx::Error` unchanged; mapping to HTTP status happens in
//! the handlers.

pub mod catalog;
pub mod community;
pub mod gamification;
pub mod plans;
pub mod progress;
pub mod reminders;
pub mod users;
