pub mod auth;
pub mod community;
pub mod gamification;
pub mod plan;
pub mod profile;
pub mod progress;
pub mod reminder;
