pub mod community;
pub mod gamification;
pub mod plan;
pub mod reminder;
pub mod user;
