pub mod calculator;
pub mod scheduler;
