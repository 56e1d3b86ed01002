pub mod auth;
pub mod cron;
pub mod digest;
pub mod health;
pub mod news;
pub mod users;
