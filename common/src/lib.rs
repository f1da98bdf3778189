pub mod access_rules;
pub mod auth;
pub mod context;
pub mod entities;
pub mod error;
pub mod repository;
pub mod services;

pub fn default_timestamp() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
