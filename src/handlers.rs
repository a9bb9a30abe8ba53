pub mod auth;
pub mod consumption;
pub mod health;
