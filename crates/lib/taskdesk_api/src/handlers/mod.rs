//! Request handlers.

pub mod auth;
pub mod health;
pub mod labels;
pub mod tasks;
pub mod users;
