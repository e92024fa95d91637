//! # taskdesk_core
//!
//! Core domain logic for Taskdesk: authentication, storage and the task and
//! label services.

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod tasks;
