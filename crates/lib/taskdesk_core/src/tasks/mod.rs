//! Task and label management, scoped to the owning user.

pub mod labels;
pub mod service;

use thiserror::Error;

use crate::store::StoreError;

pub use labels::LabelService;
pub use service::TaskService;

/// Task and label errors.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Absent, or owned by someone else.
    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}
