//! Storage capabilities.
//!
//! The auth core and the task services depend only on these traits. Each
//! backend (`postgres`, `memory`) implements all of them on one type so a
//! single `Arc` can be handed to every service.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{RefreshToken, User, UserWithPassword};
use crate::models::tasks::{Label, Task};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email uniqueness constraint rejected a write.
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn create_user(&self, user: &UserWithPassword) -> Result<(), StoreError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserWithPassword>, StoreError>;

    async fn get_user_by_email(&self, email: &str)
    -> Result<Option<UserWithPassword>, StoreError>;

    /// Overwrite username and email. Returns `false` if the user does not exist.
    async fn update_user(&self, user: &User) -> Result<bool, StoreError>;

    /// Delete a user; owned tokens, tasks and labels go with it.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Cheap round trip used by health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Refresh token persistence.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError>;

    async fn get_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, StoreError>;

    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Delete every refresh token owned by `user_id`, returning the count.
    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// Task persistence. Every read and write is scoped to the owning user.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn get_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// All tasks of a user, oldest first.
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;

    /// Replace fields and label links. Returns `false` if no such task.
    async fn update_task(&self, task: &Task) -> Result<bool, StoreError>;

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}

/// Label persistence. Every read and write is scoped to the owning user.
#[async_trait]
pub trait LabelStore: Send + Sync {
    async fn create_label(&self, label: &Label) -> Result<(), StoreError>;

    async fn get_label(&self, user_id: Uuid, id: Uuid) -> Result<Option<Label>, StoreError>;

    /// All labels of a user, oldest first.
    async fn list_labels(&self, user_id: Uuid) -> Result<Vec<Label>, StoreError>;

    async fn update_label(&self, label: &Label) -> Result<bool, StoreError>;

    /// Delete a label; it is detached from any task carrying it.
    async fn delete_label(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
