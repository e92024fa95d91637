//! In-memory store for local development and tests.
//!
//! Mirrors the PostgreSQL schema's constraints: unique emails, cascading
//! deletes from users, and label links restricted to the owner's labels.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LabelStore, RefreshTokenStore, StoreError, TaskStore, UserStore};
use crate::models::auth::{RefreshToken, User, UserWithPassword};
use crate::models::tasks::{Label, Task};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<Uuid, UserWithPassword>,
    refresh_tokens: BTreeMap<Uuid, RefreshToken>,
    tasks: BTreeMap<Uuid, Task>,
    labels: BTreeMap<Uuid, Label>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.user.email == email && Some(u.user.id) != except)
    }

    /// Keep only label ids owned by `user_id`, sorted and deduplicated.
    fn owned_labels(&self, user_id: Uuid, label_ids: &[Uuid]) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = label_ids
            .iter()
            .copied()
            .filter(|id| self.labels.get(id).is_some_and(|l| l.user_id == user_id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Store implementation holding everything behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &UserWithPassword) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        state.users.insert(user.user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserWithPassword>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.user.email == email)
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Ok(false);
        }
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::DuplicateEmail);
        }
        if let Some(existing) = state.users.get_mut(&user.id) {
            existing.user.username = user.username.clone();
            existing.user.email = user.email.clone();
        }
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.refresh_tokens.retain(|_, t| t.user_id != id);
        state.tasks.retain(|_, t| t.user_id != id);
        state.labels.retain(|_, l| l.user_id != id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .refresh_tokens
            .insert(token.id, token.clone());
        Ok(())
    }

    async fn get_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .refresh_tokens
            .values()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.refresh_tokens.remove(&id).is_some())
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| t.user_id != user_id);
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let mut task = task.clone();
        task.label_ids = state.owned_labels(task.user_id, &task.label_ids);
        state.tasks.insert(task.id, task);
        Ok(())
    }

    async fn get_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state
            .tasks
            .get(&task.id)
            .is_some_and(|t| t.user_id == task.user_id);
        if !owned {
            return Ok(false);
        }
        let mut task = task.clone();
        task.label_ids = state.owned_labels(task.user_id, &task.label_ids);
        state.tasks.insert(task.id, task);
        Ok(true)
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state.tasks.get(&id).is_some_and(|t| t.user_id == user_id);
        if owned {
            state.tasks.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl LabelStore for MemoryStore {
    async fn create_label(&self, label: &Label) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .labels
            .insert(label.id, label.clone());
        Ok(())
    }

    async fn get_label(&self, user_id: Uuid, id: Uuid) -> Result<Option<Label>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .labels
            .get(&id)
            .filter(|l| l.user_id == user_id)
            .cloned())
    }

    async fn list_labels(&self, user_id: Uuid) -> Result<Vec<Label>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .labels
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_label(&self, label: &Label) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.labels.get_mut(&label.id) {
            Some(existing) if existing.user_id == label.user_id => {
                existing.name = label.name.clone();
                existing.color = label.color.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_label(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let owned = state.labels.get(&id).is_some_and(|l| l.user_id == user_id);
        if owned {
            state.labels.remove(&id);
            for task in state.tasks.values_mut() {
                task.label_ids.retain(|l| *l != id);
            }
        }
        Ok(owned)
    }
}
