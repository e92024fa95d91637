//! Label CRUD.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;
use uuid::Uuid;

use super::TaskError;
use crate::models::tasks::Label;
use crate::store::LabelStore;

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{3}){1,2}$").expect("Invalid regex"));

/// Whether `color` is `#rgb` or `#rrggbb`.
pub fn is_valid_color(color: &str) -> bool {
    COLOR_RE.is_match(color)
}

fn validate(name: &str, color: &str) -> Result<(), TaskError> {
    if name.trim().is_empty() || color.trim().is_empty() {
        return Err(TaskError::Validation("Name and color are required".into()));
    }
    if !is_valid_color(color) {
        return Err(TaskError::Validation(
            "Color must be a hex code like #fff or #ffffff".into(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LabelService {
    store: Arc<dyn LabelStore>,
}

impl LabelService {
    pub fn new(store: Arc<dyn LabelStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: Uuid, name: &str, color: &str) -> Result<Label, TaskError> {
        validate(name, color)?;
        let label = Label {
            id: Uuid::now_v7(),
            user_id,
            name: name.to_string(),
            color: color.to_string(),
        };
        self.store.create_label(&label).await?;
        info!(user_id = %user_id, label_id = %label.id, "created label");
        Ok(label)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Label, TaskError> {
        self.store
            .get_label(user_id, id)
            .await?
            .ok_or(TaskError::NotFound("label"))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Label>, TaskError> {
        Ok(self.store.list_labels(user_id).await?)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        name: &str,
        color: &str,
    ) -> Result<Label, TaskError> {
        validate(name, color)?;
        let label = Label {
            id,
            user_id,
            name: name.to_string(),
            color: color.to_string(),
        };
        if !self.store.update_label(&label).await? {
            return Err(TaskError::NotFound("label"));
        }
        Ok(label)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), TaskError> {
        if !self.store.delete_label(user_id, id).await? {
            return Err(TaskError::NotFound("label"));
        }
        info!(user_id = %user_id, label_id = %id, "deleted label");
        Ok(())
    }
}
