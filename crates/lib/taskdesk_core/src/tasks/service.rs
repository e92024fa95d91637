//! Task CRUD with label association.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::TaskError;
use crate::models::tasks::{Task, TaskInput};
use crate::store::{LabelStore, TaskStore};

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    labels: Arc<dyn LabelStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, labels: Arc<dyn LabelStore>) -> Self {
        Self { tasks, labels }
    }

    /// Validate input and resolve label ids: every label must belong to
    /// `user_id`. Returns the sorted, deduplicated ids.
    async fn check_input(&self, user_id: Uuid, input: &TaskInput) -> Result<Vec<Uuid>, TaskError> {
        if input.title.trim().is_empty() {
            return Err(TaskError::Validation("Title is required".into()));
        }
        let mut label_ids = input.label_ids.clone();
        label_ids.sort();
        label_ids.dedup();
        for id in &label_ids {
            if self.labels.get_label(user_id, *id).await?.is_none() {
                return Err(TaskError::Validation(format!("Unknown label {id}")));
            }
        }
        Ok(label_ids)
    }

    pub async fn create(&self, user_id: Uuid, input: TaskInput) -> Result<Task, TaskError> {
        let label_ids = self.check_input(user_id, &input).await?;
        let task = Task {
            id: Uuid::now_v7(),
            user_id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            label_ids,
        };
        self.tasks.create_task(&task).await?;
        info!(user_id = %user_id, task_id = %task.id, "created task");
        Ok(task)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Task, TaskError> {
        self.tasks
            .get_task(user_id, id)
            .await?
            .ok_or(TaskError::NotFound("task"))
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_tasks(user_id).await?)
    }

    /// Replace every field of a task, label set included.
    pub async fn update(&self, user_id: Uuid, id: Uuid, input: TaskInput) -> Result<Task, TaskError> {
        let label_ids = self.check_input(user_id, &input).await?;
        let task = Task {
            id,
            user_id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            label_ids,
        };
        if !self.tasks.update_task(&task).await? {
            return Err(TaskError::NotFound("task"));
        }
        Ok(task)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), TaskError> {
        if !self.tasks.delete_task(user_id, id).await? {
            return Err(TaskError::NotFound("task"));
        }
        info!(user_id = %user_id, task_id = %id, "deleted task");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::MemoryStore;
    use crate::tasks::LabelService;

    fn services() -> (TaskService, LabelService) {
        let store = Arc::new(MemoryStore::new());
        (
            TaskService::new(store.clone(), store.clone()),
            LabelService::new(store),
        )
    }

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn title_is_required() {
        let (tasks, _) = services();
        let err = tasks.create(Uuid::now_v7(), input("  ")).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[tokio::test]
    async fn create_get_list_roundtrip() {
        let (tasks, labels) = services();
        let uid = Uuid::now_v7();
        let work = labels.create(uid, "work", "#00f").await.unwrap();
        let due = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();

        let task = tasks
            .create(
                uid,
                TaskInput {
                    title: "write report".into(),
                    description: "quarterly".into(),
                    due_date: Some(due),
                    label_ids: vec![work.id, work.id],
                },
            )
            .await
            .unwrap();
        assert_eq!(task.label_ids, vec![work.id]);
        assert_eq!(tasks.get(uid, task.id).await.unwrap(), task);
        assert_eq!(tasks.list(uid).await.unwrap(), vec![task]);
    }

    #[tokio::test]
    async fn foreign_or_unknown_labels_are_rejected() {
        let (tasks, labels) = services();
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();
        let theirs = labels.create(other, "theirs", "#000").await.unwrap();

        for label_ids in [vec![theirs.id], vec![Uuid::now_v7()]] {
            let err = tasks
                .create(
                    owner,
                    TaskInput {
                        title: "t".into(),
                        label_ids,
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, TaskError::Validation(_)));
        }
        assert!(tasks.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tasks_are_scoped_to_owner() {
        let (tasks, _) = services();
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();
        let task = tasks.create(owner, input("mine")).await.unwrap();

        assert!(matches!(
            tasks.get(other, task.id).await.unwrap_err(),
            TaskError::NotFound(_)
        ));
        assert!(matches!(
            tasks.update(other, task.id, input("stolen")).await.unwrap_err(),
            TaskError::NotFound(_)
        ));
        assert!(matches!(
            tasks.delete(other, task.id).await.unwrap_err(),
            TaskError::NotFound(_)
        ));
        assert_eq!(tasks.get(owner, task.id).await.unwrap().title, "mine");
    }

    #[tokio::test]
    async fn update_replaces_fields_and_labels() {
        let (tasks, labels) = services();
        let uid = Uuid::now_v7();
        let a = labels.create(uid, "a", "#111").await.unwrap();
        let b = labels.create(uid, "b", "#222").await.unwrap();
        let task = tasks
            .create(
                uid,
                TaskInput {
                    title: "t".into(),
                    label_ids: vec![a.id],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = tasks
            .update(
                uid,
                task.id,
                TaskInput {
                    title: "t2".into(),
                    description: "more".into(),
                    due_date: None,
                    label_ids: vec![b.id],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.label_ids, vec![b.id]);
        assert_eq!(tasks.get(uid, task.id).await.unwrap(), updated);

        tasks.delete(uid, task.id).await.unwrap();
        assert!(matches!(
            tasks.get(uid, task.id).await.unwrap_err(),
            TaskError::NotFound(_)
        ));
    }
}
