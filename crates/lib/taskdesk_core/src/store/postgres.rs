//! PostgreSQL store backed by a `sqlx` connection pool.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{LabelStore, RefreshTokenStore, StoreError, TaskStore, UserStore};
use crate::models::auth::{RefreshToken, User, UserWithPassword};
use crate::models::tasks::{Label, Task};

/// Columns selected for a task, label ids aggregated from `task_labels`.
const TASK_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.title, t.description, t.due_date,
           COALESCE(
               array_agg(tl.label_id ORDER BY tl.label_id)
                   FILTER (WHERE tl.label_id IS NOT NULL),
               '{}'
           ) AS label_ids
    FROM tasks t
    LEFT JOIN task_labels tl ON tl.task_id = t.id
"#;

/// Store implementation over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique violation on `users.email` to `DuplicateEmail`.
fn map_user_write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        _ => StoreError::DbError(e),
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
}

impl From<UserRow> for UserWithPassword {
    fn from(row: UserRow) -> Self {
        UserWithPassword {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
            },
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &UserWithPassword) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.user.id)
        .bind(&user.user.username)
        .bind(&user.user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserWithPassword::from))
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserWithPassword::from))
    }

    async fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET username = $1, email = $2, updated_at = now() WHERE id = $3",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(map_user_write_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_refresh_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, StoreError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, expires_at \
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_refresh_token(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Link a task to its labels. Only labels owned by the task's user are linked.
async fn insert_task_labels(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    task: &Task,
) -> Result<(), sqlx::Error> {
    if task.label_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO task_labels (task_id, label_id)
        SELECT $1, l.id FROM labels l
        WHERE l.id = ANY($2) AND l.user_id = $3
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(task.id)
    .bind(&task.label_ids)
    .bind(task.user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, title, description, due_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .execute(&mut *tx)
        .await?;

        insert_task_labels(&mut tx, task).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let sql = format!("{TASK_SELECT} WHERE t.id = $1 AND t.user_id = $2 GROUP BY t.id");
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let sql = format!("{TASK_SELECT} WHERE t.user_id = $1 GROUP BY t.id ORDER BY t.id ASC");
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_task(&self, task: &Task) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, due_date = $3, updated_at = now()
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.id)
        .bind(task.user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task.id)
            .execute(&mut *tx)
            .await?;
        insert_task_labels(&mut tx, task).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LabelStore for PgStore {
    async fn create_label(&self, label: &Label) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO labels (id, user_id, name, color) VALUES ($1, $2, $3, $4)")
            .bind(label.id)
            .bind(label.user_id)
            .bind(&label.name)
            .bind(&label.color)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_label(&self, user_id: Uuid, id: Uuid) -> Result<Option<Label>, StoreError> {
        let row = sqlx::query_as::<_, Label>(
            "SELECT id, user_id, name, color FROM labels WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_labels(&self, user_id: Uuid) -> Result<Vec<Label>, StoreError> {
        let rows = sqlx::query_as::<_, Label>(
            "SELECT id, user_id, name, color FROM labels WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_label(&self, label: &Label) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE labels SET name = $1, color = $2 WHERE id = $3 AND user_id = $4")
                .bind(&label.name)
                .bind(&label.color)
                .bind(label.id)
                .bind(label.user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_label(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
