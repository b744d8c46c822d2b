use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{NewTask, Task, TaskPatch, TaskRow};

/// Persistence for tasks. Every lookup is keyed by the owner together with
/// the task id, so a task owned by someone else is simply not found.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Task>>;

    async fn create(&self, owner: Uuid, task: NewTask) -> anyhow::Result<Task>;

    async fn update(&self, owner: Uuid, id: Uuid, patch: TaskPatch)
        -> anyhow::Result<Option<Task>>;

    /// Returns `false` when nothing matched `(id, owner)`.
    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTaskStore {
    db: PgPool,
}

impl PgTaskStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, user_id, title, description, priority, completed, created_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list tasks by owner")?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn create(&self, owner: Uuid, task: NewTask) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, user_id, title, description, priority)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, description, priority, completed, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        row.try_into()
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
               SET title       = COALESCE($3, title),
                   description = COALESCE($4, description),
                   priority    = COALESCE($5, priority),
                   completed   = COALESCE($6, completed)
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, priority, completed, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.priority.map(|p| p.as_str()))
        .bind(patch.completed)
        .fetch_optional(&self.db)
        .await
        .context("update task")?;
        row.map(Task::try_from).transpose()
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM tasks WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete task")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Process-local task store keyed by id.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_by_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks.values().filter(|t| t.owner == owner).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn create(&self, owner: Uuid, task: NewTask) -> anyhow::Result<Task> {
        let task = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            priority: task.priority,
            completed: false,
            created_at: OffsetDateTime::now_utc(),
            owner,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: TaskPatch,
    ) -> anyhow::Result<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id).filter(|t| t.owner == owner) {
            Some(task) => {
                patch.apply(task);
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut tasks = self.tasks.write().await;
        if tasks.get(&id).is_some_and(|t| t.owner == owner) {
            tasks.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
