use tracing::info;
use uuid::Uuid;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::repo_types::{NewTask, Task, TaskPatch};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn title_required() -> AppError {
    AppError::Validation("Title is required".into())
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Path ids that are not UUIDs can't name any task, so they are reported the
/// same way as a missing one.
pub fn parse_task_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

pub async fn list(state: &AppState, owner: Uuid) -> AppResult<Vec<Task>> {
    Ok(state.tasks.list_by_owner(owner).await?)
}

pub async fn create(state: &AppState, owner: Uuid, req: CreateTaskRequest) -> AppResult<Task> {
    let title = req
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(title_required)?;

    let new = NewTask {
        title,
        description: req.description.unwrap_or_default(),
        priority: req.priority.unwrap_or_default(),
    };
    let task = state.tasks.create(owner, new).await?;
    info!(task_id = %task.id, user_id = %owner, "task created");
    Ok(task)
}

pub async fn update(
    state: &AppState,
    owner: Uuid,
    id: Uuid,
    req: UpdateTaskRequest,
) -> AppResult<Task> {
    if req.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(title_required());
    }

    let patch = TaskPatch {
        title: req.title,
        description: req.description,
        priority: req.priority,
        completed: req.completed,
    };
    let task = state
        .tasks
        .update(owner, id, patch)
        .await?
        .ok_or_else(task_not_found)?;
    info!(task_id = %task.id, user_id = %owner, "task updated");
    Ok(task)
}

pub async fn delete(state: &AppState, owner: Uuid, id: Uuid) -> AppResult<()> {
    if !state.tasks.delete(owner, id).await? {
        return Err(task_not_found());
    }
    info!(task_id = %id, user_id = %owner, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repo_types::Priority;

    fn titled(title: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.map(Into::into),
            description: Some("details".into()),
            priority: Some(Priority::High),
        }
    }

    #[tokio::test]
    async fn create_rejects_missing_or_blank_title() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        for title in [None, Some(""), Some("   ")] {
            let err = create(&state, owner, titled(title)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(list(&state, owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        let req = CreateTaskRequest {
            title: Some("X".into()),
            ..Default::default()
        };
        create(&state, owner, req).await.unwrap();

        let tasks = list(&state, owner).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "X");
        assert_eq!(tasks[0].description, "");
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert!(!tasks[0].completed);
        assert_eq!(tasks[0].owner, owner);
    }

    #[tokio::test]
    async fn update_rejects_blank_title() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        let task = create(&state, owner, titled(Some("X"))).await.unwrap();
        let req = UpdateTaskRequest {
            title: Some("".into()),
            ..Default::default()
        };
        let err = update(&state, owner, task.id, req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_and_foreign_tasks_share_one_error() {
        let state = AppState::fake();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = create(&state, alice, titled(Some("X"))).await.unwrap();

        let foreign = delete(&state, bob, task.id).await.unwrap_err();
        let missing = delete(&state, bob, Uuid::new_v4()).await.unwrap_err();
        let malformed = parse_task_id("not-a-uuid").unwrap_err();

        assert_eq!(foreign.to_string(), missing.to_string());
        assert_eq!(foreign.to_string(), malformed.to_string());
        assert_eq!(foreign.status_code(), missing.status_code());
        assert_eq!(list(&state, alice).await.unwrap().len(), 1);
    }
}
