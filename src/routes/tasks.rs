use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{StatusChange, Task, TaskForm},
    services::{
        dashboard::{task_stats, TaskStats},
        filters::{filter_tasks, TaskQuery},
        validation::validate_task,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats", get(stats))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/status", put(change_status))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskQuery>,
) -> Json<Vec<Task>> {
    let tasks = state.store.tasks.get_all().await;
    Json(filter_tasks(tasks, &query))
}

async fn stats(State(state): State<Arc<AppState>>) -> Json<TaskStats> {
    let tasks = state.store.tasks.get_all().await;
    Json(task_stats(&tasks, Utc::now().date_naive()))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.store.tasks.get_by_id(id).await?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TaskForm>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    validate_task(&form)?;
    let due_date = form
        .due_date
        .ok_or_else(|| AppError::InvalidInput("Due date is required".to_string()))?;
    let now = Utc::now();
    let task = state
        .store
        .tasks
        .create(|id| Task {
            id,
            title: form.title.trim().to_string(),
            description: form.description,
            due_date,
            priority: form.priority,
            status: form.status,
            contact_id: form.contact_id,
            deal_id: form.deal_id,
            created_at: now,
        })
        .await;
    tracing::info!("Created task {} due {}", task.id, task.due_date);
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<TaskForm>,
) -> Result<Json<Task>, AppError> {
    validate_task(&form)?;
    let due_date = form
        .due_date
        .ok_or_else(|| AppError::InvalidInput("Due date is required".to_string()))?;
    let task = state
        .store
        .tasks
        .update(id, |task| {
            task.title = form.title.trim().to_string();
            task.description = form.description;
            task.due_date = due_date;
            task.priority = form.priority;
            task.status = form.status;
            task.contact_id = form.contact_id;
            task.deal_id = form.deal_id;
        })
        .await?;
    Ok(Json(task))
}

/// Marks a task done or reopens it. Every other field is kept.
async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Task>, AppError> {
    let task = state
        .store
        .tasks
        .update(id, |task| task.status = change.status)
        .await?;
    tracing::info!("Task {} is now {:?}", id, task.status);
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.store.tasks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
