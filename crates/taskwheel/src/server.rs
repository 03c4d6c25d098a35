//! HTTP surface exposing the task lifecycle.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use taskwheel_app::{AsyncTaskService, TaskError, TaskStore};
use taskwheel_core::{Repeat, Task, TaskId, date};
use time::{Date, OffsetDateTime};
use tokio::net::TcpListener;
use tracing::info;

/// Shared application dependencies handed to every handler.
pub struct AppState<S> {
    service: AsyncTaskService<S>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<S> AppState<S> {
    /// Wrap the async service for use as router state.
    pub const fn new(service: AsyncTaskService<S>) -> Self {
        Self { service }
    }
}

/// Uniform response body: `id` and `error` appear only when set, `tasks` is
/// always present (possibly empty).
#[derive(Debug, Default, Serialize)]
struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    tasks: Vec<Task>,
}

impl ApiResponse {
    fn with_id(id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    fn with_error(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }
}

/// Query carrying a task id.
#[derive(Debug, Default, Deserialize)]
struct IdQuery {
    #[serde(default)]
    id: String,
}

/// Query for the standalone next-date computation.
#[derive(Debug, Default, Deserialize)]
struct NextDateQuery {
    #[serde(default)]
    now: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    repeat: String,
}

/// Build the API router over the given state.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: TaskStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/nextdate", get(next_date))
        .route("/api/tasks", get(list_tasks::<S>))
        .route(
            "/api/task",
            post(add_task::<S>)
                .get(get_task::<S>)
                .put(edit_task::<S>)
                .delete(delete_task::<S>),
        )
        .route("/api/task/done", post(complete_task::<S>))
        .with_state(state)
}

/// Bind the listener and serve the API until a shutdown signal arrives.
///
/// # Errors
/// Returns an error when binding or serving fails.
pub async fn serve<S>(state: AppState<S>, port: u16) -> anyhow::Result<()>
where
    S: TaskStore + Send + Sync + 'static,
{
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("scheduler API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

/// Today's calendar date; the reference date handed to the core.
fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn status_for(err: &TaskError) -> StatusCode {
    match err {
        TaskError::Field(_)
        | TaskError::Rule(_)
        | TaskError::Date(_)
        | TaskError::MissingId
        | TaskError::InvalidId(_) => StatusCode::BAD_REQUEST,
        TaskError::NotFound(_) => StatusCode::NOT_FOUND,
        TaskError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &TaskError) -> Response {
    (status_for(err), Json(ApiResponse::with_error(err.to_string()))).into_response()
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::with_error(rejection.body_text())),
    )
        .into_response()
}

async fn add_task<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    let task = match payload {
        Ok(Json(task)) => task,
        Err(rejection) => return rejection_response(&rejection),
    };
    match state.service.add(task, today()).await {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::with_id(id))).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn get_task<S>(State(state): State<AppState<S>>, Query(query): Query<IdQuery>) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    match state.service.get(query.id).await {
        Ok(task) => Json(ApiResponse::with_tasks(vec![task])).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn edit_task<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    let task = match payload {
        Ok(Json(task)) => task,
        Err(rejection) => return rejection_response(&rejection),
    };
    match state.service.edit(task, today()).await {
        Ok(updated) => Json(ApiResponse::with_tasks(vec![updated])).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn complete_task<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<IdQuery>,
) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    match state.service.complete(query.id, today()).await {
        Ok(()) => Json(ApiResponse::default()).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn delete_task<S>(State(state): State<AppState<S>>, Query(query): Query<IdQuery>) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    match state.service.delete(query.id).await {
        Ok(()) => Json(ApiResponse::default()).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn list_tasks<S>(State(state): State<AppState<S>>) -> Response
where
    S: TaskStore + Send + Sync + 'static,
{
    match state.service.list().await {
        Ok(tasks) => Json(ApiResponse::with_tasks(tasks)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn next_date(Query(query): Query<NextDateQuery>) -> Response {
    match compute_next_date(&query) {
        Ok(next) => next.into_response(),
        Err(err) => error_response(&err),
    }
}

/// Standalone next-date computation: everything arrives as query strings.
fn compute_next_date(query: &NextDateQuery) -> Result<String, TaskError> {
    let now = date::parse(&query.now)?;
    let anchor = date::parse(&query.date)?;
    let rule: Repeat = query.repeat.parse()?;
    Ok(date::format(rule.next_occurrence(now, anchor)?))
}
