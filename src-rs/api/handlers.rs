use std::sync::MutexGuard;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::error::ApiError;
use crate::job::{Job, JobQueue, JobStatus};
use crate::sim::Runner;
use crate::workloads::{advance_job, enqueue_request, retry_job, Workload};

/// Router state for one workload's queue.
pub struct QueueState<W: Workload> {
    pub runner: Runner<W>,
    pub auto_start: bool,
}

impl<W: Workload> Clone for QueueState<W> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            auto_start: self.auto_start,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnqueueBody<R> {
    #[serde(flatten)]
    pub request: R,
    pub start: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceBody {
    pub delta: u32,
}

#[derive(Debug, Deserialize)]
pub struct FailBody {
    pub error: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClearScope {
    #[default]
    Completed,
    Failed,
    All,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearBody {
    #[serde(default)]
    pub scope: ClearScope,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessBody {
    #[serde(default)]
    pub ids: Vec<String>,
}

type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn json_body<T>(body: JsonBody<T>) -> Result<T, ApiError> {
    body.map(|Json(body)| body).map_err(ApiError::from)
}

/// A request sent without a JSON body takes the defaults; a body that is
/// present but malformed is still rejected.
fn json_body_or_default<T: Default>(body: JsonBody<T>) -> Result<T, ApiError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

fn lock<W: Workload>(state: &QueueState<W>) -> Result<MutexGuard<'_, JobQueue<W>>, ApiError> {
    state
        .runner
        .queue_ref()
        .lock()
        .map_err(|_| ApiError::Internal("queue lock poisoned".to_string()))
}

pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_list<W: Workload>(
    State(state): State<QueueState<W>>,
) -> Result<Json<Value>, ApiError> {
    let queue = lock(&state)?;
    Ok(Json(json!({
        "jobs": queue.list(),
        "counts": queue.counts(),
        "paused": state.runner.is_paused(),
        "running": state.runner.running(),
    })))
}

pub async fn handle_enqueue<W: Workload>(
    State(state): State<QueueState<W>>,
    body: JsonBody<EnqueueBody<W::Request>>,
) -> Result<(StatusCode, Json<Job<W>>), ApiError> {
    let body = json_body(body)?;
    let job = {
        let mut queue = lock(&state)?;
        enqueue_request(&mut queue, body.request).map_err(ApiError::BadRequest)?
    };
    if body.start.unwrap_or(state.auto_start) {
        state.runner.start(&job.id);
    }
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn handle_get<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
) -> Result<Json<Job<W>>, ApiError> {
    let job = lock(&state)?.get(&id).cloned();
    job.map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job not found: {}", id)))
}

pub async fn handle_remove<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
) -> Result<Json<Job<W>>, ApiError> {
    let mut queue = lock(&state)?;
    Ok(Json(queue.remove(&id)?))
}

pub async fn handle_advance<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
    body: JsonBody<AdvanceBody>,
) -> Result<Json<Job<W>>, ApiError> {
    let body = json_body(body)?;
    let mut queue = lock(&state)?;
    Ok(Json(advance_job(&mut queue, &id, body.delta)?))
}

pub async fn handle_fail<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
    body: JsonBody<FailBody>,
) -> Result<Json<Job<W>>, ApiError> {
    let body = json_body(body)?;
    let reason = body.error.trim();
    if reason.is_empty() {
        return Err(ApiError::BadRequest("error message required".to_string()));
    }
    let mut queue = lock(&state)?;
    Ok(Json(queue.fail(&id, reason)?))
}

pub async fn handle_retry<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
) -> Result<Json<Job<W>>, ApiError> {
    let job = {
        let mut queue = lock(&state)?;
        retry_job(&mut queue, &id)?
    };
    if state.auto_start {
        state.runner.start(&job.id);
    }
    Ok(Json(job))
}

pub async fn handle_start<W: Workload>(
    State(state): State<QueueState<W>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    {
        let queue = lock(&state)?;
        let job = queue
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("job not found: {}", id)))?;
        if job.is_terminal() {
            return Err(ApiError::Conflict(format!(
                "cannot start job {} while {}",
                id, job.status
            )));
        }
    }
    let started = state.runner.start(&id).is_some();
    Ok(Json(json!({"id": id, "started": started})))
}

pub async fn handle_clear<W: Workload>(
    State(state): State<QueueState<W>>,
    body: JsonBody<ClearBody>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body_or_default(body)?;
    let mut queue = lock(&state)?;
    let removed = match body.scope {
        ClearScope::Completed => queue.clear(|job| job.status == JobStatus::Completed),
        ClearScope::Failed => queue.clear(|job| job.status == JobStatus::Failed),
        ClearScope::All => queue.clear(|_| true),
    };
    Ok(Json(json!({"removed": removed, "remaining": queue.len()})))
}

/// Starts the listed jobs, or every queued job when no ids are given.
pub async fn handle_process<W: Workload>(
    State(state): State<QueueState<W>>,
    body: JsonBody<ProcessBody>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body_or_default(body)?;
    let ids = if body.ids.is_empty() {
        let queue = lock(&state)?;
        let queued: Vec<String> = queue
            .iter()
            .filter(|job| job.status == JobStatus::Queued)
            .map(|job| job.id.clone())
            .collect();
        queued
    } else {
        body.ids
    };
    let started = state.runner.start_many(&ids);
    info!(queue = W::PREFIX, requested = ids.len(), started, "batch processing");
    Ok(Json(json!({"requested": ids.len(), "started": started})))
}

pub async fn handle_pause<W: Workload>(State(state): State<QueueState<W>>) -> Json<Value> {
    state.runner.pause();
    Json(json!({"paused": true}))
}

pub async fn handle_resume<W: Workload>(State(state): State<QueueState<W>>) -> Json<Value> {
    state.runner.resume();
    Json(json!({"paused": false}))
}
