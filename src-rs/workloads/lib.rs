//! Payloads for the three queues the hub runs, plus the hooks that keep each
//! payload in step with its job's lifecycle.

pub mod classification;
pub mod export;
pub mod format;
pub mod ingestion;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::QueueResult;
use crate::job::{Job, JobQueue, JobStatus};
use crate::sim::{ProgressPlan, SimSettings};

pub use classification::{ClassificationMeta, ClassificationRequest, ClassificationStage, SampleKind, StepState};
pub use export::{ExportFormat, ExportMeta, ExportRequest};
pub use format::{format_expires_in, format_size, format_time_ago};
pub use ingestion::{FileKind, FileMeta, FileRequest, PipelineStage};

pub trait Workload: Clone + Serialize + Send + Sync + 'static {
    /// Request body accepted when enqueueing.
    type Request: DeserializeOwned + Send + 'static;

    /// Id prefix and log name of the queue.
    const PREFIX: &'static str;

    fn build(request: Self::Request, now: DateTime<Utc>) -> Result<(String, Self), String>;

    fn plan(settings: &SimSettings) -> ProgressPlan {
        ProgressPlan::uniform(settings.step, settings.tick)
    }

    fn enter_stage(&mut self, _stage: &str) {}

    fn on_completed(&mut self, _completed_at: DateTime<Utc>) {}

    fn on_reset(&mut self) {}
}

pub fn new_queue<W: Workload>() -> JobQueue<W> {
    JobQueue::new(W::PREFIX)
}

pub fn enqueue_request<W: Workload>(
    queue: &mut JobQueue<W>,
    request: W::Request,
) -> Result<Job<W>, String> {
    let (label, metadata) = W::build(request, queue.clock().now())?;
    Ok(queue.enqueue(&label, metadata))
}

/// `JobQueue::advance` followed by the completion hook when it applies.
pub fn advance_job<W: Workload>(
    queue: &mut JobQueue<W>,
    id: &str,
    delta: u32,
) -> QueueResult<Job<W>> {
    let job = queue.advance(id, delta)?;
    if job.status != JobStatus::Completed {
        return Ok(job);
    }
    match job.completed_at {
        Some(at) => queue.update_metadata(id, |meta| meta.on_completed(at)),
        None => Ok(job),
    }
}

pub fn retry_job<W: Workload>(queue: &mut JobQueue<W>, id: &str) -> QueueResult<Job<W>> {
    queue.retry(id)?;
    queue.update_metadata(id, |meta| meta.on_reset())
}
