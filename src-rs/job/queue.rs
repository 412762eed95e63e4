use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::types::{Job, JobStatus, StatusCounts};
use crate::error::{QueueError, QueueResult};

pub type SharedQueue<M> = Arc<Mutex<JobQueue<M>>>;

/// Ordered, in-memory collection of jobs. Insertion order is the only order.
pub struct JobQueue<M> {
    prefix: String,
    clock: Arc<dyn Clock>,
    counter: u64,
    jobs: Vec<Job<M>>,
}

impl<M: Clone> JobQueue<M> {
    pub fn new(prefix: &str) -> Self {
        Self::with_clock(prefix, Arc::new(SystemClock))
    }

    pub fn with_clock(prefix: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            prefix: prefix.to_string(),
            clock,
            counter: 0,
            jobs: Vec::new(),
        }
    }

    pub fn shared(self) -> SharedQueue<M> {
        Arc::new(Mutex::new(self))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn enqueue(&mut self, label: &str, metadata: M) -> Job<M> {
        let created_at = self.clock.now();
        self.counter += 1;
        let id = format!(
            "{}_{}_{}",
            self.prefix,
            created_at.timestamp_millis(),
            self.counter
        );
        let job = Job {
            id,
            label: label.to_string(),
            status: JobStatus::Queued,
            progress: 0,
            attempt: 0,
            created_at,
            completed_at: None,
            error: None,
            metadata,
        };
        info!(queue = %self.prefix, id = %job.id, label = %job.label, "job queued");
        self.jobs.push(job.clone());
        job
    }

    /// Moves a queued job into processing and adds `delta` percent, clamped
    /// to 100. Reaching 100 completes the job.
    pub fn advance(&mut self, id: &str, delta: u32) -> QueueResult<Job<M>> {
        let now = self.clock.now();
        let prefix = self.prefix.clone();
        let job = self.find_mut(id)?;
        if job.is_terminal() {
            return Err(QueueError::invalid(id, job.status, "advance"));
        }

        if job.status == JobStatus::Queued {
            job.status = JobStatus::Processing;
        }
        let progress = u32::from(job.progress).saturating_add(delta).min(100);
        job.progress = progress as u8;

        if job.progress == 100 {
            job.status = JobStatus::Completed;
            job.completed_at = Some(now);
            info!(queue = %prefix, id = %job.id, "job completed");
        } else {
            debug!(queue = %prefix, id = %job.id, progress = job.progress, "job advanced");
        }
        Ok(job.clone())
    }

    pub fn fail(&mut self, id: &str, reason: &str) -> QueueResult<Job<M>> {
        let prefix = self.prefix.clone();
        let job = self.find_mut(id)?;
        if job.is_terminal() {
            return Err(QueueError::invalid(id, job.status, "fail"));
        }
        job.status = JobStatus::Failed;
        job.progress = 0;
        job.error = Some(reason.to_string());
        warn!(queue = %prefix, id = %job.id, error = %reason, "job failed");
        Ok(job.clone())
    }

    pub fn retry(&mut self, id: &str) -> QueueResult<Job<M>> {
        let prefix = self.prefix.clone();
        let job = self.find_mut(id)?;
        if job.status != JobStatus::Failed {
            return Err(QueueError::invalid(id, job.status, "retry"));
        }
        job.status = JobStatus::Queued;
        job.progress = 0;
        job.error = None;
        job.attempt += 1;
        info!(queue = %prefix, id = %job.id, attempt = job.attempt, "job requeued");
        Ok(job.clone())
    }

    pub fn remove(&mut self, id: &str) -> QueueResult<Job<M>> {
        let idx = self
            .jobs
            .iter()
            .position(|job| job.id == id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        let job = self.jobs.remove(idx);
        info!(queue = %self.prefix, id = %job.id, status = %job.status, "job removed");
        Ok(job)
    }

    /// Removes every job matching `predicate`, keeping the others in order.
    pub fn clear<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Job<M>) -> bool,
    {
        let before = self.jobs.len();
        self.jobs.retain(|job| !predicate(job));
        let removed = before - self.jobs.len();
        if removed > 0 {
            info!(queue = %self.prefix, removed, "jobs cleared");
        }
        removed
    }

    pub fn update_metadata<F>(&mut self, id: &str, apply: F) -> QueueResult<Job<M>>
    where
        F: FnOnce(&mut M),
    {
        let job = self.find_mut(id)?;
        apply(&mut job.metadata);
        Ok(job.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Job<M>> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn list(&self) -> Vec<Job<M>> {
        self.jobs.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job<M>> {
        self.jobs.iter()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for job in &self.jobs {
            counts.record(job.status);
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn find_mut(&mut self, id: &str) -> QueueResult<&mut Job<M>> {
        self.jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn queue() -> (JobQueue<()>, Arc<ManualClock>) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        (JobQueue::with_clock("exp", clock.clone()), clock)
    }

    fn assert_invariants(queue: &JobQueue<()>) {
        for job in queue.iter() {
            assert!(job.progress <= 100);
            assert_eq!(job.progress == 100, job.status == JobStatus::Completed);
            assert_eq!(job.completed_at.is_some(), job.status == JobStatus::Completed);
            if matches!(job.status, JobStatus::Queued | JobStatus::Failed) {
                assert_eq!(job.progress, 0);
            }
            assert_eq!(job.error.is_some(), job.status == JobStatus::Failed);
        }
    }

    #[test]
    fn enqueue_appends_a_fresh_queued_job() {
        let (mut queue, clock) = queue();
        let job = queue.enqueue("Ocean_Temperature_Data_2024.csv", ());

        let listed = queue.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, job.id);
        assert_eq!(listed[0].status, JobStatus::Queued);
        assert_eq!(listed[0].progress, 0);
        assert_eq!(listed[0].created_at, clock.now());
        assert!(listed[0].completed_at.is_none());
        assert!(job.id.starts_with("exp_"));
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let (mut queue, _clock) = queue();
        let a = queue.enqueue("a", ());
        let b = queue.enqueue("b", ());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn advance_runs_through_processing_to_completed() {
        let (mut queue, clock) = queue();
        let id = queue.enqueue("Bathymetry_Report_Q1.pdf", ()).id;

        for _ in 0..3 {
            let job = queue.advance(&id, 30).unwrap();
            assert!(job.completed_at.is_none());
        }
        let job = queue.get(&id).unwrap();
        assert_eq!(job.progress, 90);
        assert_eq!(job.status, JobStatus::Processing);

        clock.advance(Duration::seconds(42));
        let job = queue.advance(&id, 25).unwrap();
        assert_eq!(job.progress, 100);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_at, Some(clock.now()));
        assert_invariants(&queue);
    }

    #[test]
    fn advance_by_zero_starts_processing() {
        let (mut queue, _clock) = queue();
        let id = queue.enqueue("a", ()).id;
        let job = queue.advance(&id, 0).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 0);
    }

    #[test]
    fn advance_on_terminal_jobs_changes_nothing() {
        let (mut queue, clock) = queue();
        let done = queue.enqueue("done", ()).id;
        let broken = queue.enqueue("broken", ()).id;
        queue.advance(&done, 100).unwrap();
        queue.fail(&broken, "disk full").unwrap();
        let completed_at = queue.get(&done).unwrap().completed_at;

        clock.advance(Duration::minutes(1));
        assert!(matches!(
            queue.advance(&done, 10),
            Err(QueueError::InvalidTransition { .. })
        ));
        assert!(queue.advance(&broken, 10).is_err());

        let done_job = queue.get(&done).unwrap();
        assert_eq!(done_job.status, JobStatus::Completed);
        assert_eq!(done_job.completed_at, completed_at);
        let broken_job = queue.get(&broken).unwrap();
        assert_eq!(broken_job.status, JobStatus::Failed);
        assert_eq!(broken_job.progress, 0);
    }

    #[test]
    fn advance_unknown_id_is_not_found() {
        let (mut queue, _clock) = queue();
        assert_eq!(
            queue.advance("exp_missing", 10).unwrap_err(),
            QueueError::NotFound("exp_missing".to_string())
        );
    }

    #[test]
    fn fail_then_retry_round_trips_to_queued() {
        let (mut queue, _clock) = queue();
        let id = queue.enqueue("DNA_Sequences_Archive.zip", ()).id;
        queue.advance(&id, 40).unwrap();

        let failed = queue.fail(&id, "disk full").unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.progress, 0);
        assert_eq!(failed.error.as_deref(), Some("disk full"));

        let retried = queue.retry(&id).unwrap();
        assert_eq!(retried.status, JobStatus::Queued);
        assert_eq!(retried.progress, 0);
        assert!(retried.error.is_none());
        assert_eq!(retried.attempt, failed.attempt + 1);
        assert_invariants(&queue);
    }

    #[test]
    fn fail_on_queued_job_is_allowed() {
        let (mut queue, _clock) = queue();
        let id = queue.enqueue("a", ()).id;
        let job = queue.fail(&id, "Insufficient storage space").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn fail_and_retry_reject_wrong_states() {
        let (mut queue, _clock) = queue();
        let id = queue.enqueue("a", ()).id;
        assert!(queue.retry(&id).is_err());
        queue.advance(&id, 100).unwrap();
        assert!(queue.fail(&id, "late").is_err());
        assert!(queue.get(&id).unwrap().error.is_none());
    }

    #[test]
    fn remove_deletes_in_any_state() {
        let (mut queue, _clock) = queue();
        let queued = queue.enqueue("queued", ()).id;
        let running = queue.enqueue("running", ()).id;
        let done = queue.enqueue("done", ()).id;
        let broken = queue.enqueue("broken", ()).id;
        queue.advance(&running, 50).unwrap();
        queue.advance(&done, 100).unwrap();
        queue.fail(&broken, "nope").unwrap();

        for id in [&queued, &running, &done, &broken] {
            queue.remove(id).unwrap();
            assert!(queue.get(id).is_none());
        }
        assert!(queue.is_empty());
        assert!(queue.remove(&queued).is_err());
    }

    #[test]
    fn clear_completed_keeps_the_rest_in_order() {
        let (mut queue, _clock) = queue();
        let ids: Vec<String> = (0..6)
            .map(|n| queue.enqueue(&format!("job-{}", n), ()).id)
            .collect();
        queue.advance(&ids[0], 100).unwrap();
        queue.advance(&ids[1], 20).unwrap();
        queue.advance(&ids[3], 100).unwrap();
        queue.fail(&ids[4], "bad header").unwrap();

        let removed = queue.clear(|job| job.status == JobStatus::Completed);
        assert_eq!(removed, 2);

        let left: Vec<String> = queue.iter().map(|job| job.id.clone()).collect();
        assert_eq!(left, vec![ids[1].clone(), ids[2].clone(), ids[4].clone(), ids[5].clone()]);

        let counts = queue.counts();
        assert_eq!(counts.processing, 1);
        assert_eq!(counts.queued, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.completed, 0);
    }

    #[test]
    fn clear_all_empties_the_queue() {
        let (mut queue, _clock) = queue();
        queue.enqueue("a", ());
        queue.enqueue("b", ());
        assert_eq!(queue.clear(|_| true), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn progress_never_exceeds_bounds() {
        let (mut queue, _clock) = queue();
        let id = queue.enqueue("a", ()).id;
        queue.advance(&id, 70).unwrap();
        let job = queue.advance(&id, u32::MAX - 10).unwrap();
        assert_eq!(job.progress, 100);
        assert_invariants(&queue);
    }

    #[test]
    fn update_metadata_touches_only_the_payload() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut queue: JobQueue<Vec<&str>> =
            JobQueue::with_clock("cls", Arc::new(ManualClock::new(start)));
        let id = queue.enqueue("reef.jpg", Vec::new()).id;
        let job = queue.update_metadata(&id, |tags| tags.push("coral")).unwrap();
        assert_eq!(job.metadata, vec!["coral"]);
        assert_eq!(job.status, JobStatus::Queued);
    }
}
