use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::plan::{PlanStep, ProgressPlan, SimSettings};
use crate::job::{JobStatus, SharedQueue};
use crate::workloads::{advance_job, Workload};

/// Live driver for one job. `attempt` ties it to the job's retry count and
/// `generation` tells it apart from drivers that ran earlier attempts.
#[derive(Clone, Copy, Debug)]
struct DriverSlot {
    generation: u64,
    attempt: u32,
}

/// Drives queued jobs to completion on tokio timers, one task per job.
pub struct Runner<W: Workload> {
    queue: SharedQueue<W>,
    settings: SimSettings,
    paused: Arc<watch::Sender<bool>>,
    active: Arc<Mutex<HashMap<String, DriverSlot>>>,
    generations: Arc<AtomicU64>,
}

impl<W: Workload> Clone for Runner<W> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            settings: self.settings,
            paused: self.paused.clone(),
            active: self.active.clone(),
            generations: self.generations.clone(),
        }
    }
}

impl<W: Workload> Runner<W> {
    pub fn new(queue: SharedQueue<W>, settings: SimSettings) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            queue,
            settings,
            paused: Arc::new(paused),
            active: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn queue(&self) -> SharedQueue<W> {
        self.queue.clone()
    }

    pub fn queue_ref(&self) -> &SharedQueue<W> {
        &self.queue
    }

    /// Spawns a driver for `id`. Returns `None` when the job is missing,
    /// terminal, or already driven for its current attempt. A driver left
    /// over from an attempt that has since failed and been retried is
    /// superseded and winds down on its next step.
    pub fn start(&self, id: &str) -> Option<JoinHandle<()>> {
        let attempt = {
            let queue = self.queue.lock().ok()?;
            let job = queue.get(id)?;
            if job.is_terminal() {
                return None;
            }
            job.attempt
        };
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        {
            let mut active = self.active.lock().ok()?;
            if let Some(slot) = active.get(id) {
                if slot.attempt == attempt {
                    return None;
                }
                debug!(queue = W::PREFIX, id = %id, stale = slot.attempt, attempt, "superseding driver");
            }
            active.insert(id.to_string(), DriverSlot { generation, attempt });
        }

        let plan = W::plan(&self.settings);
        let queue = self.queue.clone();
        let active = self.active.clone();
        let paused = self.paused.subscribe();
        let id = id.to_string();
        debug!(queue = W::PREFIX, id = %id, attempt, steps = plan.len(), "driver started");

        Some(tokio::spawn(async move {
            drive(queue, &id, attempt, plan, paused).await;
            if let Ok(mut active) = active.lock() {
                if active.get(&id).map(|slot| slot.generation) == Some(generation) {
                    active.remove(&id);
                }
            }
        }))
    }

    /// Starts every job in `ids` that can be started; returns how many were.
    pub fn start_many(&self, ids: &[String]) -> usize {
        ids.iter().filter(|id| self.start(id).is_some()).count()
    }

    pub fn pause(&self) {
        self.paused.send_replace(true);
        info!(queue = W::PREFIX, "processing paused");
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
        info!(queue = W::PREFIX, "processing resumed");
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    pub fn running(&self) -> usize {
        match self.active.lock() {
            Ok(active) => active.len(),
            Err(_) => 0,
        }
    }

    pub fn is_running(&self, id: &str) -> bool {
        match self.active.lock() {
            Ok(active) => active.contains_key(id),
            Err(_) => false,
        }
    }
}

async fn drive<W: Workload>(
    queue: SharedQueue<W>,
    id: &str,
    attempt: u32,
    plan: ProgressPlan,
    mut paused: watch::Receiver<bool>,
) {
    for step in plan.steps {
        tokio::time::sleep(step.delay).await;
        if paused.wait_for(|paused| !*paused).await.is_err() {
            return;
        }
        if !apply_step(&queue, id, attempt, &step) {
            return;
        }
    }
}

/// Applies one step; `false` stops the driver.
fn apply_step<W: Workload>(
    queue: &SharedQueue<W>,
    id: &str,
    attempt: u32,
    step: &PlanStep,
) -> bool {
    let mut queue = match queue.lock() {
        Ok(queue) => queue,
        Err(_) => {
            warn!(queue = W::PREFIX, id = %id, "queue lock poisoned, driver stopped");
            return false;
        }
    };
    match queue.get(id) {
        None => {
            debug!(queue = W::PREFIX, id = %id, "job gone, driver stopped");
            return false;
        }
        Some(job) if job.is_terminal() => {
            debug!(queue = W::PREFIX, id = %id, status = %job.status, "job settled, driver stopped");
            return false;
        }
        Some(job) if job.attempt != attempt => {
            debug!(queue = W::PREFIX, id = %id, attempt, current = job.attempt, "job retried, driver stopped");
            return false;
        }
        Some(_) => {}
    }

    if let Some(stage) = step.stage {
        let _ = queue.update_metadata(id, |meta| meta.enter_stage(stage));
    }
    match advance_job(&mut queue, id, step.delta) {
        Ok(job) => job.status != JobStatus::Completed,
        Err(err) => {
            debug!(queue = W::PREFIX, id = %id, error = %err, "driver stopped");
            false
        }
    }
}
