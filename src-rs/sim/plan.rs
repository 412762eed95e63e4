use std::time::Duration;

use crate::config::HubConfig;

/// Timing knobs for uniform progress plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimSettings {
    pub tick: Duration,
    pub step: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(500),
            step: 10,
        }
    }
}

impl From<&HubConfig> for SimSettings {
    fn from(cfg: &HubConfig) -> Self {
        Self {
            tick: Duration::from_millis(cfg.tick_interval_ms),
            step: cfg.progress_step,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanStep {
    pub delay: Duration,
    pub delta: u32,
    pub stage: Option<&'static str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressPlan {
    pub steps: Vec<PlanStep>,
}

impl ProgressPlan {
    /// Equal increments of `step` percent, one per `interval`.
    pub fn uniform(step: u32, interval: Duration) -> Self {
        let step = step.clamp(1, 100);
        let count = (100 + step - 1) / step;
        let steps = (0..count)
            .map(|_| PlanStep {
                delay: interval,
                delta: step,
                stage: None,
            })
            .collect();
        Self { steps }
    }

    /// Ten sub-steps per stage. Overall progress inside stage `i` of `n` at
    /// sub-progress `p` is `(i * 100 + p) / n`.
    pub fn staged(stages: &[(&'static str, Duration)]) -> Self {
        let n = stages.len() as u32;
        let mut steps = Vec::with_capacity(stages.len() * 10);
        let mut reached = 0u32;
        for (i, (name, duration)) in stages.iter().enumerate() {
            let delay = *duration / 10;
            for sub in 1..=10u32 {
                let target = (i as u32 * 100 + sub * 10) / n;
                steps.push(PlanStep {
                    delay,
                    delta: target - reached,
                    stage: Some(*name),
                });
                reached = target;
            }
        }
        Self { steps }
    }

    /// Tags each step with the stage covering the progress it starts from,
    /// splitting 0..100 evenly across `stages`.
    pub fn with_stages(mut self, stages: &[&'static str]) -> Self {
        if stages.is_empty() {
            return self;
        }
        let n = stages.len() as u32;
        let mut reached = 0u32;
        for step in &mut self.steps {
            let idx = (reached.min(99) * n / 100) as usize;
            step.stage = Some(stages[idx]);
            reached = reached.saturating_add(step.delta);
        }
        self
    }

    pub fn total_delta(&self) -> u32 {
        self.steps.iter().map(|step| step.delta).sum()
    }

    pub fn total_delay(&self) -> Duration {
        self.steps.iter().map(|step| step.delay).sum()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
