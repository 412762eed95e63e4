use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Workload;
use crate::sim::{ProgressPlan, SimSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStage {
    Upload,
    Preprocessing,
    Analysis,
    Matching,
    Results,
}

impl ClassificationStage {
    pub const ALL: [ClassificationStage; 5] = [
        ClassificationStage::Upload,
        ClassificationStage::Preprocessing,
        ClassificationStage::Analysis,
        ClassificationStage::Matching,
        ClassificationStage::Results,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationStage::Upload => "upload",
            ClassificationStage::Preprocessing => "preprocessing",
            ClassificationStage::Analysis => "analysis",
            ClassificationStage::Matching => "matching",
            ClassificationStage::Results => "results",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClassificationStage::Upload => "Data Upload",
            ClassificationStage::Preprocessing => "Preprocessing",
            ClassificationStage::Analysis => "AI Analysis",
            ClassificationStage::Matching => "Database Matching",
            ClassificationStage::Results => "Results Ready",
        }
    }

    /// Simulated time spent in the stage. Upload has none: the job starts there.
    pub fn duration(&self) -> Duration {
        match self {
            ClassificationStage::Upload => Duration::ZERO,
            ClassificationStage::Preprocessing => Duration::from_millis(800),
            ClassificationStage::Analysis => Duration::from_millis(1500),
            ClassificationStage::Matching => Duration::from_millis(1200),
            ClassificationStage::Results => Duration::from_millis(500),
        }
    }
}

impl FromStr for ClassificationStage {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ClassificationStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == raw)
            .ok_or_else(|| format!("unknown stage: {}", raw))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Image,
    Sequence,
}

impl SampleKind {
    fn id_prefix(&self) -> &'static str {
        match self {
            SampleKind::Image => "IMG",
            SampleKind::Sequence => "DNA",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMeta {
    pub sample_kind: SampleKind,
    pub sample_id: String,
    pub stage: ClassificationStage,
}

impl ClassificationMeta {
    pub fn step_state(&self, step: ClassificationStage) -> StepState {
        if step < self.stage {
            StepState::Completed
        } else if step == self.stage {
            StepState::Active
        } else {
            StepState::Pending
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClassificationRequest {
    pub name: String,
    pub sample_kind: SampleKind,
}

fn sample_id(kind: SampleKind, now: DateTime<Utc>) -> String {
    format!("{}_{:03}", kind.id_prefix(), now.timestamp_millis().rem_euclid(1000))
}

impl Workload for ClassificationMeta {
    type Request = ClassificationRequest;

    const PREFIX: &'static str = "cls";

    fn build(request: ClassificationRequest, now: DateTime<Utc>) -> Result<(String, Self), String> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err("sample name required".to_string());
        }
        let meta = ClassificationMeta {
            sample_kind: request.sample_kind,
            sample_id: sample_id(request.sample_kind, now),
            stage: ClassificationStage::Upload,
        };
        Ok((name.to_string(), meta))
    }

    fn plan(_settings: &SimSettings) -> ProgressPlan {
        let stages: Vec<(&'static str, Duration)> = ClassificationStage::ALL[1..]
            .iter()
            .map(|stage| (stage.as_str(), stage.duration()))
            .collect();
        ProgressPlan::staged(&stages)
    }

    fn enter_stage(&mut self, stage: &str) {
        if let Ok(stage) = stage.parse() {
            self.stage = stage;
        }
    }

    fn on_completed(&mut self, _completed_at: DateTime<Utc>) {
        self.stage = ClassificationStage::Results;
    }

    fn on_reset(&mut self) {
        self.stage = ClassificationStage::Upload;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta(stage: ClassificationStage) -> ClassificationMeta {
        ClassificationMeta {
            sample_kind: SampleKind::Image,
            sample_id: "IMG_001".to_string(),
            stage,
        }
    }

    #[test]
    fn step_state_is_relative_to_current_stage() {
        let m = meta(ClassificationStage::Analysis);
        assert_eq!(m.step_state(ClassificationStage::Upload), StepState::Completed);
        assert_eq!(m.step_state(ClassificationStage::Preprocessing), StepState::Completed);
        assert_eq!(m.step_state(ClassificationStage::Analysis), StepState::Active);
        assert_eq!(m.step_state(ClassificationStage::Results), StepState::Pending);
    }

    #[test]
    fn sample_id_uses_last_three_millis() {
        let now = Utc.timestamp_millis_opt(1_717_000_000_042).unwrap();
        let (_, m) = ClassificationMeta::build(
            ClassificationRequest {
                name: "dna_run.fasta".to_string(),
                sample_kind: SampleKind::Sequence,
            },
            now,
        )
        .unwrap();
        assert_eq!(m.sample_id, "DNA_042");
        assert_eq!(m.stage, ClassificationStage::Upload);
    }

    #[test]
    fn plan_walks_the_four_processing_stages() {
        let plan = ClassificationMeta::plan(&SimSettings::default());
        assert_eq!(plan.total_delta(), 100);
        assert_eq!(plan.total_delay(), Duration::from_millis(4000));
        let stages: Vec<&str> = plan.steps.iter().filter_map(|s| s.stage).collect();
        assert_eq!(stages.first(), Some(&"preprocessing"));
        assert_eq!(stages.last(), Some(&"results"));
    }

    #[test]
    fn hooks_move_the_stage() {
        let mut m = meta(ClassificationStage::Upload);
        m.enter_stage("matching");
        assert_eq!(m.stage, ClassificationStage::Matching);
        m.enter_stage("bogus");
        assert_eq!(m.stage, ClassificationStage::Matching);
        m.on_reset();
        assert_eq!(m.stage, ClassificationStage::Upload);
    }
}
