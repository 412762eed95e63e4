use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Workload;
use crate::sim::{ProgressPlan, SimSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "JSON")]
    Json,
    Images,
    #[serde(rename = "DNA")]
    Dna,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return FileKind::Other,
        };
        match ext.as_str() {
            "csv" => FileKind::Csv,
            "json" => FileKind::Json,
            "jpg" | "jpeg" | "png" | "tiff" => FileKind::Images,
            "fasta" | "fastq" => FileKind::Dna,
            _ => FileKind::Other,
        }
    }
}

/// Processing pipeline a file moves through once it is picked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validation,
    Standardization,
    MetadataTagging,
    QualityCheck,
    Indexing,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Validation,
        PipelineStage::Standardization,
        PipelineStage::MetadataTagging,
        PipelineStage::QualityCheck,
        PipelineStage::Indexing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Validation => "validation",
            PipelineStage::Standardization => "standardization",
            PipelineStage::MetadataTagging => "metadata_tagging",
            PipelineStage::QualityCheck => "quality_check",
            PipelineStage::Indexing => "indexing",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Validation => "Validation",
            PipelineStage::Standardization => "Standardization",
            PipelineStage::MetadataTagging => "Metadata Tagging",
            PipelineStage::QualityCheck => "Quality Check",
            PipelineStage::Indexing => "Indexing",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        PipelineStage::ALL.iter().copied().find(|stage| stage.as_str() == raw)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileMeta {
    pub size_bytes: u64,
    pub kind: FileKind,
    /// `None` until a driver picks the file up.
    #[serde(default)]
    pub stage: Option<PipelineStage>,
}

#[derive(Debug, Deserialize)]
pub struct FileRequest {
    pub name: String,
    #[serde(default)]
    pub size_bytes: u64,
}

impl Workload for FileMeta {
    type Request = FileRequest;

    const PREFIX: &'static str = "file";

    fn build(request: FileRequest, _now: DateTime<Utc>) -> Result<(String, Self), String> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err("file name required".to_string());
        }
        let meta = FileMeta {
            size_bytes: request.size_bytes,
            kind: FileKind::from_name(name),
            stage: None,
        };
        Ok((name.to_string(), meta))
    }

    fn plan(settings: &SimSettings) -> ProgressPlan {
        let stages = PipelineStage::ALL.map(|stage| stage.as_str());
        ProgressPlan::uniform(settings.step, settings.tick).with_stages(&stages)
    }

    fn enter_stage(&mut self, stage: &str) {
        if let Some(stage) = PipelineStage::parse(stage) {
            self.stage = Some(stage);
        }
    }

    fn on_completed(&mut self, _completed_at: DateTime<Utc>) {
        self.stage = Some(PipelineStage::Indexing);
    }

    fn on_reset(&mut self) {
        self.stage = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_extension() {
        assert_eq!(FileKind::from_name("ctd_cast_042.CSV"), FileKind::Csv);
        assert_eq!(FileKind::from_name("stations.json"), FileKind::Json);
        assert_eq!(FileKind::from_name("reef.survey.TIFF"), FileKind::Images);
        assert_eq!(FileKind::from_name("sample.jpeg"), FileKind::Images);
        assert_eq!(FileKind::from_name("edna_run3.fastq"), FileKind::Dna);
        assert_eq!(FileKind::from_name("notes.txt"), FileKind::Other);
        assert_eq!(FileKind::from_name("README"), FileKind::Other);
    }

    #[test]
    fn build_trims_and_classifies() {
        let (label, meta) = FileMeta::build(
            FileRequest {
                name: " plankton.fasta ".to_string(),
                size_bytes: 1024,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(label, "plankton.fasta");
        assert_eq!(meta.kind, FileKind::Dna);
        assert_eq!(meta.size_bytes, 1024);
        assert!(meta.stage.is_none());
    }

    #[test]
    fn plan_walks_the_pipeline_in_order() {
        let plan = FileMeta::plan(&SimSettings::default());
        assert_eq!(plan.total_delta(), 100);
        let stages: Vec<&str> = plan.steps.iter().filter_map(|s| s.stage).collect();
        assert_eq!(stages.len(), plan.len());
        assert_eq!(stages.first(), Some(&"validation"));
        assert_eq!(stages.last(), Some(&"indexing"));
        assert!(stages.contains(&"metadata_tagging"));
    }

    #[test]
    fn hooks_track_the_pipeline_stage() {
        let (_, mut meta) = FileMeta::build(
            FileRequest {
                name: "ctd.csv".to_string(),
                size_bytes: 0,
            },
            Utc::now(),
        )
        .unwrap();
        meta.enter_stage("quality_check");
        assert_eq!(meta.stage, Some(PipelineStage::QualityCheck));
        meta.enter_stage("unknown");
        assert_eq!(meta.stage, Some(PipelineStage::QualityCheck));
        meta.on_completed(Utc::now());
        assert_eq!(meta.stage, Some(PipelineStage::Indexing));
        meta.on_reset();
        assert!(meta.stage.is_none());
    }

    #[test]
    fn kind_serializes_with_dashboard_labels() {
        assert_eq!(serde_json::to_string(&FileKind::Dna).unwrap(), "\"DNA\"");
        assert_eq!(serde_json::to_string(&FileKind::Images).unwrap(), "\"Images\"");
    }
}
