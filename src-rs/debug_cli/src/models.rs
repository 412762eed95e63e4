use chrono::{DateTime, Utc};
use marine_hub::{JobStatus, StatusCounts};
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub debug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueName {
    Exports,
    Ingestion,
    Classifications,
}

impl QueueName {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "exports" | "export" | "exp" => Some(QueueName::Exports),
            "ingestion" | "files" | "file" => Some(QueueName::Ingestion),
            "classifications" | "classify" | "species" | "cls" => Some(QueueName::Classifications),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            QueueName::Exports => "exports",
            QueueName::Ingestion => "ingestion",
            QueueName::Classifications => "classifications",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobInfo {
    pub id: String,
    pub label: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
pub struct QueueListing {
    pub jobs: Vec<JobInfo>,
    pub counts: StatusCounts,
    pub paused: bool,
    pub running: usize,
}
