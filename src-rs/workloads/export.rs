use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Workload;

/// Completed exports advertise a download link for this long.
pub const RETENTION_DAYS: i64 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    NetCdf,
    Pdf,
    Zip,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::NetCdf => "nc",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Zip => "zip",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "netcdf" | "nc" => Ok(ExportFormat::NetCdf),
            "pdf" => Ok(ExportFormat::Pdf),
            "zip" => Ok(ExportFormat::Zip),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportMeta {
    pub format: ExportFormat,
    pub size_bytes: Option<u64>,
    pub download_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ExportMeta {
    pub fn new(format: ExportFormat, size_bytes: Option<u64>) -> Self {
        Self {
            format,
            size_bytes,
            download_url: None,
            expires_at: None,
        }
    }

    pub fn is_downloadable(&self, now: DateTime<Utc>) -> bool {
        match (&self.download_url, self.expires_at) {
            (Some(_), Some(expires_at)) => now < expires_at,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub name: String,
    pub format: String,
    pub size_bytes: Option<u64>,
}

impl Workload for ExportMeta {
    type Request = ExportRequest;

    const PREFIX: &'static str = "exp";

    fn build(request: ExportRequest, _now: DateTime<Utc>) -> Result<(String, Self), String> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err("export name required".to_string());
        }
        let format = request.format.parse::<ExportFormat>()?;
        let label = if name.contains('.') {
            name.to_string()
        } else {
            format!("{}.{}", name, format.extension())
        };
        Ok((label, ExportMeta::new(format, request.size_bytes)))
    }

    fn on_completed(&mut self, completed_at: DateTime<Utc>) {
        self.download_url = Some(format!(
            "/downloads/{}.{}",
            completed_at.timestamp_millis(),
            self.format.extension()
        ));
        self.expires_at = Some(completed_at + Duration::days(RETENTION_DAYS));
    }

    fn on_reset(&mut self) {
        self.download_url = None;
        self.expires_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobQueue, JobStatus, ManualClock};
    use crate::workloads::{advance_job, enqueue_request, retry_job};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn request(name: &str, format: &str) -> ExportRequest {
        ExportRequest {
            name: name.to_string(),
            format: format.to_string(),
            size_bytes: Some(2_400_000),
        }
    }

    #[test]
    fn build_appends_extension_when_missing() {
        let now = Utc::now();
        let (label, meta) = ExportMeta::build(request("Species_Analysis", "XLSX"), now).unwrap();
        assert_eq!(label, "Species_Analysis.xlsx");
        assert_eq!(meta.format, ExportFormat::Xlsx);
        assert!(meta.download_url.is_none());

        let (label, _) = ExportMeta::build(request("temps.csv", "csv"), now).unwrap();
        assert_eq!(label, "temps.csv");
    }

    #[test]
    fn build_rejects_unknown_format_and_blank_name() {
        let now = Utc::now();
        assert!(ExportMeta::build(request("x", "docx"), now).is_err());
        assert!(ExportMeta::build(request("  ", "csv"), now).is_err());
    }

    #[test]
    fn completion_publishes_download_until_expiry() {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let mut queue: JobQueue<ExportMeta> = JobQueue::with_clock("exp", clock.clone());
        let id = enqueue_request(&mut queue, request("Ocean_Temperature_Data_2024", "csv"))
            .unwrap()
            .id;

        let job = advance_job(&mut queue, &id, 65).unwrap();
        assert!(job.metadata.download_url.is_none());

        let job = advance_job(&mut queue, &id, 35).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.metadata.expires_at, Some(start + Duration::days(7)));
        assert!(job.metadata.is_downloadable(start));
        assert!(!job.metadata.is_downloadable(start + Duration::days(8)));
    }

    #[test]
    fn retry_drops_stale_download_fields() {
        let mut queue: JobQueue<ExportMeta> = JobQueue::new("exp");
        let id = enqueue_request(&mut queue, request("DNA_Sequences_Archive", "zip"))
            .unwrap()
            .id;
        queue
            .update_metadata(&id, |meta| meta.download_url = Some("/stale".to_string()))
            .unwrap();
        queue.fail(&id, "Insufficient storage space").unwrap();

        let job = retry_job(&mut queue, &id).unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.metadata.download_url.is_none());
    }
}
