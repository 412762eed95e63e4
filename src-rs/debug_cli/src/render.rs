use std::io::{self, Write};

use chrono::{DateTime, Utc};
use marine_hub::workloads::{
    format_expires_in, format_size, format_time_ago, ClassificationMeta, ClassificationStage,
    ExportMeta, FileMeta, StepState,
};
use marine_hub::JobStatus;
use serde_json::Value;

use crate::models::{CLIConfig, JobInfo, QueueListing, QueueName};

pub fn banner(cfg: &CLIConfig) {
    println!("Marine Hub Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Queues: exports | ingestion | classifications");
    println!("Commands:");
    println!("  /help                              Show commands");
    println!("  /exit | /quit                      Exit");
    println!("  /list <queue>                      List jobs");
    println!("  /add exports <name> <format>       Queue an export");
    println!("  /add ingestion <name> [bytes]      Queue a file");
    println!("  /add classifications <name> <image|sequence>");
    println!("  /advance <queue> <id> <delta>      Add progress");
    println!("  /fail <queue> <id> <reason>        Mark a job failed");
    println!("  /retry <queue> <id>                Requeue a failed job");
    println!("  /remove <queue> <id>               Remove a job");
    println!("  /start <queue> <id>                Simulate processing");
    println!("  /process <queue> [ids...]          Start selected (or all queued)");
    println!("  /clear <queue> [completed|failed|all]");
    println!("  /pause <queue> | /resume <queue>   Hold or release processing");
    println!("  /health                            Ping the server");
    println!("  /debug [on|off]                    Toggle raw output");
    println!("  /config                            Show current config");
    println!("  /base <url>                        Update base URL");
    println!("  /token <token>                     Update bearer token");
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress) / 5;
    format!("[{}{}] {:>3}%", "#".repeat(filled), ".".repeat(20 - filled), progress)
}

pub fn listing(queue: QueueName, listing: &QueueListing) {
    let counts = &listing.counts;
    println!(
        "{}: {} active, {} completed, {} processing, {} queued, {} failed, {} driven{}",
        queue.path(),
        counts.active(),
        counts.completed,
        counts.processing,
        counts.queued,
        counts.failed,
        listing.running,
        if listing.paused { " (paused)" } else { "" }
    );
    if listing.jobs.is_empty() {
        println!("no jobs");
        return;
    }
    let now = Utc::now();
    for job in &listing.jobs {
        job_line(job, now);
    }
}

pub fn job(job: &JobInfo) {
    job_line(job, Utc::now());
}

fn job_line(job: &JobInfo, now: DateTime<Utc>) {
    let payload = Payload::decode(&job.metadata);
    let detail = match job.status {
        JobStatus::Processing => format!("{} {}", progress_bar(job.progress), payload.stage()),
        JobStatus::Failed => format!("error: {}", job.error.clone().unwrap_or_default()),
        JobStatus::Completed => completed_detail(job, &payload, now),
        JobStatus::Queued => String::new(),
    };
    println!(
        "[{:<10}] {} {} ({}) {}",
        job.status.as_str(),
        job.id,
        job.label,
        format_time_ago(job.created_at, now),
        detail.trim_end()
    );
    if let Payload::Classification(meta) = &payload {
        if job.status != JobStatus::Failed {
            println!("    {}", stepper(meta));
        }
    }
}

/// Job metadata decoded into the payload type of its queue.
enum Payload {
    Export(ExportMeta),
    File(FileMeta),
    Classification(ClassificationMeta),
    Unknown,
}

impl Payload {
    fn decode(metadata: &Value) -> Self {
        if let Ok(meta) = serde_json::from_value::<ClassificationMeta>(metadata.clone()) {
            return Payload::Classification(meta);
        }
        if let Ok(meta) = serde_json::from_value::<ExportMeta>(metadata.clone()) {
            return Payload::Export(meta);
        }
        match serde_json::from_value::<FileMeta>(metadata.clone()) {
            Ok(meta) => Payload::File(meta),
            Err(_) => Payload::Unknown,
        }
    }

    fn stage(&self) -> String {
        match self {
            Payload::File(FileMeta { stage: Some(stage), .. }) => stage.label().to_string(),
            Payload::Classification(meta) => meta.stage.label().to_string(),
            _ => String::new(),
        }
    }
}

fn stepper(meta: &ClassificationMeta) -> String {
    ClassificationStage::ALL
        .iter()
        .map(|stage| {
            let mark = match meta.step_state(*stage) {
                StepState::Completed => "x",
                StepState::Active => ">",
                StepState::Pending => " ",
            };
            format!("[{}] {}", mark, stage.label())
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

fn completed_detail(job: &JobInfo, payload: &Payload, now: DateTime<Utc>) -> String {
    let mut parts = Vec::new();
    if let Some(done) = job.completed_at {
        parts.push(format!("done {}", format_time_ago(done, now).to_lowercase()));
    }
    match payload {
        Payload::Export(meta) => {
            if let Some(size) = meta.size_bytes {
                parts.push(format_size(size));
            }
            match (meta.is_downloadable(now), &meta.download_url, meta.expires_at) {
                (true, Some(url), Some(expires_at)) => {
                    parts.push(format!("download {}", url));
                    parts.push(format!("expires in {}", format_expires_in(expires_at, now)));
                }
                _ => parts.push("link expired".to_string()),
            }
        }
        Payload::File(meta) => {
            parts.push(format!("{:?}", meta.kind));
            parts.push(format_size(meta.size_bytes));
        }
        Payload::Classification(meta) => parts.push(meta.sample_id.clone()),
        Payload::Unknown => {}
    }
    parts.join(", ")
}

pub fn raw(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  debug: {}", cfg.debug);
    println!("  token: {}", if cfg.token.is_some() { "set" } else { "unset" });
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
