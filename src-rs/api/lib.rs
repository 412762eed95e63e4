pub use crate::config::HubConfig;
pub use crate::error::QueueError;
pub use crate::hub::Hub;
pub use crate::job::{Clock, Job, JobQueue, JobStatus, ManualClock, StatusCounts, SystemClock};
pub use crate::sim::{ProgressPlan, Runner, SimSettings};
pub use crate::workloads::{ClassificationMeta, ExportMeta, FileMeta, Workload};

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, HubServer};
