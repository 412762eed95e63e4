pub mod config;
pub mod error;
pub mod helpers;
pub mod hub;

#[path = "job/lib.rs"]
pub mod job;
#[path = "sim/lib.rs"]
pub mod sim;
#[path = "workloads/lib.rs"]
pub mod workloads;
#[path = "api/lib.rs"]
pub mod api;

pub use config::HubConfig;
pub use error::{QueueError, QueueResult};
pub use hub::Hub;
pub use job::{Clock, Job, JobQueue, JobStatus, ManualClock, SharedQueue, StatusCounts, SystemClock};
