pub mod clock;
pub mod queue;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use queue::{JobQueue, SharedQueue};
pub use types::{Job, JobStatus, StatusCounts};
