pub mod plan;
pub mod runner;

pub use plan::{PlanStep, ProgressPlan, SimSettings};
pub use runner::Runner;
