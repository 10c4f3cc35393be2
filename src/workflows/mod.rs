//! Allocation workflows
//!
//! Orchestration over the matching layer and the allocation store. Each
//! workflow run fetches its own immutable snapshot; the only suspension
//! points are repository calls.

pub mod auto;
pub mod manual;

pub use auto::{AutoAllocationState, AutoAllocationWorkflow};
pub use manual::ManualAllocationWorkflow;
