//! costlink - expense-to-line-item allocation engine
//!
//! The allocation subsystem of a construction-management backend: given a
//! project's raw expenses and its approved estimate's line items, decide
//! which expenses correspond to which budgeted line items, score the
//! confidence of each correspondence, and persist the decision as a
//! correlation record - automatically above a confidence threshold (with
//! human preview), or manually via bulk assignment.
//!
//! # Architecture
//!
//! - `models`: expenses, line items, correlations, typed ids, money
//! - `matching`: category compatibility, scoring, candidate selection (pure)
//! - `store`: repository contracts and the allocation write path
//! - `workflows`: auto-allocation state machine and manual bulk assignment
//! - `config`: engine settings
//! - `error`: error taxonomy
//!
//! The core invariant - an expense has at most one active correlation - is
//! owned by the storage layer's uniqueness constraint on `expense_id`;
//! workflow re-checks only narrow the race window. Batch commits are
//! per-record atomic: every record gets an outcome, and one record's
//! conflict never blocks its siblings.
//!
//! # Example
//!
//! ```rust,ignore
//! use costlink::config::AllocationSettings;
//! use costlink::matching::CategoryCompatibilityMap;
//! use costlink::workflows::AutoAllocationWorkflow;
//!
//! let mut workflow = AutoAllocationWorkflow::new(
//!     store,
//!     expense_repo,
//!     line_item_repo,
//!     CategoryCompatibilityMap::default(),
//!     AllocationSettings::default(),
//! );
//! workflow.compute_candidates(project_id, estimate_id).await?;
//! if let Some(preview) = workflow.preview() {
//!     // show to the user, then:
//!     let outcomes = workflow.confirm().await?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod store;
pub mod workflows;

pub use error::{AllocationError, AllocationResult};
