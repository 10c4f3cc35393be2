//! Pure matching layer: compatibility rules, scoring, candidate selection
//!
//! Nothing in this module performs I/O; everything operates on immutable
//! snapshots and is safe to run in parallel across expenses.

pub mod candidates;
pub mod compatibility;
pub mod scoring;

pub use candidates::{Candidate, CandidateGenerator};
pub use compatibility::CategoryCompatibilityMap;
pub use scoring::ScoringEngine;
