//! Configuration for the allocation engine

pub mod settings;

pub use settings::AllocationSettings;
