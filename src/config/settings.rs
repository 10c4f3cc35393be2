//! Allocation settings
//!
//! Tunables for the auto-allocation workflow. Serde-derived with per-field
//! defaults so a host application can load them from its own configuration
//! files and omit anything it does not override.

use serde::{Deserialize, Serialize};

/// Settings for the allocation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSettings {
    /// Minimum confidence score a candidate needs to appear in the
    /// auto-allocation preview
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,
}

fn default_confidence_threshold() -> u8 {
    75
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl AllocationSettings {
    /// Settings with a custom confidence threshold
    pub fn with_threshold(confidence_threshold: u8) -> Self {
        Self {
            confidence_threshold,
        }
    }
}
