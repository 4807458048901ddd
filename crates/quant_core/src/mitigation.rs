//! Mitigation controls.

use crate::ids::MitigationId;
use serde::{Deserialize, Serialize};

/// A control that reduces a scenario's expected loss.
///
/// Owned by exactly one [`RiskScenario`](crate::scenario::RiskScenario).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMitigation {
    /// Mitigation identifier
    pub id: MitigationId,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Total cost in currency units
    pub cost: f64,
    /// Fractional loss reduction, in [0, 1]
    pub effectiveness: f64,
    /// Days to implement
    #[serde(default)]
    pub implementation_time: u32,
    /// Precomputed return on investment, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
}

impl RiskMitigation {
    /// Create a mitigation with no description and no implementation lead time.
    pub fn new(id: MitigationId, name: impl Into<String>, cost: f64, effectiveness: f64) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            cost,
            effectiveness,
            implementation_time: 0,
            roi: None,
        }
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the implementation lead time (days).
    pub fn with_implementation_time(mut self, days: u32) -> Self {
        self.implementation_time = days;
        self
    }

    /// Attach a precomputed ROI.
    pub fn with_roi(mut self, roi: f64) -> Self {
        self.roi = Some(roi);
        self
    }
}
