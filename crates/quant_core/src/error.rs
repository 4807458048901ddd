//! Quantification error types.
//!
//! Hard failures of the quantification core, derived with `thiserror`.
//! Validation feedback that should not interrupt an editing session is
//! reported through structured validation results instead.

use thiserror::Error;

/// Errors that can occur during quantification operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantError {
    /// Percentiles of a 5-point estimate are not non-decreasing.
    #[error("Percentiles out of order: p10={p10}, p30={p30}, p50={p50}, p70={p70}, p90={p90}")]
    InvalidRangeOrder {
        /// 10th percentile
        p10: f64,
        /// 30th percentile
        p30: f64,
        /// 50th percentile
        p50: f64,
        /// 70th percentile
        p70: f64,
        /// 90th percentile
        p90: f64,
    },

    /// One or more of the five percentiles is missing.
    #[error("Incomplete estimate, missing: {}", .missing.join(", "))]
    IncompleteEstimate {
        /// Names of the missing percentiles
        missing: Vec<String>,
    },

    /// Mitigation cost cannot be used as an ROI divisor.
    #[error("Invalid mitigation cost for {mitigation}: {cost}")]
    InvalidMitigationCost {
        /// Mitigation identifier
        mitigation: String,
        /// Offending cost
        cost: f64,
    },

    /// Mitigation effectiveness outside [0, 1] or not finite.
    #[error("Invalid mitigation effectiveness for {mitigation}: {effectiveness}")]
    InvalidEffectiveness {
        /// Mitigation identifier
        mitigation: String,
        /// Offending effectiveness
        effectiveness: f64,
    },

    /// Scenario not found in the store.
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// Two scenarios in a loaded catalogue share an identifier.
    #[error("Duplicate scenario id: {0}")]
    DuplicateScenario(String),

    /// Mitigation not found on a scenario.
    #[error("Mitigation not found: scenario={0}, mitigation={1}")]
    MitigationNotFound(String, String),

    /// Update was based on a stale copy of the scenario.
    #[error("Version conflict for {id}: expected {expected}, found {found}")]
    VersionConflict {
        /// Scenario identifier
        id: String,
        /// Version carried by the submitted copy
        expected: u64,
        /// Version currently stored
        found: u64,
    },

    /// Template identifier unknown to the template library.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Pooling was requested for an empty set of estimates.
    #[error("Cannot pool an empty set of estimates")]
    EmptyEstimatePool,

    /// Estimate cannot be mapped onto the requested distribution.
    #[error("Invalid distribution input: {0}")]
    InvalidDistributionInput(String),

    /// Calibration training was requested with unusable parameters.
    #[error("Invalid calibration input: {0}")]
    InvalidCalibrationInput(String),

    /// Uncertainty or sensitivity analysis was given unusable input.
    #[error("Invalid analysis input: {0}")]
    InvalidAnalysisInput(String),
}

/// Result alias for quantification operations.
pub type QuantResult<T> = Result<T, QuantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_incomplete_estimate() {
        let err = QuantError::IncompleteEstimate {
            missing: vec!["p30".to_string(), "p70".to_string()],
        };
        assert_eq!(format!("{}", err), "Incomplete estimate, missing: p30, p70");
    }

    #[test]
    fn test_error_display_invalid_mitigation_cost() {
        let err = QuantError::InvalidMitigationCost {
            mitigation: "mfa".to_string(),
            cost: 0.0,
        };
        assert_eq!(format!("{}", err), "Invalid mitigation cost for mfa: 0");
    }

    #[test]
    fn test_error_display_version_conflict() {
        let err = QuantError::VersionConflict {
            id: "scenario_1".to_string(),
            expected: 2,
            found: 3,
        };
        assert_eq!(
            format!("{}", err),
            "Version conflict for scenario_1: expected 2, found 3"
        );
    }

    #[test]
    fn test_error_display_duplicate_scenario() {
        let err = QuantError::DuplicateScenario("scenario_1".to_string());
        assert_eq!(format!("{}", err), "Duplicate scenario id: scenario_1");
    }

    #[test]
    fn test_error_display_invalid_analysis_input() {
        let err = QuantError::InvalidAnalysisInput("at least one estimate is required".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid analysis input: at least one estimate is required"
        );
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(QuantError::EmptyEstimatePool);
        assert!(err.to_string().contains("empty"));
    }
}
