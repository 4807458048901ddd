//! Quantification configuration.
//!
//! Every threshold and heuristic factor used by the engines lives here so it
//! can be audited and overridden from TOML. All fields default to the values
//! used in board reporting; a partial TOML document only overrides what it
//! names.
//!
//! ```toml
//! [priority]
//! critical = 2000000.0
//!
//! [summary]
//! mitigated_exposure_factor = 0.5
//! ```

use crate::estimate::Expertise;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),

    /// One or more fields failed validation
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// ALE thresholds separating priority tiers (strict `>` comparisons).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    /// ALE above this is critical
    pub critical: f64,
    /// ALE above this is high
    pub high: f64,
    /// ALE above this is medium
    pub medium: f64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            critical: 1_000_000.0,
            high: 500_000.0,
            medium: 100_000.0,
        }
    }
}

/// Factors used when composing the executive summary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Residual share of exposure after mitigation (flat 40% reduction)
    pub mitigated_exposure_factor: f64,
    /// Probability of ruin above which risk transfer is recommended
    pub ruin_probability_threshold: f64,
    /// Total ALE above which risk transfer (insurance) is recommended
    pub risk_transfer_exposure_threshold: f64,
    /// Annual financial-loss appetite
    pub risk_appetite: f64,
    /// Investments below this need no sign-off
    pub auto_approve_under: f64,
    /// Investments above this need executive sign-off
    pub executive_approval_over: f64,
    /// Investments above this need board sign-off
    pub board_approval_over: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            mitigated_exposure_factor: 0.6,
            ruin_probability_threshold: 0.01,
            risk_transfer_exposure_threshold: 5_000_000.0,
            risk_appetite: 2_500_000.0,
            auto_approve_under: 50_000.0,
            executive_approval_over: 1_000_000.0,
            board_approval_over: 5_000_000.0,
        }
    }
}

/// Heuristics applied when validating 5-point estimates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// `|asymmetry - 1|` at or below this is classified symmetric
    pub symmetry_tolerance: f64,
    /// Minimum `range_width / |p50|` expected from a novice
    pub novice_min_relative_width: f64,
    /// Minimum `range_width / |p50|` expected from an experienced estimator
    pub experienced_min_relative_width: f64,
    /// Minimum `range_width / |p50|` expected from an expert
    pub expert_min_relative_width: f64,
    /// Minimum `range_width / |p50|` expected from a world-class estimator
    pub world_class_min_relative_width: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            symmetry_tolerance: 0.15,
            novice_min_relative_width: 0.5,
            experienced_min_relative_width: 0.25,
            expert_min_relative_width: 0.1,
            world_class_min_relative_width: 0.0,
        }
    }
}

impl EstimationConfig {
    /// Minimum relative width expected for an expertise level.
    pub fn min_relative_width(&self, expertise: Expertise) -> f64 {
        match expertise {
            Expertise::Novice => self.novice_min_relative_width,
            Expertise::Experienced => self.experienced_min_relative_width,
            Expertise::Expert => self.expert_min_relative_width,
            Expertise::WorldClass => self.world_class_min_relative_width,
        }
    }
}

/// Parameters of calibration training.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Confidence the claimed intervals should carry
    pub confidence_level: f64,
    /// A miss is overconfident when width < factor × warranted width
    pub narrow_interval_factor: f64,
    /// Overconfidence rate above which wider intervals are recommended
    pub adjustment_trigger_rate: f64,
    /// Share of wide misses above which narrower intervals are recommended;
    /// checked before the overconfidence trigger
    pub underconfidence_trigger_rate: f64,
    /// Multiplier recommended to widen intervals
    pub widen_factor: f64,
    /// Multiplier recommended to narrow intervals
    pub narrow_factor: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.9,
            narrow_interval_factor: 0.8,
            adjustment_trigger_rate: 0.3,
            underconfidence_trigger_rate: 0.3,
            widen_factor: 1.2,
            narrow_factor: 0.8,
        }
    }
}

/// Complete quantification configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantConfig {
    /// Priority tiers
    pub priority: PriorityThresholds,
    /// Executive summary factors
    pub summary: SummaryConfig,
    /// Estimate validation heuristics
    pub estimation: EstimationConfig,
    /// Calibration training parameters
    pub calibration: CalibrationConfig,
}

impl QuantConfig {
    /// Parse from a TOML document and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: QuantConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let p = &self.priority;
        if !(p.critical > p.high && p.high > p.medium && p.medium >= 0.0) {
            errors.push(format!(
                "priority thresholds must satisfy critical > high > medium >= 0 (got {}, {}, {})",
                p.critical, p.high, p.medium
            ));
        }

        let s = &self.summary;
        if !(0.0..=1.0).contains(&s.mitigated_exposure_factor) {
            errors.push(format!(
                "summary.mitigated_exposure_factor {} must be in [0, 1]",
                s.mitigated_exposure_factor
            ));
        }
        if !(0.0..=1.0).contains(&s.ruin_probability_threshold) {
            errors.push(format!(
                "summary.ruin_probability_threshold {} must be in [0, 1]",
                s.ruin_probability_threshold
            ));
        }
        if s.risk_transfer_exposure_threshold < 0.0 || s.risk_appetite < 0.0 {
            errors.push("summary thresholds must be non-negative".to_string());
        }
        if !(0.0 <= s.auto_approve_under
            && s.auto_approve_under <= s.executive_approval_over
            && s.executive_approval_over <= s.board_approval_over)
        {
            errors.push(format!(
                "approval thresholds must satisfy auto <= executive <= board (got {}, {}, {})",
                s.auto_approve_under, s.executive_approval_over, s.board_approval_over
            ));
        }

        let e = &self.estimation;
        if e.symmetry_tolerance < 0.0 {
            errors.push(format!(
                "estimation.symmetry_tolerance {} must be non-negative",
                e.symmetry_tolerance
            ));
        }
        if Expertise::all()
            .iter()
            .any(|x| e.min_relative_width(*x) < 0.0)
        {
            errors.push("estimation minimum relative widths must be non-negative".to_string());
        }

        let c = &self.calibration;
        if !(c.confidence_level > 0.0 && c.confidence_level <= 1.0) {
            errors.push(format!(
                "calibration.confidence_level {} must be in (0, 1]",
                c.confidence_level
            ));
        }
        if !(0.0..=1.0).contains(&c.adjustment_trigger_rate)
            || !(0.0..=1.0).contains(&c.underconfidence_trigger_rate)
        {
            errors.push("calibration trigger rates must be in [0, 1]".to_string());
        }
        if c.narrow_interval_factor <= 0.0 {
            errors.push("calibration.narrow_interval_factor must be positive".to_string());
        }
        if c.widen_factor < 1.0 || !(0.0..=1.0).contains(&c.narrow_factor) {
            errors.push(
                "calibration.widen_factor must be >= 1 and narrow_factor in [0, 1]".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuantConfig::default();
        assert_eq!(config.priority.critical, 1_000_000.0);
        assert_eq!(config.priority.high, 500_000.0);
        assert_eq!(config.priority.medium, 100_000.0);
        assert_eq!(config.summary.mitigated_exposure_factor, 0.6);
        assert_eq!(config.estimation.symmetry_tolerance, 0.15);
        assert_eq!(config.calibration.confidence_level, 0.9);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(QuantConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = QuantConfig::from_toml_str(
            r#"
            [priority]
            critical = 2000000.0

            [summary]
            mitigated_exposure_factor = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.priority.critical, 2_000_000.0);
        assert_eq!(config.priority.high, 500_000.0);
        assert_eq!(config.summary.mitigated_exposure_factor, 0.5);
        assert_eq!(config.summary.ruin_probability_threshold, 0.01);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = QuantConfig::from_toml_str("").unwrap();
        assert_eq!(config, QuantConfig::default());
    }

    #[test]
    fn test_validate_inverted_thresholds() {
        let mut config = QuantConfig::default();
        config.priority.high = 2_000_000.0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("priority thresholds")));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_multiple_errors() {
        let mut config = QuantConfig::default();
        config.summary.mitigated_exposure_factor = 1.5;
        config.calibration.confidence_level = 0.0;
        config.estimation.symmetry_tolerance = -1.0;

        if let Err(ConfigError::Validation(errors)) = config.validate() {
            assert!(errors.len() >= 3, "Expected at least 3 validation errors");
        } else {
            panic!("Expected validation error");
        }
    }

    #[test]
    fn test_validate_approval_and_trigger_ranges() {
        let mut config = QuantConfig::default();
        config.summary.executive_approval_over = 10_000_000.0;
        config.calibration.underconfidence_trigger_rate = 1.5;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].contains("approval thresholds"));
                assert!(errors[1].contains("trigger rates"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error() {
        let result = QuantConfig::from_toml_str("[priority\ncritical = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_min_relative_width_by_expertise() {
        let e = EstimationConfig::default();
        assert_eq!(e.min_relative_width(Expertise::Novice), 0.5);
        assert_eq!(e.min_relative_width(Expertise::WorldClass), 0.0);
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Validation(vec!["Error 1".to_string(), "Error 2".to_string()]);
        let display = format!("{}", error);
        assert!(display.contains("Error 1"));
        assert!(display.contains("Error 2"));
    }
}
