//! Calibrated estimation (Hubbard 5-point method).
//!
//! This module provides:
//! - [`EstimationEngine`]: validation of 5-point estimates with derived shape metrics
//! - Calibration training and scoring (`calibration`)
//! - Pooling of several experts' estimates (`pooling`)
//! - Mapping an estimate onto a parametric distribution (`distribution`)
//! - Bias correction, uncertainty decomposition and sensitivity (`uncertainty`)
//!
//! The engine holds only configuration. Every operation is a pure function
//! of its inputs, so one engine can be shared across threads.

mod calibration;
mod distribution;
mod pooling;
mod rng;
mod uncertainty;

pub use calibration::{
    question_bank, recommended_adjustment, score_exercise, CalibrationQuestion, CalibrationReport,
    CalibrationResponder, CalibrationTrainer, IntervalAdjustment, SimulatedResponder,
};
pub use distribution::{fit_distribution, DistributionKind, FittedDistribution, Z_P90};
pub use pooling::{expertise_weight, pool_estimates, PoolingMethod, LOG_POOLING_FLOOR};
pub use rng::TrainingRng;
pub use uncertainty::{
    anchoring_factor, availability_factor, correct_for_bias, information_value,
    overconfidence_factor, quantify_uncertainty, sensitivity_analysis, BiasProfile, BiasSeverity,
    ParameterSensitivity, QuantityKind, ReductionOption, ReductionStrategy, SensitivityReport,
    UncertaintyDriver, UncertaintyQuantification,
};

use chrono::{DateTime, Utc};
use quant_core::calibration::CalibrationSession;
use quant_core::config::{CalibrationConfig, EstimationConfig, QuantConfig};
use quant_core::estimate::{EstimateDraft, Expertise, HubbardEstimate, Percentiles};
use quant_core::{QuantError, QuantResult};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Skew implied by the asymmetry ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionShape {
    /// Ratio within the symmetry tolerance of 1
    Symmetric,
    /// Ratio above 1
    RightSkewed,
    /// Ratio below 1
    LeftSkewed,
    /// `p90 == p50`, ratio not defined
    Undefined,
}

impl fmt::Display for DistributionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Symmetric => "symmetric",
            Self::RightSkewed => "right-skewed",
            Self::LeftSkewed => "left-skewed",
            Self::Undefined => "undefined",
        };
        f.write_str(s)
    }
}

/// Metrics derived from a valid estimate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// `p90 - p10`
    pub range_width: f64,
    /// `(p50 - p10) / (p90 - p50)`; `+inf` when degenerate
    pub asymmetry_ratio: f64,
    /// Classification of the ratio
    pub implied_distribution: DistributionShape,
}

/// Non-fatal observation about an estimate.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// Range narrower than usual for the estimator's expertise
    Overconfidence {
        /// Declared expertise
        expertise: Expertise,
        /// `range_width / |p50|`
        relative_width: f64,
        /// Minimum expected for the expertise
        minimum: f64,
    },
    /// `p90 == p50`; the asymmetry ratio is reported as `+inf`
    DegenerateAsymmetry,
    /// All anchors equal
    ZeroWidth,
    /// Confidence outside [0, 1]
    ConfidenceOutOfRange {
        /// Reported confidence
        confidence: f64,
    },
    /// No basis of estimate recorded
    MissingBasis,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overconfidence {
                expertise,
                relative_width,
                minimum,
            } => write!(
                f,
                "Possible overconfidence: {} estimator gave a relative range of {:.3}, below {:.3}",
                expertise, relative_width, minimum
            ),
            Self::DegenerateAsymmetry => {
                write!(f, "p90 equals p50; asymmetry ratio is undefined")
            }
            Self::ZeroWidth => write!(f, "All five percentiles are equal"),
            Self::ConfidenceOutOfRange { confidence } => {
                write!(f, "Confidence {} is outside [0, 1]", confidence)
            }
            Self::MissingBasis => write!(f, "No basis of estimate recorded"),
        }
    }
}

/// Outcome of validating an estimate.
///
/// Hard failures are listed in `errors` and make `is_valid` false; warnings
/// never do.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// No hard failure occurred
    pub is_valid: bool,
    /// Hard failures
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<QuantError>,
    /// Non-fatal observations
    pub warnings: Vec<ValidationWarning>,
    /// Present when the anchors are complete and ordered
    pub derived_metrics: Option<DerivedMetrics>,
}

impl ValidationResult {
    fn rejected(error: QuantError) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            derived_metrics: None,
        }
    }
}

fn serialize_errors<S: Serializer>(
    errors: &[QuantError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Validator and training front end for 5-point estimates.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use quant_core::{EstimateDraft, Percentiles};
/// use quant_risk::estimation::{DistributionShape, EstimationEngine};
///
/// let engine = EstimationEngine::default();
/// let draft = EstimateDraft::new("breach_cost", "alice").with_percentiles(Percentiles::new(
///     100_000.0, 300_000.0, 500_000.0, 700_000.0, 900_000.0,
/// ));
/// let estimate = draft.finalise(Utc::now()).unwrap();
/// let result = engine.validate_estimate(&estimate);
///
/// assert!(result.is_valid);
/// let metrics = result.derived_metrics.unwrap();
/// assert_eq!(metrics.implied_distribution, DistributionShape::Symmetric);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EstimationEngine {
    config: EstimationConfig,
    calibration: CalibrationConfig,
}

impl EstimationEngine {
    /// Engine with the given validation heuristics and default calibration.
    pub fn new(config: EstimationConfig) -> Self {
        Self {
            config,
            calibration: CalibrationConfig::default(),
        }
    }

    /// Engine configured from the full quantification config.
    pub fn from_config(config: &QuantConfig) -> Self {
        Self::new(config.estimation).with_calibration(config.calibration)
    }

    /// Override the calibration parameters.
    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    /// Validation heuristics.
    pub fn config(&self) -> &EstimationConfig {
        &self.config
    }

    /// Calibration parameters.
    pub fn calibration_config(&self) -> &CalibrationConfig {
        &self.calibration
    }

    /// Validate a complete estimate.
    pub fn validate_estimate(&self, estimate: &HubbardEstimate) -> ValidationResult {
        let result = self.validate_parts(
            estimate.percentiles(),
            estimate.confidence(),
            estimate.expertise(),
            estimate.basis_of_estimate(),
        );
        debug!(
            id = %estimate.id(),
            parameter = estimate.parameter(),
            valid = result.is_valid,
            warnings = result.warnings.len(),
            "validated estimate"
        );
        result
    }

    /// Validate elicitation input; missing anchors fail before any other check.
    pub fn validate_draft(&self, draft: &EstimateDraft) -> ValidationResult {
        match draft.percentiles() {
            Ok(p) => self.validate_parts(
                &p,
                draft.confidence.unwrap_or(0.9),
                draft.expertise,
                &draft.basis_of_estimate,
            ),
            Err(e) => ValidationResult::rejected(e),
        }
    }

    /// Finalise a draft, failing on the first hard error.
    pub fn accept(
        &self,
        draft: EstimateDraft,
        timestamp: DateTime<Utc>,
    ) -> QuantResult<HubbardEstimate> {
        let percentiles = draft.percentiles()?;
        if !percentiles.is_ordered() {
            return Err(percentiles.order_error());
        }
        draft.finalise(timestamp)
    }

    /// Classify an asymmetry ratio.
    pub fn classify(&self, asymmetry_ratio: f64) -> DistributionShape {
        if !asymmetry_ratio.is_finite() {
            DistributionShape::Undefined
        } else if (asymmetry_ratio - 1.0).abs() <= self.config.symmetry_tolerance {
            DistributionShape::Symmetric
        } else if asymmetry_ratio > 1.0 {
            DistributionShape::RightSkewed
        } else {
            DistributionShape::LeftSkewed
        }
    }

    fn validate_parts(
        &self,
        p: &Percentiles,
        confidence: f64,
        expertise: Expertise,
        basis: &str,
    ) -> ValidationResult {
        if !p.is_ordered() {
            return ValidationResult::rejected(p.order_error());
        }

        let mut warnings = Vec::new();
        let range_width = p.range_width();
        let upper = p.p90 - p.p50;
        let asymmetry_ratio = if upper == 0.0 {
            warnings.push(ValidationWarning::DegenerateAsymmetry);
            f64::INFINITY
        } else {
            (p.p50 - p.p10) / upper
        };

        if range_width == 0.0 {
            warnings.push(ValidationWarning::ZeroWidth);
        }

        if p.p50 != 0.0 {
            let relative_width = range_width / p.p50.abs();
            let minimum = self.config.min_relative_width(expertise);
            if relative_width < minimum {
                warnings.push(ValidationWarning::Overconfidence {
                    expertise,
                    relative_width,
                    minimum,
                });
            }
        }

        if !(0.0..=1.0).contains(&confidence) {
            warnings.push(ValidationWarning::ConfidenceOutOfRange { confidence });
        }
        if basis.trim().is_empty() {
            warnings.push(ValidationWarning::MissingBasis);
        }

        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings,
            derived_metrics: Some(DerivedMetrics {
                range_width,
                asymmetry_ratio,
                implied_distribution: self.classify(asymmetry_ratio),
            }),
        }
    }

    /// Run a calibration training session over the built-in question bank.
    pub fn run_calibration_training<R: CalibrationResponder + ?Sized>(
        &self,
        estimator: &str,
        num_questions: usize,
        responder: &mut R,
        rng: &mut TrainingRng,
    ) -> QuantResult<CalibrationSession> {
        CalibrationTrainer::new(self.calibration).run(estimator, num_questions, responder, rng)
    }

    /// Summarise a scored session.
    pub fn calibration_report(&self, session: &CalibrationSession) -> CalibrationReport {
        CalibrationReport::from_session(session, &self.calibration)
    }

    /// Widen an estimate for its estimator's known biases.
    pub fn apply_bias_correction(
        &self,
        estimate: &HubbardEstimate,
        profile: &BiasProfile,
        rng: &mut TrainingRng,
    ) -> QuantResult<HubbardEstimate> {
        correct_for_bias(estimate, profile, rng)
    }

    /// Split the uncertainty in one quantity into epistemic and aleatory parts.
    pub fn quantify_uncertainty(
        &self,
        estimates: &[HubbardEstimate],
        kind: QuantityKind,
        historical: Option<&[f64]>,
    ) -> QuantResult<UncertaintyQuantification> {
        quantify_uncertainty(estimates, kind, historical)
    }

    /// One-at-a-time sensitivity of `model` to each estimate's median.
    pub fn sensitivity_analysis<F>(
        &self,
        estimates: &[HubbardEstimate],
        model: F,
        perturbation: f64,
    ) -> QuantResult<SensitivityReport>
    where
        F: Fn(&BTreeMap<String, f64>) -> f64,
    {
        sensitivity_analysis(estimates, model, perturbation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use quant_core::ids::EstimateId;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    fn estimate(p: Percentiles, expertise: Expertise) -> HubbardEstimate {
        HubbardEstimate::new(EstimateId::new("e"), "loss", "alice", ts(), p, 0.9, expertise)
            .with_basis("incident history")
    }

    // ================================================================
    // Ordering
    // ================================================================

    #[test]
    fn test_symmetric_worked_example() {
        let engine = EstimationEngine::default();
        let e = estimate(
            Percentiles::new(100_000.0, 300_000.0, 500_000.0, 700_000.0, 900_000.0),
            Expertise::Experienced,
        );
        let result = engine.validate_estimate(&e);

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        let m = result.derived_metrics.unwrap();
        assert_relative_eq!(m.range_width, 800_000.0);
        assert_relative_eq!(m.asymmetry_ratio, 1.0);
        assert_eq!(m.implied_distribution, DistributionShape::Symmetric);
    }

    #[test]
    fn test_out_of_order_is_rejected() {
        let engine = EstimationEngine::default();
        let e = estimate(Percentiles::new(1.0, 5.0, 3.0, 4.0, 6.0), Expertise::Expert);
        let result = engine.validate_estimate(&e);

        assert!(!result.is_valid);
        assert!(matches!(result.errors[0], QuantError::InvalidRangeOrder { .. }));
        assert!(result.derived_metrics.is_none());
    }

    #[test]
    fn test_incomplete_draft_fails_before_ordering() {
        let engine = EstimationEngine::default();
        let mut draft = EstimateDraft::new("loss", "alice");
        draft.p10 = Some(9.0);
        draft.p50 = Some(1.0);
        draft.p90 = Some(5.0);

        let result = engine.validate_draft(&draft);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![QuantError::IncompleteEstimate {
                missing: vec!["p30".to_string(), "p70".to_string()],
            }]
        );
    }

    #[test]
    fn test_accept_rejects_unordered_draft() {
        let engine = EstimationEngine::default();
        let draft = EstimateDraft::new("loss", "alice")
            .with_percentiles(Percentiles::new(5.0, 4.0, 3.0, 2.0, 1.0));
        assert!(matches!(
            engine.accept(draft, ts()),
            Err(QuantError::InvalidRangeOrder { .. })
        ));
    }

    // ================================================================
    // Shape and warnings
    // ================================================================

    #[test]
    fn test_skew_classification() {
        let engine = EstimationEngine::default();
        assert_eq!(engine.classify(1.15), DistributionShape::Symmetric);
        assert_eq!(engine.classify(0.85), DistributionShape::Symmetric);
        assert_eq!(engine.classify(1.5), DistributionShape::RightSkewed);
        assert_eq!(engine.classify(0.5), DistributionShape::LeftSkewed);
        assert_eq!(engine.classify(f64::INFINITY), DistributionShape::Undefined);
    }

    #[test]
    fn test_degenerate_asymmetry_warns_instead_of_failing() {
        let engine = EstimationEngine::default();
        let e = estimate(Percentiles::new(10.0, 20.0, 50.0, 50.0, 50.0), Expertise::Expert);
        let result = engine.validate_estimate(&e);

        assert!(result.is_valid);
        assert!(result.warnings.contains(&ValidationWarning::DegenerateAsymmetry));
        let m = result.derived_metrics.unwrap();
        assert!(m.asymmetry_ratio.is_infinite());
        assert_eq!(m.implied_distribution, DistributionShape::Undefined);
    }

    #[test]
    fn test_zero_width_warns() {
        let engine = EstimationEngine::default();
        let e = estimate(Percentiles::new(7.0, 7.0, 7.0, 7.0, 7.0), Expertise::WorldClass);
        let result = engine.validate_estimate(&e);

        assert!(result.is_valid);
        assert!(result.warnings.contains(&ValidationWarning::ZeroWidth));
        assert_eq!(result.derived_metrics.unwrap().range_width, 0.0);
    }

    #[test]
    fn test_novice_narrow_range_flags_overconfidence() {
        let engine = EstimationEngine::default();
        // width 100k on a median of 1M: relative 0.1 < 0.5
        let p = Percentiles::new(950_000.0, 980_000.0, 1_000_000.0, 1_020_000.0, 1_050_000.0);

        let novice = engine.validate_estimate(&estimate(p, Expertise::Novice));
        assert!(novice.is_valid);
        assert!(novice
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::Overconfidence { .. })));

        let expert = engine.validate_estimate(&estimate(p, Expertise::Expert));
        assert!(!expert
            .warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::Overconfidence { .. })));
    }

    #[test]
    fn test_missing_basis_and_bad_confidence_warn() {
        let engine = EstimationEngine::default();
        let draft = EstimateDraft::new("loss", "alice")
            .with_percentiles(Percentiles::new(1.0, 2.0, 3.0, 4.0, 5.0))
            .with_confidence(1.5);
        let result = engine.validate_draft(&draft);

        assert!(result.is_valid);
        assert!(result.warnings.contains(&ValidationWarning::MissingBasis));
        assert!(result
            .warnings
            .contains(&ValidationWarning::ConfidenceOutOfRange { confidence: 1.5 }));
    }

    #[test]
    fn test_result_serialises_errors_as_messages() {
        let engine = EstimationEngine::default();
        let e = estimate(Percentiles::new(2.0, 1.0, 3.0, 4.0, 5.0), Expertise::Expert);
        let json = serde_json::to_value(engine.validate_estimate(&e)).unwrap();
        assert_eq!(json["isValid"], false);
        assert!(json["errors"][0].as_str().unwrap().contains("out of order"));
    }

    #[test]
    fn test_training_through_engine() {
        let engine = EstimationEngine::from_config(&QuantConfig::default());
        let mut rng = TrainingRng::from_seed(42);
        let mut responder = SimulatedResponder::new(Expertise::Expert, 42);
        let session = engine
            .run_calibration_training("alice", 12, &mut responder, &mut rng)
            .unwrap();
        let report = engine.calibration_report(&session);
        assert_eq!(report.questions, 12);
        assert_eq!(report.estimator, "alice");
    }

    // ================================================================
    // Properties
    // ================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn prop_valid_iff_ordered(anchors in prop::array::uniform5(-1e6f64..1e6)) {
            let engine = EstimationEngine::default();
            let p = Percentiles::new(anchors[0], anchors[1], anchors[2], anchors[3], anchors[4]);
            let result = engine.validate_estimate(&estimate(p, Expertise::Experienced));
            prop_assert_eq!(result.is_valid, p.is_ordered());
        }

        #[test]
        fn prop_valid_estimates_have_non_negative_width(
            anchors in prop::array::uniform5(-1e6f64..1e6),
        ) {
            let mut anchors = anchors;
            anchors.sort_by(|a, b| a.total_cmp(b));
            let engine = EstimationEngine::default();
            let p = Percentiles::new(anchors[0], anchors[1], anchors[2], anchors[3], anchors[4]);
            let result = engine.validate_estimate(&estimate(p, Expertise::Expert));
            prop_assert!(result.is_valid);
            prop_assert!(result.derived_metrics.unwrap().range_width >= 0.0);
        }

        #[test]
        fn prop_bias_correction_keeps_order_and_widens(
            anchors in prop::array::uniform5(-1e6f64..1e6),
            seed in any::<u64>(),
        ) {
            let mut anchors = anchors;
            anchors.sort_by(|a, b| a.total_cmp(b));
            let engine = EstimationEngine::default();
            let p = Percentiles::new(anchors[0], anchors[1], anchors[2], anchors[3], anchors[4]);
            let original = estimate(p, Expertise::Novice);
            let profile = BiasProfile::new(quant_core::CalibrationLevel::Basic)
                .with_anchoring(BiasSeverity::High);
            let mut rng = TrainingRng::from_seed(seed);
            let corrected = engine.apply_bias_correction(&original, &profile, &mut rng).unwrap();
            prop_assert!(corrected.percentiles().is_ordered());
            prop_assert!(corrected.range_width() >= original.range_width());
        }
    }
}
