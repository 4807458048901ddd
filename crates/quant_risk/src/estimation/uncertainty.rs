//! Bias correction, uncertainty decomposition and sensitivity of estimates.
//!
//! # Bias correction
//!
//! An estimate from a poorly calibrated expert is widened before use:
//! the P10..P90 span grows by `width × (overconfidence + availability)`,
//! split evenly either side, and P30/P70 are stretched with it. A P10 that
//! started non-negative is floored at zero. Anchoring is modelled as a
//! seeded jitter of the median of at most `width × 0.05 × anchoring`.
//!
//! # Uncertainty
//!
//! - epistemic: disagreement between experts plus relative interval width
//! - aleatory: coefficient of variation of historical data, or a default
//!   per kind of quantity
//! - total: `sqrt(epistemic² + aleatory²)`

use super::rng::TrainingRng;
use quant_core::calibration::CalibrationLevel;
use quant_core::estimate::{HubbardEstimate, Percentiles};
use quant_core::ids::EstimateId;
use quant_core::{QuantError, QuantResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Uncertainty above which a component is reported as a driver.
pub const DRIVER_THRESHOLD: f64 = 0.3;

/// Coefficient of variation of expert medians that signals disagreement.
pub const DISAGREEMENT_THRESHOLD: f64 = 0.2;

/// Total uncertainty above which better information is deemed valuable.
pub const HIGH_VALUE_THRESHOLD: f64 = 0.5;

/// Share of the corrected width the median may be shifted by, per unit of
/// anchoring factor.
const ANCHORING_JITTER: f64 = 0.05;

/// Strength of a cognitive bias.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasSeverity {
    /// Little exposure to the bias
    #[default]
    Low,
    /// Moderate exposure
    Medium,
    /// Strong exposure
    High,
}

/// What an estimator is known to be prone to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasProfile {
    /// Grade from calibration training
    pub calibration_level: CalibrationLevel,
    /// Tendency to stick to a starting value
    #[serde(default)]
    pub anchoring: BiasSeverity,
    /// Tendency to overweight recent or vivid events
    #[serde(default)]
    pub availability: BiasSeverity,
}

impl BiasProfile {
    /// Profile with low anchoring and availability bias.
    pub fn new(calibration_level: CalibrationLevel) -> Self {
        Self {
            calibration_level,
            anchoring: BiasSeverity::Low,
            availability: BiasSeverity::Low,
        }
    }

    /// Set the anchoring severity.
    pub fn with_anchoring(mut self, severity: BiasSeverity) -> Self {
        self.anchoring = severity;
        self
    }

    /// Set the availability severity.
    pub fn with_availability(mut self, severity: BiasSeverity) -> Self {
        self.availability = severity;
        self
    }

    /// Share by which the P10..P90 span is widened.
    pub fn widening(&self) -> f64 {
        overconfidence_factor(self.calibration_level) + availability_factor(self.availability)
    }
}

/// Widening applied for a calibration grade.
pub fn overconfidence_factor(level: CalibrationLevel) -> f64 {
    match level {
        CalibrationLevel::Uncalibrated => 0.3,
        CalibrationLevel::Basic => 0.2,
        CalibrationLevel::Intermediate => 0.1,
        CalibrationLevel::Advanced => 0.05,
        CalibrationLevel::Expert => 0.02,
    }
}

/// Anchoring factor for a severity.
pub fn anchoring_factor(severity: BiasSeverity) -> f64 {
    match severity {
        BiasSeverity::High => 0.25,
        BiasSeverity::Medium => 0.15,
        BiasSeverity::Low => 0.05,
    }
}

/// Availability factor for a severity.
pub fn availability_factor(severity: BiasSeverity) -> f64 {
    match severity {
        BiasSeverity::High => 0.2,
        BiasSeverity::Medium => 0.1,
        BiasSeverity::Low => 0.05,
    }
}

/// Widen an estimate for the estimator's known biases.
///
/// The result is a new estimate under a fresh id and stays ordered.
///
/// # Errors
///
/// The ordering error of the input when its anchors are out of order.
pub fn correct_for_bias(
    estimate: &HubbardEstimate,
    profile: &BiasProfile,
    rng: &mut TrainingRng,
) -> QuantResult<HubbardEstimate> {
    let p = estimate.percentiles();
    if !p.is_ordered() {
        return Err(p.order_error());
    }
    let extra = p.range_width() * profile.widening();

    let mut p10 = p.p10 - extra / 2.0;
    if p.p10 >= 0.0 {
        p10 = p10.max(0.0);
    }
    let p90 = p.p90 + extra / 2.0;

    let stretch = |inner: f64, old_outer: f64, new_outer: f64| {
        let span = old_outer - p.p50;
        if span == 0.0 {
            inner
        } else {
            p.p50 + (inner - p.p50) * (new_outer - p.p50) / span
        }
    };
    let p30 = stretch(p.p30, p.p10, p10).clamp(p10, p.p50);
    let p70 = stretch(p.p70, p.p90, p90).clamp(p.p50, p90);

    let amplitude = (p90 - p10) * ANCHORING_JITTER * anchoring_factor(profile.anchoring);
    let shift = (2.0 * rng.gen_uniform() - 1.0) * amplitude;
    let p50 = (p.p50 + shift).clamp(p30, p70);

    debug!(
        id = %estimate.id(),
        widening = profile.widening(),
        shift,
        "bias-corrected estimate"
    );

    let corrected = HubbardEstimate::new(
        EstimateId::generate(),
        estimate.parameter(),
        estimate.estimator(),
        estimate.timestamp(),
        Percentiles::new(p10, p30, p50, p70, p90),
        estimate.confidence(),
        estimate.expertise(),
    )
    .with_basis(if estimate.basis_of_estimate().is_empty() {
        "bias-corrected".to_string()
    } else {
        format!("{} (bias-corrected)", estimate.basis_of_estimate())
    })
    .with_assumptions(estimate.assumptions().to_vec());
    Ok(corrected)
}

/// Kind of quantity being estimated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Event frequency
    Frequency,
    /// Loss magnitude
    Magnitude,
    /// Cost of a control or response
    Cost,
    /// Probability of an event
    Probability,
    /// Control effectiveness
    Effectiveness,
    /// Anything else
    #[default]
    Other,
}

impl QuantityKind {
    /// Natural variability assumed when no history is available.
    pub fn default_aleatory(&self) -> f64 {
        match self {
            Self::Frequency => 0.3,
            Self::Magnitude => 0.4,
            Self::Cost => 0.2,
            Self::Probability => 0.1,
            Self::Effectiveness => 0.2,
            Self::Other => 0.3,
        }
    }
}

/// Reason an estimate is uncertain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyDriver {
    /// Epistemic uncertainty above the driver threshold
    LimitedKnowledge,
    /// Aleatory uncertainty above the driver threshold
    NaturalVariability,
    /// Expert medians spread beyond the disagreement threshold
    ExpertDisagreement,
}

impl fmt::Display for UncertaintyDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::LimitedKnowledge => "Limited knowledge/data",
            Self::NaturalVariability => "High natural variability",
            Self::ExpertDisagreement => "Expert disagreement",
        };
        f.write_str(s)
    }
}

/// Way to reduce uncertainty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionStrategy {
    /// Gather more data
    DataCollection,
    /// Calibrate the experts
    ExpertCalibration,
    /// Compare against a reference class
    ReferenceClassForecasting,
    /// Model the variability statistically
    StatisticalModelling,
    /// Forecast conditionally on observable drivers
    ConditionalForecasting,
}

/// A reduction strategy with the uncertainty it could remove.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReductionOption {
    /// Strategy
    pub strategy: ReductionStrategy,
    /// Uncertainty it could remove
    pub potential_reduction: f64,
}

/// Uncertainty decomposition of one quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyQuantification {
    /// Quantity analysed
    pub parameter: String,
    /// Knowledge uncertainty in [0, 1]
    pub epistemic: f64,
    /// Natural variability in [0, 1]
    pub aleatory: f64,
    /// `sqrt(epistemic² + aleatory²)`
    pub total: f64,
    /// Reasons the quantity is uncertain
    pub drivers: Vec<UncertaintyDriver>,
    /// Strategies aimed at the larger component
    pub reduction_options: Vec<ReductionOption>,
    /// Total above [`HIGH_VALUE_THRESHOLD`]
    pub high_value_information: bool,
    /// Indicative value of better information
    pub information_value: f64,
}

/// Decompose the uncertainty of one quantity estimated by one or more
/// experts.
///
/// # Errors
///
/// [`QuantError::InvalidAnalysisInput`] when `estimates` is empty.
pub fn quantify_uncertainty(
    estimates: &[HubbardEstimate],
    kind: QuantityKind,
    historical: Option<&[f64]>,
) -> QuantResult<UncertaintyQuantification> {
    let first = estimates.first().ok_or_else(|| {
        QuantError::InvalidAnalysisInput("at least one estimate is required".to_string())
    })?;

    let medians: Vec<f64> = estimates.iter().map(|e| e.percentiles().p50).collect();
    let disagreement = if estimates.len() > 1 {
        coefficient_of_variation(&medians)
    } else {
        0.0
    };

    let relative_widths: Vec<f64> = estimates
        .iter()
        .filter(|e| e.percentiles().p50 > 0.0)
        .map(|e| e.range_width() / e.percentiles().p50)
        .collect();
    let mean_relative_width = if relative_widths.is_empty() {
        1.0
    } else {
        relative_widths.iter().sum::<f64>() / relative_widths.len() as f64
    };

    let epistemic = if estimates.len() > 1 {
        ((disagreement + mean_relative_width) / 2.0).min(1.0)
    } else {
        mean_relative_width.min(1.0)
    };

    let aleatory = match historical {
        Some(data) if !data.is_empty() => coefficient_of_variation(data).min(1.0),
        _ => kind.default_aleatory(),
    };

    let total = epistemic.hypot(aleatory);

    let mut drivers = Vec::new();
    if epistemic > DRIVER_THRESHOLD {
        drivers.push(UncertaintyDriver::LimitedKnowledge);
    }
    if aleatory > DRIVER_THRESHOLD {
        drivers.push(UncertaintyDriver::NaturalVariability);
    }
    if estimates.len() > 1 && disagreement > DISAGREEMENT_THRESHOLD {
        drivers.push(UncertaintyDriver::ExpertDisagreement);
    }

    let option = |strategy, potential_reduction| ReductionOption {
        strategy,
        potential_reduction,
    };
    let reduction_options = if epistemic > aleatory {
        vec![
            option(ReductionStrategy::DataCollection, epistemic * 0.4),
            option(ReductionStrategy::ExpertCalibration, epistemic * 0.3),
            option(ReductionStrategy::ReferenceClassForecasting, epistemic * 0.2),
        ]
    } else {
        vec![
            option(ReductionStrategy::StatisticalModelling, aleatory * 0.3),
            option(ReductionStrategy::ConditionalForecasting, aleatory * 0.2),
        ]
    };

    let high_value_information = total > HIGH_VALUE_THRESHOLD;
    let information_value = if high_value_information {
        total * 100_000.0
    } else {
        total * 10_000.0
    };

    debug!(
        parameter = first.parameter(),
        estimates = estimates.len(),
        epistemic,
        aleatory,
        "quantified uncertainty"
    );

    Ok(UncertaintyQuantification {
        parameter: first.parameter().to_string(),
        epistemic,
        aleatory,
        total,
        drivers,
        reduction_options,
        high_value_information,
        information_value,
    })
}

/// Expected value of perfect information, simplified: the decision value
/// scaled by the uncertainty that can actually be removed.
pub fn information_value(
    current_uncertainty: f64,
    potential_reduction: f64,
    decision_value: f64,
) -> f64 {
    decision_value * current_uncertainty.min(potential_reduction)
}

/// Response of a model output to one input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSensitivity {
    /// Input parameter
    pub parameter: String,
    /// Median fed to the model in the base case
    pub base_value: f64,
    /// Model output with this parameter perturbed
    pub perturbed_output: f64,
    /// Relative output change per relative input change
    pub elasticity: f64,
}

/// One-at-a-time sensitivity of a model to its inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityReport {
    /// Output with every input at its median
    pub base_output: f64,
    /// Relative perturbation applied to each input
    pub perturbation: f64,
    /// Per-parameter results, largest `|elasticity|` first
    pub parameters: Vec<ParameterSensitivity>,
}

/// Perturb each estimate's median by `perturbation` (relative) in turn
/// and record how `model` responds.
///
/// Estimates are keyed by parameter name. An elasticity is 0 when the base
/// output or the parameter's median is 0.
///
/// # Errors
///
/// [`QuantError::InvalidAnalysisInput`] for no estimates, a repeated
/// parameter name, or a perturbation that is not positive and finite.
pub fn sensitivity_analysis<F>(
    estimates: &[HubbardEstimate],
    model: F,
    perturbation: f64,
) -> QuantResult<SensitivityReport>
where
    F: Fn(&BTreeMap<String, f64>) -> f64,
{
    if estimates.is_empty() {
        return Err(QuantError::InvalidAnalysisInput(
            "at least one estimate is required".to_string(),
        ));
    }
    if !(perturbation.is_finite() && perturbation > 0.0) {
        return Err(QuantError::InvalidAnalysisInput(format!(
            "perturbation {} must be positive",
            perturbation
        )));
    }

    let mut base = BTreeMap::new();
    for e in estimates {
        if base
            .insert(e.parameter().to_string(), e.percentiles().p50)
            .is_some()
        {
            return Err(QuantError::InvalidAnalysisInput(format!(
                "parameter {} appears more than once",
                e.parameter()
            )));
        }
    }
    let base_output = model(&base);

    let mut parameters: Vec<ParameterSensitivity> = estimates
        .iter()
        .map(|e| {
            let median = e.percentiles().p50;
            let mut inputs = base.clone();
            inputs.insert(e.parameter().to_string(), median * (1.0 + perturbation));
            let perturbed_output = model(&inputs);
            let elasticity = if base_output == 0.0 || median == 0.0 {
                0.0
            } else {
                (perturbed_output - base_output) / base_output / perturbation
            };
            ParameterSensitivity {
                parameter: e.parameter().to_string(),
                base_value: median,
                perturbed_output,
                elasticity,
            }
        })
        .collect();
    // stable: equal elasticities keep input order
    parameters.sort_by(|a, b| b.elasticity.abs().total_cmp(&a.elasticity.abs()));

    Ok(SensitivityReport {
        base_output,
        perturbation,
        parameters,
    })
}

/// Population standard deviation over mean; 0 when the mean is not positive.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}
