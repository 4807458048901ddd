//! Hubbard 5-point estimates.
//!
//! An estimate anchors an uncertain quantity with five percentiles
//! (P10/P30/P50/P70/P90). Elicitation input arrives as an [`EstimateDraft`]
//! whose percentiles may still be missing; [`EstimateDraft::finalise`] turns
//! a complete draft into an immutable [`HubbardEstimate`]. A corrected
//! estimate is a new value with a fresh id and timestamp.

use crate::error::{QuantError, QuantResult};
use crate::ids::EstimateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-declared expertise of an estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expertise {
    /// Little or no domain experience
    #[default]
    Novice,
    /// Working domain experience
    Experienced,
    /// Recognised domain expert
    Expert,
    /// Among the best in the field
    WorldClass,
}

impl Expertise {
    /// All levels, lowest first.
    pub fn all() -> [Self; 4] {
        [Self::Novice, Self::Experienced, Self::Expert, Self::WorldClass]
    }

    /// Snake-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Experienced => "experienced",
            Self::Expert => "expert",
            Self::WorldClass => "world_class",
        }
    }
}

impl fmt::Display for Expertise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five anchor percentiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Percentile {
    /// 10th percentile
    P10,
    /// 30th percentile
    P30,
    /// 50th percentile (median)
    P50,
    /// 70th percentile
    P70,
    /// 90th percentile
    P90,
}

impl Percentile {
    /// All anchors in ascending order.
    pub const ALL: [Percentile; 5] = [Self::P10, Self::P30, Self::P50, Self::P70, Self::P90];

    /// Field name of the anchor.
    pub fn name(&self) -> &'static str {
        match self {
            Self::P10 => "p10",
            Self::P30 => "p30",
            Self::P50 => "p50",
            Self::P70 => "p70",
            Self::P90 => "p90",
        }
    }

    /// Cumulative probability of the anchor.
    pub fn quantile(&self) -> f64 {
        match self {
            Self::P10 => 0.1,
            Self::P30 => 0.3,
            Self::P50 => 0.5,
            Self::P70 => 0.7,
            Self::P90 => 0.9,
        }
    }
}

/// The five anchor values of an estimate, in native units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 10th percentile
    pub p10: f64,
    /// 30th percentile
    pub p30: f64,
    /// 50th percentile
    pub p50: f64,
    /// 70th percentile
    pub p70: f64,
    /// 90th percentile
    pub p90: f64,
}

impl Percentiles {
    /// Create from the five anchors.
    pub fn new(p10: f64, p30: f64, p50: f64, p70: f64, p90: f64) -> Self {
        Self {
            p10,
            p30,
            p50,
            p70,
            p90,
        }
    }

    /// Anchors in ascending percentile order.
    pub fn as_array(&self) -> [f64; 5] {
        [self.p10, self.p30, self.p50, self.p70, self.p90]
    }

    /// Value of one anchor.
    pub fn get(&self, percentile: Percentile) -> f64 {
        match percentile {
            Percentile::P10 => self.p10,
            Percentile::P30 => self.p30,
            Percentile::P50 => self.p50,
            Percentile::P70 => self.p70,
            Percentile::P90 => self.p90,
        }
    }

    /// Whether `p10 <= p30 <= p50 <= p70 <= p90`.
    ///
    /// NaN anchors never compare, so they fail this check.
    pub fn is_ordered(&self) -> bool {
        self.as_array().windows(2).all(|w| w[0] <= w[1])
    }

    /// `p90 - p10`.
    pub fn range_width(&self) -> f64 {
        self.p90 - self.p10
    }

    /// Apply `f` to every anchor.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.p10), f(self.p30), f(self.p50), f(self.p70), f(self.p90))
    }

    /// Range-order error for these anchors.
    pub fn order_error(&self) -> QuantError {
        QuantError::InvalidRangeOrder {
            p10: self.p10,
            p30: self.p30,
            p50: self.p50,
            p70: self.p70,
            p90: self.p90,
        }
    }
}

/// An immutable, complete 5-point estimate.
///
/// Ordering of the percentiles is *not* checked here; run the estimate
/// through the estimation engine's validator before relying on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubbardEstimate {
    id: EstimateId,
    parameter: String,
    estimator: String,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    percentiles: Percentiles,
    confidence: f64,
    expertise: Expertise,
    #[serde(default)]
    basis_of_estimate: String,
    #[serde(default)]
    assumptions: Vec<String>,
}

impl HubbardEstimate {
    /// Create a new estimate.
    pub fn new(
        id: EstimateId,
        parameter: impl Into<String>,
        estimator: impl Into<String>,
        timestamp: DateTime<Utc>,
        percentiles: Percentiles,
        confidence: f64,
        expertise: Expertise,
    ) -> Self {
        Self {
            id,
            parameter: parameter.into(),
            estimator: estimator.into(),
            timestamp,
            percentiles,
            confidence,
            expertise,
            basis_of_estimate: String::new(),
            assumptions: Vec::new(),
        }
    }

    /// Attach the basis of estimate.
    pub fn with_basis(mut self, basis: impl Into<String>) -> Self {
        self.basis_of_estimate = basis.into();
        self
    }

    /// Attach the stated assumptions.
    pub fn with_assumptions(mut self, assumptions: Vec<String>) -> Self {
        self.assumptions = assumptions;
        self
    }

    /// Estimate identifier.
    pub fn id(&self) -> &EstimateId {
        &self.id
    }

    /// Label of the estimated quantity.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Identity of the estimator.
    pub fn estimator(&self) -> &str {
        &self.estimator
    }

    /// Elicitation instant.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The five anchors.
    pub fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }

    /// Self-reported confidence, in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Expertise of the estimator.
    pub fn expertise(&self) -> Expertise {
        self.expertise
    }

    /// Free-text basis of estimate.
    pub fn basis_of_estimate(&self) -> &str {
        &self.basis_of_estimate
    }

    /// Stated assumptions.
    pub fn assumptions(&self) -> &[String] {
        &self.assumptions
    }

    /// `p90 - p10`.
    pub fn range_width(&self) -> f64 {
        self.percentiles.range_width()
    }

    /// `(p50 - p10) / (p90 - p50)`; `+inf` when `p90 == p50`.
    pub fn asymmetry_ratio(&self) -> f64 {
        let p = &self.percentiles;
        let upper = p.p90 - p.p50;
        if upper == 0.0 {
            f64::INFINITY
        } else {
            (p.p50 - p.p10) / upper
        }
    }
}

/// Elicitation input in progress; any anchor may still be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimateDraft {
    /// Label of the estimated quantity
    pub parameter: String,
    /// Identity of the estimator
    pub estimator: String,
    /// 10th percentile
    pub p10: Option<f64>,
    /// 30th percentile
    pub p30: Option<f64>,
    /// 50th percentile
    pub p50: Option<f64>,
    /// 70th percentile
    pub p70: Option<f64>,
    /// 90th percentile
    pub p90: Option<f64>,
    /// Self-reported confidence, in [0, 1]
    pub confidence: Option<f64>,
    /// Expertise of the estimator
    pub expertise: Expertise,
    /// Free-text basis of estimate
    pub basis_of_estimate: String,
    /// Stated assumptions
    pub assumptions: Vec<String>,
}

impl EstimateDraft {
    /// Start a draft for `parameter` by `estimator`.
    pub fn new(parameter: impl Into<String>, estimator: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            estimator: estimator.into(),
            ..Self::default()
        }
    }

    /// Fill all five anchors at once.
    pub fn with_percentiles(mut self, p: Percentiles) -> Self {
        self.p10 = Some(p.p10);
        self.p30 = Some(p.p30);
        self.p50 = Some(p.p50);
        self.p70 = Some(p.p70);
        self.p90 = Some(p.p90);
        self
    }

    /// Set the expertise level.
    pub fn with_expertise(mut self, expertise: Expertise) -> Self {
        self.expertise = expertise;
        self
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Names of the anchors still missing.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (Percentile::P10, self.p10),
            (Percentile::P30, self.p30),
            (Percentile::P50, self.p50),
            (Percentile::P70, self.p70),
            (Percentile::P90, self.p90),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(p, _)| p.name())
        .collect()
    }

    /// The five anchors, if all are present.
    pub fn percentiles(&self) -> QuantResult<Percentiles> {
        match (self.p10, self.p30, self.p50, self.p70, self.p90) {
            (Some(p10), Some(p30), Some(p50), Some(p70), Some(p90)) => {
                Ok(Percentiles::new(p10, p30, p50, p70, p90))
            }
            _ => Err(QuantError::IncompleteEstimate {
                missing: self.missing().into_iter().map(str::to_string).collect(),
            }),
        }
    }

    /// Freeze the draft into an estimate stamped at `timestamp`.
    ///
    /// Fails with [`QuantError::IncompleteEstimate`] if any anchor is missing.
    /// A missing confidence defaults to 0.9, the usual calibrated interval.
    pub fn finalise(self, timestamp: DateTime<Utc>) -> QuantResult<HubbardEstimate> {
        let percentiles = self.percentiles()?;
        Ok(HubbardEstimate::new(
            EstimateId::generate(),
            self.parameter,
            self.estimator,
            timestamp,
            percentiles,
            self.confidence.unwrap_or(0.9),
            self.expertise,
        )
        .with_basis(self.basis_of_estimate)
        .with_assumptions(self.assumptions))
    }
}
