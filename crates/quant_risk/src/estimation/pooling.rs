//! Pooling of several experts' estimates of the same quantity.
//!
//! Every method pools the five anchors independently. All three are
//! monotone means, so pooling ordered estimates yields an ordered estimate.

use chrono::{DateTime, Utc};
use quant_core::estimate::{Expertise, HubbardEstimate, Percentiles};
use quant_core::ids::EstimateId;
use quant_core::{QuantError, QuantResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Floor applied to anchors before logarithmic pooling.
pub const LOG_POOLING_FLOOR: f64 = 0.01;

/// How anchors are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolingMethod {
    /// Arithmetic mean, equal weights
    #[default]
    Linear,
    /// Arithmetic mean weighted by expertise
    Weighted,
    /// Geometric mean of anchors floored at [`LOG_POOLING_FLOOR`]
    Logarithmic,
}

impl PoolingMethod {
    /// Snake-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Weighted => "weighted",
            Self::Logarithmic => "logarithmic",
        }
    }
}

impl fmt::Display for PoolingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "weighted" => Ok(Self::Weighted),
            "logarithmic" | "log" => Ok(Self::Logarithmic),
            _ => Err(format!("Invalid pooling method: {}", s)),
        }
    }
}

/// Weight of an estimator in weighted pooling.
pub fn expertise_weight(expertise: Expertise) -> f64 {
    match expertise {
        Expertise::Novice => 1.0,
        Expertise::Experienced => 2.0,
        Expertise::Expert => 2.5,
        Expertise::WorldClass => 3.0,
    }
}

/// Pool `estimates` into a new estimate stamped at `timestamp`.
///
/// A single estimate is returned unchanged. The pooled estimate takes the
/// first input's parameter, the mean confidence and the lowest expertise
/// among the inputs.
pub fn pool_estimates(
    estimates: &[HubbardEstimate],
    method: PoolingMethod,
    timestamp: DateTime<Utc>,
) -> QuantResult<HubbardEstimate> {
    let first = estimates.first().ok_or(QuantError::EmptyEstimatePool)?;
    if estimates.len() == 1 {
        return Ok(first.clone());
    }

    let percentiles = match method {
        PoolingMethod::Linear => weighted_mean(estimates, |_| 1.0),
        PoolingMethod::Weighted => weighted_mean(estimates, |e| expertise_weight(e.expertise())),
        PoolingMethod::Logarithmic => geometric_mean(estimates),
    };

    let n = estimates.len() as f64;
    let confidence = estimates.iter().map(|e| e.confidence()).sum::<f64>() / n;
    let expertise = estimates
        .iter()
        .map(|e| e.expertise())
        .min()
        .unwrap_or_default();

    Ok(HubbardEstimate::new(
        EstimateId::generate(),
        first.parameter(),
        "pooled",
        timestamp,
        percentiles,
        confidence,
        expertise,
    )
    .with_basis(format!(
        "{} pooling of {} estimates",
        method,
        estimates.len()
    )))
}

fn weighted_mean(
    estimates: &[HubbardEstimate],
    weight: impl Fn(&HubbardEstimate) -> f64,
) -> Percentiles {
    let total: f64 = estimates.iter().map(&weight).sum();
    let mut acc = [0.0; 5];
    for e in estimates {
        let w = weight(e) / total;
        for (slot, value) in acc.iter_mut().zip(e.percentiles().as_array()) {
            *slot += w * value;
        }
    }
    Percentiles::new(acc[0], acc[1], acc[2], acc[3], acc[4])
}

fn geometric_mean(estimates: &[HubbardEstimate]) -> Percentiles {
    let n = estimates.len() as f64;
    let mut acc = [0.0; 5];
    for e in estimates {
        for (slot, value) in acc.iter_mut().zip(e.percentiles().as_array()) {
            *slot += value.max(LOG_POOLING_FLOOR).ln();
        }
    }
    let [a, b, c, d, f] = acc.map(|s| (s / n).exp());
    Percentiles::new(a, b, c, d, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn estimate(p: Percentiles, expertise: Expertise) -> HubbardEstimate {
        HubbardEstimate::new(
            EstimateId::generate(),
            "breach_cost",
            "someone",
            ts(),
            p,
            0.9,
            expertise,
        )
    }

    #[test]
    fn test_empty_pool_fails() {
        assert_eq!(
            pool_estimates(&[], PoolingMethod::Linear, ts()).unwrap_err(),
            QuantError::EmptyEstimatePool
        );
    }

    #[test]
    fn test_single_estimate_returned_as_is() {
        let e = estimate(Percentiles::new(1.0, 2.0, 3.0, 4.0, 5.0), Expertise::Expert);
        let pooled =
            pool_estimates(std::slice::from_ref(&e), PoolingMethod::Weighted, ts()).unwrap();
        assert_eq!(pooled, e);
    }

    #[test]
    fn test_linear_pooling() {
        let a = estimate(Percentiles::new(10.0, 20.0, 30.0, 40.0, 50.0), Expertise::Novice);
        let b = estimate(Percentiles::new(30.0, 40.0, 50.0, 60.0, 70.0), Expertise::Expert);
        let pooled = pool_estimates(&[a, b], PoolingMethod::Linear, ts()).unwrap();

        assert_relative_eq!(pooled.percentiles().p10, 20.0);
        assert_relative_eq!(pooled.percentiles().p90, 60.0);
        assert_eq!(pooled.expertise(), Expertise::Novice);
        assert_eq!(pooled.parameter(), "breach_cost");
        assert_eq!(pooled.estimator(), "pooled");
    }

    #[test]
    fn test_weighted_pooling_favours_expertise() {
        let a = estimate(Percentiles::new(0.0, 0.0, 0.0, 0.0, 0.0), Expertise::Novice);
        let b = estimate(Percentiles::new(35.0, 35.0, 35.0, 35.0, 35.0), Expertise::WorldClass);
        let pooled = pool_estimates(&[a, b], PoolingMethod::Weighted, ts()).unwrap();

        // weights 1 and 3
        assert_relative_eq!(pooled.percentiles().p50, 35.0 * 3.0 / 4.0);
    }

    #[test]
    fn test_logarithmic_pooling_is_geometric_mean() {
        let a = estimate(Percentiles::new(1.0, 10.0, 100.0, 1_000.0, 10_000.0), Expertise::Expert);
        let b = estimate(
            Percentiles::new(100.0, 1_000.0, 10_000.0, 100_000.0, 1e6),
            Expertise::Expert,
        );
        let pooled = pool_estimates(&[a, b], PoolingMethod::Logarithmic, ts()).unwrap();

        assert_relative_eq!(pooled.percentiles().p10, 10.0, max_relative = 1e-12);
        assert_relative_eq!(pooled.percentiles().p50, 1_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_logarithmic_pooling_floors_non_positive() {
        let a = estimate(Percentiles::new(0.0, 1.0, 1.0, 1.0, 1.0), Expertise::Expert);
        let b = estimate(Percentiles::new(0.0, 1.0, 1.0, 1.0, 1.0), Expertise::Expert);
        let pooled = pool_estimates(&[a, b], PoolingMethod::Logarithmic, ts()).unwrap();
        assert_relative_eq!(pooled.percentiles().p10, LOG_POOLING_FLOOR, max_relative = 1e-12);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("weighted".parse::<PoolingMethod>(), Ok(PoolingMethod::Weighted));
        assert_eq!("LOG".parse::<PoolingMethod>(), Ok(PoolingMethod::Logarithmic));
        assert!("median".parse::<PoolingMethod>().is_err());
    }

    fn ordered() -> impl Strategy<Value = Percentiles> {
        (0.0f64..1e6, prop::array::uniform4(0.0f64..1e5)).prop_map(|(base, steps)| {
            let p30 = base + steps[0];
            let p50 = p30 + steps[1];
            let p70 = p50 + steps[2];
            Percentiles::new(base, p30, p50, p70, p70 + steps[3])
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_pooling_preserves_order(
            anchors in prop::collection::vec(ordered(), 2..6),
            method in prop_oneof![
                Just(PoolingMethod::Linear),
                Just(PoolingMethod::Weighted),
                Just(PoolingMethod::Logarithmic),
            ],
        ) {
            let estimates: Vec<_> = anchors
                .into_iter()
                .map(|p| estimate(p, Expertise::Experienced))
                .collect();
            let pooled = pool_estimates(&estimates, method, ts()).unwrap();
            // tolerate rounding between nearly equal anchors
            let a = pooled.percentiles().as_array();
            for w in a.windows(2) {
                prop_assert!(w[0] <= w[1] * (1.0 + 1e-12) + 1e-9);
            }
        }
    }
}
