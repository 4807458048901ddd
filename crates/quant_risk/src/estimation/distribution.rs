//! Parametric distributions implied by a 5-point estimate.
//!
//! The parameters are handed to an external simulator; nothing here samples.

use quant_core::estimate::HubbardEstimate;
use quant_core::{QuantError, QuantResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard normal quantile at 0.9, used to map P10/P90 onto ±z.
pub const Z_P90: f64 = 1.281_551_565_544_600_4;

/// Target family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    /// Beta-PERT on [p10, p90] with mode p50
    #[default]
    BetaPert,
    /// Lognormal with median p50
    Lognormal,
    /// Triangular on [p10, p90] with mode p50
    Triangular,
}

impl FromStr for DistributionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "beta_pert" | "pert" => Ok(Self::BetaPert),
            "lognormal" => Ok(Self::Lognormal),
            "triangular" => Ok(Self::Triangular),
            _ => Err(format!("Invalid distribution: {}", s)),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BetaPert => "beta_pert",
            Self::Lognormal => "lognormal",
            Self::Triangular => "triangular",
        };
        f.write_str(s)
    }
}

/// Fitted distribution parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum FittedDistribution {
    /// Beta-PERT
    BetaPert {
        /// Lower bound (p10)
        lower: f64,
        /// Mode (p50)
        mode: f64,
        /// Upper bound (p90)
        upper: f64,
        /// First shape parameter
        alpha: f64,
        /// Second shape parameter
        beta: f64,
    },
    /// Lognormal
    Lognormal {
        /// Mean of the underlying normal
        mu: f64,
        /// Standard deviation of the underlying normal
        sigma: f64,
    },
    /// Triangular
    Triangular {
        /// Lower bound (p10)
        lower: f64,
        /// Mode (p50)
        mode: f64,
        /// Upper bound (p90)
        upper: f64,
    },
}

impl FittedDistribution {
    /// Mean of the distribution.
    pub fn mean(&self) -> f64 {
        match *self {
            Self::BetaPert {
                lower, mode, upper, ..
            } => (lower + 4.0 * mode + upper) / 6.0,
            Self::Lognormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
            Self::Triangular { lower, mode, upper } => (lower + mode + upper) / 3.0,
        }
    }

    /// Variance of the distribution.
    pub fn variance(&self) -> f64 {
        match *self {
            Self::BetaPert { lower, upper, .. } => {
                let mean = self.mean();
                (mean - lower) * (upper - mean) / 7.0
            }
            Self::Lognormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
            Self::Triangular { lower, mode, upper } => {
                (lower * lower + mode * mode + upper * upper
                    - lower * mode
                    - lower * upper
                    - mode * upper)
                    / 18.0
            }
        }
    }
}

/// Map an estimate onto `kind`.
///
/// # Errors
///
/// - [`QuantError::InvalidRangeOrder`] if the anchors are not ordered
/// - [`QuantError::InvalidDistributionInput`] if `p90 == p10` or, for the
///   lognormal, if `p10` is not positive
pub fn fit_distribution(
    estimate: &HubbardEstimate,
    kind: DistributionKind,
) -> QuantResult<FittedDistribution> {
    let p = estimate.percentiles();
    if !p.is_ordered() {
        return Err(p.order_error());
    }
    if p.range_width() <= 0.0 {
        return Err(QuantError::InvalidDistributionInput(
            "p10 and p90 coincide".to_string(),
        ));
    }

    let (lower, mode, upper) = (p.p10, p.p50, p.p90);
    match kind {
        DistributionKind::BetaPert => {
            let range = upper - lower;
            Ok(FittedDistribution::BetaPert {
                lower,
                mode,
                upper,
                alpha: 1.0 + 4.0 * (mode - lower) / range,
                beta: 1.0 + 4.0 * (upper - mode) / range,
            })
        }
        DistributionKind::Lognormal => {
            if lower <= 0.0 {
                return Err(QuantError::InvalidDistributionInput(format!(
                    "lognormal needs positive anchors, p10 = {}",
                    lower
                )));
            }
            Ok(FittedDistribution::Lognormal {
                mu: mode.ln(),
                sigma: (upper / lower).ln() / (2.0 * Z_P90),
            })
        }
        DistributionKind::Triangular => Ok(FittedDistribution::Triangular { lower, mode, upper }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use quant_core::estimate::{Expertise, Percentiles};
    use quant_core::ids::EstimateId;

    fn estimate(p: Percentiles) -> HubbardEstimate {
        HubbardEstimate::new(
            EstimateId::new("e1"),
            "loss",
            "tester",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            p,
            0.9,
            Expertise::Expert,
        )
    }

    #[test]
    fn test_beta_pert_symmetric() {
        let e = estimate(Percentiles::new(100_000.0, 300_000.0, 500_000.0, 700_000.0, 900_000.0));
        let fitted = fit_distribution(&e, DistributionKind::BetaPert).unwrap();

        match fitted {
            FittedDistribution::BetaPert { alpha, beta, .. } => {
                assert_relative_eq!(alpha, 3.0);
                assert_relative_eq!(beta, 3.0);
            }
            other => panic!("Expected Beta-PERT, got {:?}", other),
        }
        assert_relative_eq!(fitted.mean(), 500_000.0);
    }

    #[test]
    fn test_lognormal_parameters() {
        // log-symmetric around 100 with p90/p10 = 100
        let e = estimate(Percentiles::new(10.0, 50.0, 100.0, 300.0, 1_000.0));
        let fitted = fit_distribution(&e, DistributionKind::Lognormal).unwrap();

        match fitted {
            FittedDistribution::Lognormal { mu, sigma } => {
                assert_relative_eq!(mu, 100f64.ln());
                assert_relative_eq!(sigma, 100f64.ln() / (2.0 * Z_P90));
            }
            other => panic!("Expected lognormal, got {:?}", other),
        }
        assert!(fitted.mean() > 100.0);
    }

    #[test]
    fn test_lognormal_rejects_non_positive() {
        let e = estimate(Percentiles::new(0.0, 1.0, 2.0, 3.0, 4.0));
        assert!(matches!(
            fit_distribution(&e, DistributionKind::Lognormal),
            Err(QuantError::InvalidDistributionInput(_))
        ));
    }

    #[test]
    fn test_triangular_moments() {
        let e = estimate(Percentiles::new(0.0, 1.0, 3.0, 5.0, 6.0));
        let fitted = fit_distribution(&e, DistributionKind::Triangular).unwrap();
        assert_relative_eq!(fitted.mean(), 3.0);
        // (0 + 9 + 36 - 0 - 0 - 18) / 18
        assert_relative_eq!(fitted.variance(), 1.5);
    }

    #[test]
    fn test_rejects_unordered_and_degenerate() {
        let unordered = estimate(Percentiles::new(5.0, 4.0, 3.0, 2.0, 1.0));
        assert!(matches!(
            fit_distribution(&unordered, DistributionKind::Triangular),
            Err(QuantError::InvalidRangeOrder { .. })
        ));

        let flat = estimate(Percentiles::new(2.0, 2.0, 2.0, 2.0, 2.0));
        assert!(matches!(
            fit_distribution(&flat, DistributionKind::BetaPert),
            Err(QuantError::InvalidDistributionInput(_))
        ));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("beta-pert".parse::<DistributionKind>(), Ok(DistributionKind::BetaPert));
        assert_eq!("Lognormal".parse::<DistributionKind>(), Ok(DistributionKind::Lognormal));
        assert!("gamma".parse::<DistributionKind>().is_err());
    }
}
