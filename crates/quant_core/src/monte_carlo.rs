//! Hand-off record from an external Monte Carlo simulator.
//!
//! The quantification core never samples distributions itself; when a
//! simulator has already run, its summary is passed in and preferred over
//! the closed-form fallbacks.

use serde::{Deserialize, Serialize};

/// Moments of the simulated annual loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStatistics {
    /// Mean annual loss
    pub mean: f64,
    /// Median annual loss
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    /// Standard deviation of annual loss
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

/// Tail metrics of the simulated annual loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// 95% Value-at-Risk
    pub var95: f64,
    /// 99% Value-at-Risk
    pub var99: f64,
    /// Probability that losses exhaust the organisation's capacity
    pub probability_of_ruin: f64,
}

/// Confidence interval around the mean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

/// Summary of an external simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    /// Loss moments
    pub statistics: SimulationStatistics,
    /// Tail metrics
    pub risk_metrics: RiskMetrics,
    /// Interval around the mean
    #[serde(default)]
    pub confidence_interval: ConfidenceInterval,
}

impl MonteCarloResult {
    /// Minimal result carrying only the figures the core consumes.
    pub fn new(mean: f64, var95: f64, var99: f64, probability_of_ruin: f64) -> Self {
        Self {
            statistics: SimulationStatistics {
                mean,
                ..SimulationStatistics::default()
            },
            risk_metrics: RiskMetrics {
                var95,
                var99,
                probability_of_ruin,
            },
            confidence_interval: ConfidenceInterval::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialise_external_shape() {
        let json = r#"{
            "statistics": {"mean": 1200000.0, "stdDev": 300000.0},
            "riskMetrics": {"var95": 2500000.0, "var99": 4000000.0, "probabilityOfRuin": 0.02},
            "confidenceInterval": {"lower": 1100000.0, "upper": 1300000.0}
        }"#;
        let mc: MonteCarloResult = serde_json::from_str(json).unwrap();
        assert_eq!(mc.risk_metrics.var95, 2_500_000.0);
        assert_eq!(mc.risk_metrics.probability_of_ruin, 0.02);
        assert_eq!(mc.statistics.std_dev, Some(300_000.0));
        assert_eq!(mc.statistics.median, None);
    }

    #[test]
    fn test_new_fills_metrics() {
        let mc = MonteCarloResult::new(1.0, 2.0, 3.0, 0.0);
        assert_eq!(mc.statistics.mean, 1.0);
        assert_eq!(mc.risk_metrics.var99, 3.0);
    }
}
