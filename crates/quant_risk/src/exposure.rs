//! Annualised loss expectancy and priority tiers.
//!
//! `ALE = probability.annual × impact.financial.likely` is the canonical
//! per-scenario exposure whenever no simulation result is available.
//! Priority tiers use strict `>` comparisons against
//! [`PriorityThresholds`], so an ALE exactly on a threshold falls in the
//! lower tier.

use quant_core::config::PriorityThresholds;
use quant_core::ids::ScenarioId;
use quant_core::monte_carlo::MonteCarloResult;
use quant_core::scenario::RiskScenario;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority tier of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// ALE at or below the medium threshold
    Low,
    /// ALE above the medium threshold
    Medium,
    /// ALE above the high threshold
    High,
    /// ALE above the critical threshold
    Critical,
}

impl PriorityTier {
    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exposure figures of one scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioExposure {
    /// Scenario identifier
    pub id: ScenarioId,
    /// Scenario name
    pub name: String,
    /// Annualised loss expectancy
    pub ale: f64,
    /// Tier of `ale`
    pub priority: PriorityTier,
}

/// Where a portfolio exposure figure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureBasis {
    /// VaR95 of an external simulation
    MonteCarloVar95,
    /// Sum of scenario ALEs; an approximation, not a VaR
    AleSum,
    /// Sum of `annual × max` per scenario; a conservative bound, not a VaR
    MaxLossSum,
}

impl fmt::Display for ExposureBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MonteCarloVar95 => "monte_carlo_var95",
            Self::AleSum => "ale_sum",
            Self::MaxLossSum => "max_loss_sum",
        };
        f.write_str(s)
    }
}

/// Portfolio-level exposure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioExposure {
    /// Exposure figure
    pub value: f64,
    /// Provenance of `value`
    pub basis: ExposureBasis,
    /// VaR99 when a simulation was supplied
    pub var99: Option<f64>,
}

impl PortfolioExposure {
    /// Whether `value` may be presented as a Value-at-Risk.
    pub fn is_var(&self) -> bool {
        self.basis == ExposureBasis::MonteCarloVar95
    }
}

/// Per-scenario and portfolio exposure.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExposureCalculator {
    thresholds: PriorityThresholds,
}

impl ExposureCalculator {
    /// Calculator with the given tier thresholds.
    pub fn new(thresholds: PriorityThresholds) -> Self {
        Self { thresholds }
    }

    /// Tier thresholds in use.
    pub fn thresholds(&self) -> &PriorityThresholds {
        &self.thresholds
    }

    /// `probability.annual × impact.financial.likely`.
    #[inline]
    pub fn annualized_loss_expectancy(&self, scenario: &RiskScenario) -> f64 {
        scenario.probability.annual * scenario.impact.financial.likely
    }

    /// Tier of an ALE figure.
    pub fn tier(&self, ale: f64) -> PriorityTier {
        if ale > self.thresholds.critical {
            PriorityTier::Critical
        } else if ale > self.thresholds.high {
            PriorityTier::High
        } else if ale > self.thresholds.medium {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }

    /// Tier of a scenario.
    pub fn priority(&self, scenario: &RiskScenario) -> PriorityTier {
        self.tier(self.annualized_loss_expectancy(scenario))
    }

    /// ALE and tier of a scenario.
    pub fn assess(&self, scenario: &RiskScenario) -> ScenarioExposure {
        let ale = self.annualized_loss_expectancy(scenario);
        ScenarioExposure {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            ale,
            priority: self.tier(ale),
        }
    }

    /// Portfolio exposure: the simulation's VaR95 when supplied, otherwise
    /// the sum of ALEs.
    pub fn portfolio_exposure(
        &self,
        scenarios: &[RiskScenario],
        monte_carlo: Option<&MonteCarloResult>,
    ) -> PortfolioExposure {
        match monte_carlo {
            Some(mc) => PortfolioExposure {
                value: mc.risk_metrics.var95,
                basis: ExposureBasis::MonteCarloVar95,
                var99: Some(mc.risk_metrics.var99),
            },
            None => PortfolioExposure {
                value: scenarios
                    .iter()
                    .map(|s| self.annualized_loss_expectancy(s))
                    .sum(),
                basis: ExposureBasis::AleSum,
                var99: None,
            },
        }
    }
}
