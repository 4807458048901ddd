//! Cost-benefit analysis of mitigation controls.
//!
//! - `benefit = ALE × effectiveness`
//! - `roi = benefit / cost`
//!
//! A cost that is zero, negative or non-finite cannot serve as an ROI
//! divisor and is rejected with [`QuantError::InvalidMitigationCost`]; no
//! operation here returns an infinite or NaN ROI. Portfolio totals still sum
//! such mitigations and leave them out of the mean ROI.

use crate::exposure::ExposureCalculator;
use quant_core::ids::{MitigationId, ScenarioId};
use quant_core::mitigation::RiskMitigation;
use quant_core::scenario::RiskScenario;
use quant_core::{QuantError, QuantResult};
use serde::Serialize;
use tracing::debug;

/// Cost-benefit figures of one mitigation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationAnalysis {
    /// Parent scenario
    pub scenario_id: ScenarioId,
    /// Mitigation identifier
    pub mitigation_id: MitigationId,
    /// Mitigation name
    pub name: String,
    /// Implementation cost
    pub cost: f64,
    /// Expected annual loss avoided
    pub benefit: f64,
    /// `benefit / cost`
    pub roi: f64,
    /// `benefit - cost`
    pub net_benefit: f64,
    /// Days of avoided loss needed to recover the cost; `None` without benefit
    pub payback_days: Option<f64>,
}

/// Portfolio-wide mitigation totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationTotals {
    /// Number of mitigations across all scenarios
    pub count: usize,
    /// Sum of costs
    pub total_cost: f64,
    /// Sum of benefits
    pub total_benefit: f64,
    /// Mean ROI over mitigations with a positive finite cost; `None` when
    /// there are none
    pub average_roi: Option<f64>,
    /// Mitigations counted in the sums but left out of `average_roi`
    pub excluded_from_roi: usize,
}

impl MitigationTotals {
    /// `total_benefit - total_cost`.
    pub fn net_benefit(&self) -> f64 {
        self.total_benefit - self.total_cost
    }
}

/// Mitigation cost-benefit analyser.
#[derive(Clone, Copy, Debug, Default)]
pub struct MitigationAnalyzer {
    exposure: ExposureCalculator,
}

impl MitigationAnalyzer {
    /// Analyser computing ALE with `exposure`.
    pub fn new(exposure: ExposureCalculator) -> Self {
        Self { exposure }
    }

    /// `ALE(scenario) × effectiveness`.
    pub fn benefit(
        &self,
        scenario: &RiskScenario,
        mitigation: &RiskMitigation,
    ) -> QuantResult<f64> {
        check_effectiveness(mitigation)?;
        Ok(self.exposure.annualized_loss_expectancy(scenario) * mitigation.effectiveness)
    }

    /// `benefit / cost`.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidMitigationCost`] when the cost is not a positive
    /// finite number, [`QuantError::InvalidEffectiveness`] when the
    /// effectiveness lies outside [0, 1].
    pub fn roi(&self, scenario: &RiskScenario, mitigation: &RiskMitigation) -> QuantResult<f64> {
        check_cost(mitigation)?;
        Ok(self.benefit(scenario, mitigation)? / mitigation.cost)
    }

    /// `benefit - cost`.
    pub fn net_benefit(
        &self,
        scenario: &RiskScenario,
        mitigation: &RiskMitigation,
    ) -> QuantResult<f64> {
        Ok(self.benefit(scenario, mitigation)? - mitigation.cost)
    }

    /// Full analysis of one mitigation.
    pub fn analyse_mitigation(
        &self,
        scenario: &RiskScenario,
        mitigation: &RiskMitigation,
    ) -> QuantResult<MitigationAnalysis> {
        check_cost(mitigation)?;
        let benefit = self.benefit(scenario, mitigation)?;
        let roi = benefit / mitigation.cost;
        Ok(MitigationAnalysis {
            scenario_id: scenario.id.clone(),
            mitigation_id: mitigation.id.clone(),
            name: mitigation.name.clone(),
            cost: mitigation.cost,
            benefit,
            roi,
            net_benefit: benefit - mitigation.cost,
            payback_days: (benefit > 0.0).then(|| mitigation.cost / benefit * 365.0),
        })
    }

    /// Analysis of every mitigation attached to `scenario`, in list order.
    pub fn analyse(&self, scenario: &RiskScenario) -> QuantResult<Vec<MitigationAnalysis>> {
        scenario
            .mitigations
            .iter()
            .map(|m| self.analyse_mitigation(scenario, m))
            .collect()
    }

    /// Expected loss avoided by all mitigations of `scenario`, summed.
    pub fn scenario_benefit(&self, scenario: &RiskScenario) -> QuantResult<f64> {
        scenario
            .mitigations
            .iter()
            .map(|m| self.benefit(scenario, m))
            .sum()
    }

    /// Cost, benefit and mean ROI across all mitigations of all scenarios.
    ///
    /// Every mitigation contributes to the cost and benefit sums. Those
    /// without a positive finite cost have no ROI; they are left out of the
    /// mean and counted in `excluded_from_roi`.
    ///
    /// # Errors
    ///
    /// [`QuantError::InvalidEffectiveness`] when an effectiveness lies
    /// outside [0, 1].
    pub fn portfolio_mitigation_totals(
        &self,
        scenarios: &[RiskScenario],
    ) -> QuantResult<MitigationTotals> {
        let mut totals = MitigationTotals::default();
        let mut roi_sum = 0.0;
        let mut roi_count = 0usize;
        for scenario in scenarios {
            for mitigation in &scenario.mitigations {
                let benefit = self.benefit(scenario, mitigation)?;
                totals.count += 1;
                totals.total_cost += mitigation.cost;
                totals.total_benefit += benefit;
                if check_cost(mitigation).is_ok() {
                    roi_sum += benefit / mitigation.cost;
                    roi_count += 1;
                } else {
                    totals.excluded_from_roi += 1;
                }
            }
        }
        totals.average_roi = (roi_count > 0).then(|| roi_sum / roi_count as f64);
        if totals.excluded_from_roi > 0 {
            debug!(
                excluded = totals.excluded_from_roi,
                "mitigations without a positive cost left out of mean ROI"
            );
        }
        Ok(totals)
    }
}

fn check_cost(mitigation: &RiskMitigation) -> QuantResult<()> {
    if mitigation.cost.is_finite() && mitigation.cost > 0.0 {
        Ok(())
    } else {
        Err(QuantError::InvalidMitigationCost {
            mitigation: mitigation.id.to_string(),
            cost: mitigation.cost,
        })
    }
}

fn check_effectiveness(mitigation: &RiskMitigation) -> QuantResult<()> {
    if (0.0..=1.0).contains(&mitigation.effectiveness) {
        Ok(())
    } else {
        Err(QuantError::InvalidEffectiveness {
            mitigation: mitigation.id.to_string(),
            effectiveness: mitigation.effectiveness,
        })
    }
}
