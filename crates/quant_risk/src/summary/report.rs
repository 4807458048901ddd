//! Executive report record handed to exporters.
//!
//! Serialises to the flat camelCase JSON shape the export layer expects:
//!
//! ```text
//! { organizationName, reportType, period, generatedAt, executiveSummary,
//!   scenarios: [{ name, category, probability, impact, annualizedLoss, mitigations }],
//!   simulationResults?, recommendations }
//! ```

use super::approval::ApprovalTier;
use crate::exposure::{ExposureBasis, PriorityTier};
use chrono::{DateTime, Utc};
use quant_core::ids::ScenarioId;
use quant_core::monte_carlo::MonteCarloResult;
use quant_core::scenario::{Impact, Probability, RiskCategory};
use serde::Serialize;

/// One row of the exposure ranking.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedScenario {
    /// 1-based position, highest exposure first
    pub rank: usize,
    /// Scenario identifier
    pub id: ScenarioId,
    /// Scenario name
    pub name: String,
    /// Risk category
    pub category: RiskCategory,
    /// Annualised loss expectancy
    pub annualized_loss: f64,
    /// Tier of the ALE
    pub priority: PriorityTier,
    /// Number of attached mitigations
    pub mitigations: usize,
    /// Total cost of attached mitigations
    pub mitigation_cost: f64,
}

/// Portfolio headline figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    /// VaR95 when simulated, otherwise `Σ annual × max`
    pub total_exposure: f64,
    /// Provenance of `total_exposure`
    pub exposure_basis: ExposureBasis,
    /// VaR99 when simulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var99: Option<f64>,
    /// `Σ annual × likely` over all scenarios
    pub annualized_loss_expectancy: f64,
    /// `Σ impact.financial.max`; every scenario at its worst case at once
    pub maximum_probable_loss: f64,
    /// `total_exposure × mitigated_exposure_factor` (flat assumption)
    pub mitigated_exposure: f64,
    /// `total_exposure - mitigated_exposure`
    pub risk_reduction: f64,
    /// Sum of per-mitigation benefits (`ALE × effectiveness`)
    pub modelled_risk_reduction: f64,
    /// Sum of all mitigation costs
    pub recommended_investment: f64,
    /// `risk_reduction / recommended_investment`; `None` without investment
    pub roi: Option<f64>,
    /// Sign-off needed for `recommended_investment`
    pub approval_tier: ApprovalTier,
    /// Number of scenarios
    pub scenario_count: usize,
    /// Scenarios in the critical tier
    pub critical_count: usize,
    /// Scenarios in the high tier
    pub high_count: usize,
    /// Scenarios by ALE, descending
    pub ranked_scenarios: Vec<RankedScenario>,
}

/// Scenario row of the report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportScenario {
    /// Scenario name
    pub name: String,
    /// Risk category
    pub category: RiskCategory,
    /// Probability block
    pub probability: Probability,
    /// Impact block
    pub impact: Impact,
    /// Annualised loss expectancy
    pub annualized_loss: f64,
    /// Number of attached mitigations
    pub mitigations: usize,
}

/// Board report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveReport {
    /// Organisation the report is for
    pub organization_name: String,
    /// Report type label
    pub report_type: String,
    /// Reporting period label
    pub period: String,
    /// Build instant
    pub generated_at: DateTime<Utc>,
    /// Headline figures
    pub executive_summary: ExecutiveSummary,
    /// Scenarios in catalogue order
    pub scenarios: Vec<ReportScenario>,
    /// External simulation, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation_results: Option<MonteCarloResult>,
    /// Recommendation lines
    pub recommendations: Vec<String>,
}

impl ExecutiveReport {
    /// Pretty JSON rendering.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
