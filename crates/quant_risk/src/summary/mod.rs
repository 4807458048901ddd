//! Executive summary composition.
//!
//! [`ExecutiveSummaryBuilder`] combines exposure and mitigation analysis
//! into the board report.
//!
//! # Two mitigation figures
//!
//! `mitigated_exposure` applies a flat factor (0.6 by default, i.e. an
//! assumed 40% reduction) to total exposure regardless of the controls
//! actually attached. `modelled_risk_reduction` sums the per-mitigation
//! benefits (`ALE × effectiveness`). Both are reported; a warning is logged
//! when they disagree by more than half of the flat reduction.

mod approval;
mod recommendations;
mod report;

pub use approval::ApprovalTier;
pub use recommendations::{format_amount, generate_recommendations, RecommendationInputs};
pub use report::{ExecutiveReport, ExecutiveSummary, RankedScenario, ReportScenario};

use crate::exposure::{ExposureBasis, ExposureCalculator, PriorityTier};
use crate::mitigation::MitigationAnalyzer;
use quant_core::clock::{Clock, SystemClock};
use quant_core::config::{QuantConfig, SummaryConfig};
use quant_core::monte_carlo::MonteCarloResult;
use quant_core::scenario::RiskScenario;
use quant_core::QuantResult;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Relative disagreement between the flat and modelled reductions that is
/// logged as a warning.
pub const REDUCTION_DIVERGENCE_WARNING: f64 = 0.5;

/// Builder for [`ExecutiveReport`].
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use quant_core::{RiskScenario, ScenarioId};
/// use quant_risk::summary::ExecutiveSummaryBuilder;
///
/// let scenario = RiskScenario::new(ScenarioId::new("s1"), "Ransomware", Utc::now())
///     .with_annual_probability(0.2)
///     .with_financial_impact(100_000.0, 500_000.0, 2_000_000.0);
///
/// let report = ExecutiveSummaryBuilder::new()
///     .organization_name("Acme Corp")
///     .period("Q1 2024")
///     .build(&[scenario])
///     .unwrap();
///
/// assert_eq!(report.executive_summary.total_exposure, 400_000.0);
/// assert_eq!(report.executive_summary.roi, None);
/// ```
#[derive(Clone)]
pub struct ExecutiveSummaryBuilder {
    organization_name: String,
    report_type: String,
    period: String,
    monte_carlo: Option<MonteCarloResult>,
    exposure: ExposureCalculator,
    mitigation: MitigationAnalyzer,
    config: SummaryConfig,
    clock: Arc<dyn Clock>,
}

impl Default for ExecutiveSummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutiveSummaryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutiveSummaryBuilder")
            .field("organization_name", &self.organization_name)
            .field("report_type", &self.report_type)
            .field("period", &self.period)
            .field("monte_carlo", &self.monte_carlo)
            .field("config", &self.config)
            .finish()
    }
}

impl ExecutiveSummaryBuilder {
    /// Builder with default configuration.
    pub fn new() -> Self {
        Self::from_config(&QuantConfig::default())
    }

    /// Builder using the priority and summary sections of `config`.
    pub fn from_config(config: &QuantConfig) -> Self {
        let exposure = ExposureCalculator::new(config.priority);
        Self {
            organization_name: String::new(),
            report_type: "executive".to_string(),
            period: String::new(),
            monte_carlo: None,
            exposure,
            mitigation: MitigationAnalyzer::new(exposure),
            config: config.summary,
            clock: Arc::new(SystemClock),
        }
    }

    /// Organisation the report is for.
    pub fn organization_name(mut self, name: impl Into<String>) -> Self {
        self.organization_name = name.into();
        self
    }

    /// Report type label.
    pub fn report_type(mut self, report_type: impl Into<String>) -> Self {
        self.report_type = report_type.into();
        self
    }

    /// Reporting period label.
    pub fn period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    /// External simulation to prefer over the closed-form fallbacks.
    pub fn monte_carlo(mut self, result: Option<MonteCarloResult>) -> Self {
        self.monte_carlo = result;
        self
    }

    /// Clock stamping `generated_at`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Headline figures only.
    ///
    /// # Errors
    ///
    /// [`quant_core::QuantError::InvalidEffectiveness`] when a mitigation's
    /// effectiveness lies outside [0, 1].
    pub fn summarise(&self, scenarios: &[RiskScenario]) -> QuantResult<ExecutiveSummary> {
        let (total_exposure, exposure_basis, var99) = match &self.monte_carlo {
            Some(mc) => (
                mc.risk_metrics.var95,
                ExposureBasis::MonteCarloVar95,
                Some(mc.risk_metrics.var99),
            ),
            None => (
                scenarios
                    .iter()
                    .map(|s| s.probability.annual * s.impact.financial.max)
                    .sum::<f64>(),
                ExposureBasis::MaxLossSum,
                None,
            ),
        };

        let mitigated_exposure = total_exposure * self.config.mitigated_exposure_factor;
        let risk_reduction = total_exposure - mitigated_exposure;
        let recommended_investment: f64 = scenarios.iter().map(|s| s.mitigation_cost()).sum();
        let roi = (recommended_investment > 0.0).then(|| risk_reduction / recommended_investment);

        let modelled_risk_reduction = scenarios
            .iter()
            .map(|s| self.mitigation.scenario_benefit(s))
            .sum::<QuantResult<f64>>()?;
        if risk_reduction > 0.0
            && (modelled_risk_reduction - risk_reduction).abs()
                > REDUCTION_DIVERGENCE_WARNING * risk_reduction
        {
            warn!(
                flat = risk_reduction,
                modelled = modelled_risk_reduction,
                "flat mitigation assumption diverges from per-mitigation analysis"
            );
        }

        let ranked_scenarios = self.rank(scenarios);
        let annualized_loss_expectancy = ranked_scenarios
            .iter()
            .map(|r| r.annualized_loss)
            .sum::<f64>();
        let maximum_probable_loss = scenarios
            .iter()
            .map(|s| s.impact.financial.max)
            .sum::<f64>();
        let count_tier = |tier: PriorityTier| {
            ranked_scenarios
                .iter()
                .filter(|r| r.priority == tier)
                .count()
        };

        Ok(ExecutiveSummary {
            total_exposure,
            exposure_basis,
            var99,
            annualized_loss_expectancy,
            maximum_probable_loss,
            mitigated_exposure,
            risk_reduction,
            modelled_risk_reduction,
            recommended_investment,
            roi,
            approval_tier: ApprovalTier::for_amount(recommended_investment, &self.config),
            scenario_count: scenarios.len(),
            critical_count: count_tier(PriorityTier::Critical),
            high_count: count_tier(PriorityTier::High),
            ranked_scenarios,
        })
    }

    /// Complete report.
    pub fn build(&self, scenarios: &[RiskScenario]) -> QuantResult<ExecutiveReport> {
        let summary = self.summarise(scenarios)?;

        let unmitigated_priority_count = summary
            .ranked_scenarios
            .iter()
            .filter(|r| r.priority >= PriorityTier::High && r.mitigations == 0)
            .count();
        let recommendations = generate_recommendations(
            &RecommendationInputs {
                critical_count: summary.critical_count,
                high_count: summary.high_count,
                unmitigated_priority_count,
                recommended_investment: summary.recommended_investment,
                roi: summary.roi,
                total_exposure: summary.total_exposure,
                total_ale: summary.annualized_loss_expectancy,
                probability_of_ruin: self
                    .monte_carlo
                    .as_ref()
                    .map(|mc| mc.risk_metrics.probability_of_ruin),
            },
            &self.config,
        );

        let report_scenarios = scenarios
            .iter()
            .map(|s| ReportScenario {
                name: s.name.clone(),
                category: s.category,
                probability: s.probability,
                impact: s.impact.clone(),
                annualized_loss: self.exposure.annualized_loss_expectancy(s),
                mitigations: s.mitigations.len(),
            })
            .collect();

        info!(
            organization = %self.organization_name,
            scenarios = summary.scenario_count,
            total_exposure = summary.total_exposure,
            basis = %summary.exposure_basis,
            critical = summary.critical_count,
            "built executive summary"
        );

        Ok(ExecutiveReport {
            organization_name: self.organization_name.clone(),
            report_type: self.report_type.clone(),
            period: self.period.clone(),
            generated_at: self.clock.now(),
            executive_summary: summary,
            scenarios: report_scenarios,
            simulation_results: self.monte_carlo,
            recommendations,
        })
    }

    fn rank(&self, scenarios: &[RiskScenario]) -> Vec<RankedScenario> {
        let mut rows: Vec<_> = scenarios
            .iter()
            .map(|s| {
                let exposure = self.exposure.assess(s);
                RankedScenario {
                    rank: 0,
                    id: exposure.id,
                    name: exposure.name,
                    category: s.category,
                    annualized_loss: exposure.ale,
                    priority: exposure.priority,
                    mitigations: s.mitigations.len(),
                    mitigation_cost: s.mitigation_cost(),
                }
            })
            .collect();
        // stable: equal exposures keep catalogue order
        rows.sort_by(|a, b| b.annualized_loss.total_cmp(&a.annualized_loss));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = i + 1;
        }
        rows
    }
}
