//! Deterministic recommendation text.

use super::approval::ApprovalTier;
use quant_core::config::SummaryConfig;

/// Portfolio facts the recommendation rules look at.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RecommendationInputs {
    /// Scenarios in the critical tier
    pub critical_count: usize,
    /// Scenarios in the high tier
    pub high_count: usize,
    /// Critical or high scenarios without any mitigation
    pub unmitigated_priority_count: usize,
    /// Total cost of all mitigations
    pub recommended_investment: f64,
    /// Portfolio ROI, if defined
    pub roi: Option<f64>,
    /// Total exposure
    pub total_exposure: f64,
    /// Sum of scenario ALEs
    pub total_ale: f64,
    /// Simulated probability of ruin, when a simulation was supplied
    pub probability_of_ruin: Option<f64>,
}

/// Recommendations in a fixed rule order.
///
/// Rules, in order:
/// 1. critical scenarios to address
/// 2. high scenarios needing mitigation plans
/// 3. investment at the portfolio ROI
/// 4. executive or board sign-off needed for that investment
/// 5. risk transfer when the probability of ruin exceeds the threshold
/// 6. cyber insurance when the summed ALE exceeds the transfer threshold
/// 7. total exposure above the risk appetite
/// 8. critical or high scenarios with no mitigation at all
///
/// Rule 6 looks at expected annual loss, not at `total_exposure`, so a
/// simulated VaR alone never triggers it.
///
/// When none applies a single steady-state line is returned.
pub fn generate_recommendations(
    inputs: &RecommendationInputs,
    config: &SummaryConfig,
) -> Vec<String> {
    let mut out = Vec::new();

    if inputs.critical_count > 0 {
        out.push(format!(
            "Address {} critical risk {} immediately",
            inputs.critical_count,
            plural(inputs.critical_count, "scenario", "scenarios")
        ));
    }
    if inputs.high_count > 0 {
        out.push(format!(
            "Develop mitigation plans for {} high-priority {}",
            inputs.high_count,
            plural(inputs.high_count, "scenario", "scenarios")
        ));
    }
    if let Some(roi) = inputs.roi {
        if inputs.recommended_investment > 0.0 {
            out.push(format!(
                "Invest {} in risk mitigation for an estimated {:.1}x return",
                format_amount(inputs.recommended_investment),
                roi
            ));
        }
    }
    match ApprovalTier::for_amount(inputs.recommended_investment, config) {
        ApprovalTier::Executive => out.push(format!(
            "Investment of {} requires executive approval",
            format_amount(inputs.recommended_investment)
        )),
        ApprovalTier::Board => out.push(format!(
            "Investment of {} requires board approval",
            format_amount(inputs.recommended_investment)
        )),
        ApprovalTier::AutoApprove | ApprovalTier::Management => {}
    }
    if let Some(ruin) = inputs.probability_of_ruin {
        if ruin > config.ruin_probability_threshold {
            out.push(format!(
                "Consider risk transfer: probability of ruin is {:.1}%, above {:.1}%",
                ruin * 100.0,
                config.ruin_probability_threshold * 100.0
            ));
        }
    }
    if inputs.total_ale > config.risk_transfer_exposure_threshold {
        out.push(format!(
            "Consider cyber insurance: annual loss expectancy of {} exceeds {}",
            format_amount(inputs.total_ale),
            format_amount(config.risk_transfer_exposure_threshold)
        ));
    }
    if inputs.total_exposure > config.risk_appetite {
        out.push(format!(
            "Total exposure of {} exceeds the risk appetite of {}",
            format_amount(inputs.total_exposure),
            format_amount(config.risk_appetite)
        ));
    }
    if inputs.unmitigated_priority_count > 0 {
        out.push(format!(
            "{} critical or high {} no mitigation controls",
            inputs.unmitigated_priority_count,
            plural(inputs.unmitigated_priority_count, "scenario has", "scenarios have")
        ));
    }

    if out.is_empty() {
        out.push("Risk portfolio is within appetite; continue regular monitoring".to_string());
    }
    out
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

/// Whole currency units with thousands separators, e.g. `$1,250,000`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0.0 && rounded > 0 { "-" } else { "" };
    format!("{}${}", sign, grouped)
}
