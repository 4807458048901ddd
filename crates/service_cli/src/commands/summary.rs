//! Summary command implementation
//!
//! Builds the executive report for a scenario catalogue using the
//! quant_risk summary builder.

use quant_core::{MonteCarloResult, QuantConfig, RiskScenario};
use quant_risk::summary::{format_amount, ExecutiveReport, ExecutiveSummaryBuilder};
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::{open_output, read_json, OutputFormat};
use crate::Result;

/// Report labels supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ReportLabels {
    pub organization: String,
    pub report_type: String,
    pub period: String,
}

/// Run the summary command
pub fn run(
    config: &QuantConfig,
    scenarios: &Path,
    monte_carlo: Option<&Path>,
    labels: &ReportLabels,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    info!("Building executive summary...");
    info!("  Scenarios: {}", scenarios.display());
    info!("  Output format: {:?}", format);

    let catalogue: Vec<RiskScenario> = read_json(scenarios)?;
    let simulation: Option<MonteCarloResult> = match monte_carlo {
        Some(path) => {
            info!("  Monte Carlo result: {}", path.display());
            Some(read_json(path)?)
        }
        None => None,
    };

    let report = ExecutiveSummaryBuilder::from_config(config)
        .organization_name(labels.organization.as_str())
        .report_type(labels.report_type.as_str())
        .period(labels.period.as_str())
        .monte_carlo(simulation)
        .build(&catalogue)?;

    let mut out = open_output(output)?;
    write_report(&report, format, &mut out)?;
    out.flush()?;

    info!("Summary complete");
    Ok(())
}

/// Render a report in the requested format
pub fn write_report<W: Write>(
    report: &ExecutiveReport,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", report.to_json_pretty()?)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in &report.executive_summary.ranked_scenarios {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => write_table(report, out)?,
    }
    Ok(())
}

fn write_table<W: Write>(report: &ExecutiveReport, out: &mut W) -> Result<()> {
    let s = &report.executive_summary;
    let title = if report.organization_name.is_empty() {
        report.report_type.clone()
    } else {
        format!("{} ({})", report.organization_name, report.report_type)
    };

    writeln!(out, "{}", title)?;
    if !report.period.is_empty() {
        writeln!(out, "Period: {}", report.period)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Total exposure:       {} [{}]",
        format_amount(s.total_exposure),
        s.exposure_basis
    )?;
    if let Some(var99) = s.var99 {
        writeln!(out, "VaR 99%:              {}", format_amount(var99))?;
    }
    writeln!(
        out,
        "Annual loss (ALE):    {}",
        format_amount(s.annualized_loss_expectancy)
    )?;
    writeln!(
        out,
        "Max probable loss:    {}",
        format_amount(s.maximum_probable_loss)
    )?;
    writeln!(out, "Mitigated exposure:   {}", format_amount(s.mitigated_exposure))?;
    writeln!(out, "Risk reduction:       {}", format_amount(s.risk_reduction))?;
    writeln!(
        out,
        "Modelled reduction:   {}",
        format_amount(s.modelled_risk_reduction)
    )?;
    writeln!(
        out,
        "Investment:           {}",
        format_amount(s.recommended_investment)
    )?;
    match s.roi {
        Some(roi) => writeln!(out, "ROI:                  {:.2}x", roi)?,
        None => writeln!(out, "ROI:                  n/a")?,
    }
    writeln!(out, "Approval:             {}", s.approval_tier)?;
    writeln!(out)?;

    writeln!(out, "┌──────┬────────────────────────────────┬──────────┬─────────────────┐")?;
    writeln!(out, "│ Rank │ Scenario                       │ Priority │ ALE             │")?;
    writeln!(out, "├──────┼────────────────────────────────┼──────────┼─────────────────┤")?;
    if s.ranked_scenarios.is_empty() {
        writeln!(out, "│      │ (no scenarios)                 │          │                 │")?;
    }
    for row in &s.ranked_scenarios {
        writeln!(
            out,
            "│ {:>4} │ {:<30} │ {:<8} │ {:>15} │",
            row.rank,
            truncate(&row.name, 30),
            row.priority.as_str(),
            format_amount(row.annualized_loss)
        )?;
    }
    writeln!(out, "└──────┴────────────────────────────────┴──────────┴─────────────────┘")?;

    writeln!(out)?;
    writeln!(out, "Recommendations:")?;
    for line in &report.recommendations {
        writeln!(out, "  - {}", line)?;
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quant_core::ScenarioId;

    fn report() -> ExecutiveReport {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let scenarios = vec![
            RiskScenario::new(ScenarioId::new("a"), "Ransomware", now)
                .with_annual_probability(0.3)
                .with_financial_impact(100_000.0, 1_000_000.0, 4_000_000.0),
            RiskScenario::new(ScenarioId::new("b"), "Vendor outage", now),
        ];
        ExecutiveSummaryBuilder::new()
            .organization_name("Acme")
            .build(&scenarios)
            .unwrap()
    }

    #[test]
    fn test_csv_has_header_and_ranked_rows() {
        let mut buf = Vec::new();
        write_report(&report(), OutputFormat::Csv, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,id,name,category,annualizedLoss,priority"));
        assert!(lines[1].starts_with("1,a,Ransomware"));
    }

    #[test]
    fn test_json_round_trips_as_value() {
        let mut buf = Vec::new();
        write_report(&report(), OutputFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["organizationName"], "Acme");
        assert_eq!(value["scenarios"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_table_lists_recommendations() {
        let mut buf = Vec::new();
        write_report(&report(), OutputFormat::Table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Ransomware"));
        assert!(text.contains("Recommendations:"));
        assert!(text.contains("ROI:                  n/a"));
        assert!(text.contains("Max probable loss:"));
        assert!(text.contains("Approval:             auto_approve"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
