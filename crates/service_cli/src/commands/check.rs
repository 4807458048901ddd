//! Check command implementation
//!
//! Validates the effective configuration and prints the thresholds in use.

use quant_core::Expertise;
use quant_risk::store::TemplateLibrary;
use std::io::{self, Write};
use tracing::info;

use crate::config::CliConfig;
use crate::Result;

/// Run the check command
pub fn run(config: &CliConfig) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;

    let mut out = io::stdout().lock();
    describe(config, &mut out)?;
    out.flush()?;

    info!("Configuration OK");
    Ok(())
}

fn describe<W: Write>(config: &CliConfig, out: &mut W) -> Result<()> {
    let q = &config.quant;
    match &config.source {
        Some(path) => writeln!(out, "Config file:        {}", path.display())?,
        None => writeln!(out, "Config file:        (defaults)")?,
    }
    writeln!(out, "Log level:          {}", config.log_level)?;
    writeln!(out)?;
    writeln!(out, "[priority]")?;
    writeln!(out, "  critical > {}", q.priority.critical)?;
    writeln!(out, "  high     > {}", q.priority.high)?;
    writeln!(out, "  medium   > {}", q.priority.medium)?;
    writeln!(out, "[summary]")?;
    writeln!(
        out,
        "  mitigated exposure factor  {}",
        q.summary.mitigated_exposure_factor
    )?;
    writeln!(
        out,
        "  ruin probability threshold {}",
        q.summary.ruin_probability_threshold
    )?;
    writeln!(
        out,
        "  risk transfer threshold    {}",
        q.summary.risk_transfer_exposure_threshold
    )?;
    writeln!(out, "  risk appetite              {}", q.summary.risk_appetite)?;
    writeln!(
        out,
        "  approval tiers             auto < {}, executive > {}, board > {}",
        q.summary.auto_approve_under,
        q.summary.executive_approval_over,
        q.summary.board_approval_over
    )?;
    writeln!(out, "[estimation]")?;
    writeln!(
        out,
        "  symmetry tolerance         {}",
        q.estimation.symmetry_tolerance
    )?;
    for expertise in Expertise::all() {
        writeln!(
            out,
            "  min relative width {:<12} {}",
            expertise.as_str(),
            q.estimation.min_relative_width(expertise)
        )?;
    }
    writeln!(out, "[calibration]")?;
    writeln!(
        out,
        "  confidence level           {}",
        q.calibration.confidence_level
    )?;
    writeln!(
        out,
        "  adjustment trigger rate    {}",
        q.calibration.adjustment_trigger_rate
    )?;
    writeln!(
        out,
        "  underconfidence trigger    {}",
        q.calibration.underconfidence_trigger_rate
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Templates available: {}",
        TemplateLibrary::builtin().templates().len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defaults() {
        let mut buf = Vec::new();
        describe(&CliConfig::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("(defaults)"));
        assert!(text.contains("critical > 1000000"));
        assert!(text.contains("world_class"));
        assert!(text.contains("auto < 50000, executive > 1000000, board > 5000000"));
        assert!(text.contains("underconfidence trigger    0.3"));
    }
}
