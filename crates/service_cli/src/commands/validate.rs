//! Validate command implementation
//!
//! Checks a Hubbard 5-point estimate and optionally fits a distribution to it.

use chrono::Utc;
use quant_core::{EstimateDraft, QuantConfig};
use quant_risk::estimation::{
    fit_distribution, DistributionKind, EstimationEngine, FittedDistribution, ValidationResult,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use super::{open_output, read_json};
use crate::{CliError, Result};

/// Validation outcome plus the optional fitted distribution
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutput {
    pub validation: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitted: Option<FittedDistribution>,
}

/// Run the validate command
pub fn run(
    config: &QuantConfig,
    estimate: &Path,
    fit: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    info!("Validating estimate...");
    info!("  Estimate: {}", estimate.display());

    let kind = fit
        .map(|name| DistributionKind::from_str(name).map_err(CliError::InvalidArgument))
        .transpose()?;
    let draft: EstimateDraft = read_json(estimate)?;
    let result = evaluate(config, draft, kind)?;

    if !result.validation.is_valid {
        warn!(
            errors = result.validation.errors.len(),
            "Estimate failed validation"
        );
    }

    let mut out = open_output(output)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    out.flush()?;

    info!("Validation complete");
    Ok(())
}

/// Validate `draft` and, when it is valid and `kind` is given, fit a distribution
pub fn evaluate(
    config: &QuantConfig,
    draft: EstimateDraft,
    kind: Option<DistributionKind>,
) -> Result<ValidationOutput> {
    let engine = EstimationEngine::from_config(config);
    let validation = engine.validate_draft(&draft);

    let fitted = match kind {
        Some(kind) if validation.is_valid => {
            info!("Fitting {} distribution...", kind);
            let estimate = engine.accept(draft, Utc::now())?;
            Some(fit_distribution(&estimate, kind)?)
        }
        _ => None,
    };

    Ok(ValidationOutput { validation, fitted })
}
