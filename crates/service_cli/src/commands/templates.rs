//! Templates command implementation
//!
//! Lists the built-in industry templates or expands one into a scenario
//! catalogue that the summary command can read.

use quant_core::{RiskScenario, SystemClock};
use quant_risk::store::{ScenarioStore, TemplateLibrary};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{open_output, read_json};
use crate::Result;

/// Run the templates command
///
/// With `apply`, the template's scenarios are appended to the catalogue read
/// from `catalogue` (or an empty one) and the result is written as JSON.
pub fn run(apply: Option<&str>, catalogue: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let library = TemplateLibrary::builtin();
    let mut out = open_output(output)?;

    match apply {
        None => {
            info!("Listing {} templates", library.templates().len());
            list(&library, &mut out)?;
        }
        Some(id) => {
            info!("Applying template: {}", id);
            let existing: Vec<RiskScenario> = match catalogue {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            let scenarios = apply_template(&library, id, existing)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&scenarios)?)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Expand template `id` on top of `existing`
pub fn apply_template(
    library: &TemplateLibrary,
    id: &str,
    existing: Vec<RiskScenario>,
) -> Result<Vec<RiskScenario>> {
    let template = library.get(id)?;
    let mut store = ScenarioStore::from_scenarios(existing, Arc::new(SystemClock))?;
    let created = store.apply_template(template);
    info!("  Added {} scenarios", created.len());
    Ok(store.into_scenarios())
}

fn list<W: Write>(library: &TemplateLibrary, out: &mut W) -> Result<()> {
    for template in library.templates() {
        writeln!(
            out,
            "{:<20} {} ({}, {} scenarios)",
            template.id.to_string(),
            template.name,
            template.industry,
            template.scenarios.len()
        )?;
        for practice in &template.best_practices {
            writeln!(out, "    - {}", practice)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use quant_core::QuantError;

    #[test]
    fn test_apply_appends_to_catalogue() {
        let library = TemplateLibrary::builtin();
        let first = apply_template(&library, "healthcare", Vec::new()).unwrap();
        assert!(!first.is_empty());

        let count = first.len();
        let both = apply_template(&library, "saas_technology", first).unwrap();
        assert!(both.len() > count);

        let mut ids: Vec<_> = both.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), both.len());
    }

    #[test]
    fn test_catalogue_with_repeated_id_is_rejected() {
        let library = TemplateLibrary::builtin();
        let mut existing = apply_template(&library, "healthcare", Vec::new()).unwrap();
        existing.push(existing[0].clone());

        let err = apply_template(&library, "saas_technology", existing).unwrap_err();
        assert!(matches!(err, CliError::Quant(QuantError::DuplicateScenario(_))));
    }

    #[test]
    fn test_unknown_template() {
        let err = apply_template(&TemplateLibrary::builtin(), "casino", Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Quant(QuantError::TemplateNotFound(_))));
    }

    #[test]
    fn test_list_includes_every_template() {
        let library = TemplateLibrary::builtin();
        let mut buf = Vec::new();
        list(&library, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for template in library.templates() {
            assert!(text.contains(&template.name));
        }
    }
}
