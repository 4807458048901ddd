//! Template library for bulk scenario creation.
//!
//! Provides ready-to-use scenario sets for common industries:
//! - Financial services (breach, ransomware, regulatory fines)
//! - Healthcare (PHI disclosure, clinical system outage)
//! - SaaS technology (cloud outage, supply chain compromise)
//! - Manufacturing (OT ransomware, natural disaster)
//!
//! Seeds only carry the fields that differ from the scenario defaults;
//! everything else is filled in when the template is applied.

use chrono::{DateTime, Utc};
use quant_core::ids::{MitigationId, ScenarioId, TemplateId};
use quant_core::mitigation::RiskMitigation;
use quant_core::scenario::{
    FinancialImpact, Impact, OperationalImpact, Probability, ProbabilitySource,
    ReputationalImpact, RiskCategory, RiskScenario, ThreatType, DEFAULT_SCENARIO_NAME,
};
use quant_core::{QuantError, QuantResult};
use serde::{Deserialize, Serialize};

/// Partial impact model; absent parts take the scenario defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImpactSeed {
    /// Financial impact override
    pub financial: Option<FinancialImpact>,
    /// Operational impact override
    pub operational: Option<OperationalImpact>,
    /// Reputational impact override
    pub reputational: Option<ReputationalImpact>,
}

/// Mitigation carried by a seed; receives a fresh id on expansion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MitigationSeed {
    /// Display name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Cost in currency units
    pub cost: f64,
    /// Fractional loss reduction
    pub effectiveness: f64,
    /// Days to implement
    pub implementation_time: u32,
}

impl MitigationSeed {
    fn new(name: &str, cost: f64, effectiveness: f64, implementation_time: u32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            cost,
            effectiveness,
            implementation_time,
        }
    }

    /// Expand into a mitigation with a fresh id.
    pub fn into_mitigation(self) -> RiskMitigation {
        RiskMitigation::new(
            MitigationId::generate(),
            self.name,
            self.cost,
            self.effectiveness,
        )
        .with_description(self.description)
        .with_implementation_time(self.implementation_time)
    }
}

/// Partial scenario definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioSeed {
    /// Display name
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Risk category
    pub category: Option<RiskCategory>,
    /// Threat type
    pub threat_type: Option<ThreatType>,
    /// Industry (falls back to the template industry)
    pub industry: Option<String>,
    /// Probability block
    pub probability: Option<Probability>,
    /// Partial impact model
    pub impact: Option<ImpactSeed>,
    /// Controls to attach
    pub mitigations: Vec<MitigationSeed>,
}

impl ScenarioSeed {
    /// Merge the seed over the scenario defaults.
    pub fn into_scenario(self, id: ScenarioId, now: DateTime<Utc>) -> RiskScenario {
        let mut scenario = RiskScenario::new(
            id,
            self.name.unwrap_or_else(|| DEFAULT_SCENARIO_NAME.to_string()),
            now,
        );
        if let Some(description) = self.description {
            scenario.description = description;
        }
        if let Some(category) = self.category {
            scenario.category = category;
        }
        if let Some(threat_type) = self.threat_type {
            scenario.threat_type = threat_type;
        }
        scenario.industry = self.industry;
        if let Some(probability) = self.probability {
            scenario.probability = probability;
        }
        if let Some(impact) = self.impact {
            let defaults = Impact::default();
            scenario.impact = Impact {
                financial: impact.financial.unwrap_or(defaults.financial),
                operational: impact.operational.unwrap_or(defaults.operational),
                reputational: impact.reputational.unwrap_or(defaults.reputational),
            };
        }
        scenario.mitigations = self
            .mitigations
            .into_iter()
            .map(MitigationSeed::into_mitigation)
            .collect();
        scenario
    }
}

/// A named, industry-specific set of scenario seeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskTemplate {
    /// Template identifier
    pub id: TemplateId,
    /// Display name
    pub name: String,
    /// Target industry
    pub industry: String,
    /// Dominant risk category
    pub category: RiskCategory,
    /// Scenario seeds
    pub scenarios: Vec<ScenarioSeed>,
    /// Recommended practices shown alongside the template
    pub best_practices: Vec<String>,
}

impl RiskTemplate {
    /// Seeds with the template industry applied where a seed leaves it blank.
    pub fn seeds(&self) -> impl Iterator<Item = ScenarioSeed> + '_ {
        self.scenarios.iter().cloned().map(|mut seed| {
            if seed.industry.is_none() {
                seed.industry = Some(self.industry.clone());
            }
            seed
        })
    }
}

/// Built-in templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Banks, insurers, payment processors
    FinancialServices,
    /// Hospitals and health-tech
    Healthcare,
    /// Software-as-a-service vendors
    SaasTechnology,
    /// Industrial manufacturing
    Manufacturing,
}

impl TemplateKind {
    /// Every built-in template.
    pub fn all() -> Vec<Self> {
        vec![
            Self::FinancialServices,
            Self::Healthcare,
            Self::SaasTechnology,
            Self::Manufacturing,
        ]
    }

    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::FinancialServices => "financial_services",
            Self::Healthcare => "healthcare",
            Self::SaasTechnology => "saas_technology",
            Self::Manufacturing => "manufacturing",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FinancialServices => "Financial Services Cyber Risk",
            Self::Healthcare => "Healthcare Data Protection",
            Self::SaasTechnology => "SaaS Platform Resilience",
            Self::Manufacturing => "Manufacturing Operations",
        }
    }

    fn industry(&self) -> &'static str {
        match self {
            Self::FinancialServices => "financial_services",
            Self::Healthcare => "healthcare",
            Self::SaasTechnology => "technology",
            Self::Manufacturing => "manufacturing",
        }
    }

    fn category(&self) -> RiskCategory {
        match self {
            Self::FinancialServices | Self::Healthcare | Self::SaasTechnology => {
                RiskCategory::Cyber
            }
            Self::Manufacturing => RiskCategory::Operational,
        }
    }
}

/// Lookup over the built-in templates.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: Vec<RiskTemplate>,
}

impl TemplateLibrary {
    /// Library holding every built-in template.
    pub fn builtin() -> Self {
        Self {
            templates: TemplateKind::all().into_iter().map(Self::generate).collect(),
        }
    }

    /// Library over caller-supplied templates.
    pub fn from_templates(templates: Vec<RiskTemplate>) -> Self {
        Self { templates }
    }

    /// All templates.
    pub fn templates(&self) -> &[RiskTemplate] {
        &self.templates
    }

    /// Find a template by id.
    pub fn get(&self, id: &str) -> QuantResult<&RiskTemplate> {
        self.templates
            .iter()
            .find(|t| t.id.as_str() == id)
            .ok_or_else(|| QuantError::TemplateNotFound(id.to_string()))
    }

    /// Build a built-in template.
    pub fn generate(kind: TemplateKind) -> RiskTemplate {
        RiskTemplate {
            id: TemplateId::new(kind.id()),
            name: kind.name().to_string(),
            industry: kind.industry().to_string(),
            category: kind.category(),
            scenarios: Self::seeds_for(kind),
            best_practices: Self::best_practices_for(kind)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn seeds_for(kind: TemplateKind) -> Vec<ScenarioSeed> {
        match kind {
            TemplateKind::FinancialServices => vec![
                seed(
                    "Customer Data Breach",
                    RiskCategory::Cyber,
                    ThreatType::DataBreach,
                    0.15,
                    ProbabilitySource::Industry,
                    (500_000.0, 2_000_000.0, 8_000_000.0),
                )
                .with_mitigation(MitigationSeed::new("Data loss prevention", 150_000.0, 0.3, 90)),
                seed(
                    "Core Banking Ransomware",
                    RiskCategory::Cyber,
                    ThreatType::Ransomware,
                    0.08,
                    ProbabilitySource::Industry,
                    (1_000_000.0, 4_000_000.0, 15_000_000.0),
                )
                .with_mitigation(MitigationSeed::new("Immutable backups", 80_000.0, 0.4, 45)),
                seed(
                    "AML Reporting Failure",
                    RiskCategory::Compliance,
                    ThreatType::ComplianceViolation,
                    0.05,
                    ProbabilitySource::Historical,
                    (250_000.0, 1_500_000.0, 10_000_000.0),
                ),
            ],
            TemplateKind::Healthcare => vec![
                seed(
                    "PHI Disclosure",
                    RiskCategory::Compliance,
                    ThreatType::DataBreach,
                    0.2,
                    ProbabilitySource::Industry,
                    (200_000.0, 1_200_000.0, 6_000_000.0),
                ),
                seed(
                    "EHR Outage",
                    RiskCategory::Operational,
                    ThreatType::ServiceOutage,
                    0.25,
                    ProbabilitySource::Historical,
                    (50_000.0, 300_000.0, 1_500_000.0),
                )
                .with_operational(OperationalImpact {
                    downtime_hours: 48.0,
                    affected_users: 5_000,
                    productivity_loss: 0.5,
                }),
            ],
            TemplateKind::SaasTechnology => vec![
                seed(
                    "Multi-Region Cloud Outage",
                    RiskCategory::Operational,
                    ThreatType::ServiceOutage,
                    0.3,
                    ProbabilitySource::Historical,
                    (100_000.0, 400_000.0, 2_500_000.0),
                )
                .with_mitigation(MitigationSeed::new(
                    "Active-active failover",
                    120_000.0,
                    0.5,
                    120,
                )),
                seed(
                    "Dependency Supply Chain Compromise",
                    RiskCategory::Cyber,
                    ThreatType::SupplyChain,
                    0.1,
                    ProbabilitySource::Expert,
                    (150_000.0, 900_000.0, 5_000_000.0),
                ),
                seed(
                    "Privileged Insider Misuse",
                    RiskCategory::Cyber,
                    ThreatType::InsiderThreat,
                    0.05,
                    ProbabilitySource::Expert,
                    (50_000.0, 600_000.0, 3_000_000.0),
                ),
            ],
            TemplateKind::Manufacturing => vec![
                seed(
                    "OT Network Ransomware",
                    RiskCategory::Operational,
                    ThreatType::Ransomware,
                    0.12,
                    ProbabilitySource::Industry,
                    (300_000.0, 2_500_000.0, 12_000_000.0),
                ),
                seed(
                    "Plant Flood",
                    RiskCategory::Operational,
                    ThreatType::NaturalDisaster,
                    0.02,
                    ProbabilitySource::Historical,
                    (1_000_000.0, 5_000_000.0, 25_000_000.0),
                ),
            ],
        }
    }

    fn best_practices_for(kind: TemplateKind) -> &'static [&'static str] {
        match kind {
            TemplateKind::FinancialServices => &[
                "Encrypt customer data at rest and in transit",
                "Test incident response against regulator notification deadlines",
                "Maintain offline, immutable backups of core ledgers",
            ],
            TemplateKind::Healthcare => &[
                "Map PHI flows and restrict access by role",
                "Run downtime procedures drills for clinical systems",
            ],
            TemplateKind::SaasTechnology => &[
                "Pin and verify third-party dependencies",
                "Exercise regional failover quarterly",
                "Enforce just-in-time privileged access",
            ],
            TemplateKind::Manufacturing => &[
                "Segment OT networks from corporate IT",
                "Review business interruption insurance limits annually",
            ],
        }
    }
}

fn seed(
    name: &str,
    category: RiskCategory,
    threat_type: ThreatType,
    annual: f64,
    source: ProbabilitySource,
    (min, likely, max): (f64, f64, f64),
) -> ScenarioSeed {
    ScenarioSeed {
        name: Some(name.to_string()),
        category: Some(category),
        threat_type: Some(threat_type),
        probability: Some(Probability {
            annual,
            confidence: 70.0,
            source,
        }),
        impact: Some(ImpactSeed {
            financial: Some(FinancialImpact {
                min,
                likely,
                max,
                currency: "USD".to_string(),
            }),
            ..ImpactSeed::default()
        }),
        ..ScenarioSeed::default()
    }
}

impl ScenarioSeed {
    fn with_mitigation(mut self, mitigation: MitigationSeed) -> Self {
        self.mitigations.push(mitigation);
        self
    }

    fn with_operational(mut self, operational: OperationalImpact) -> Self {
        self.impact.get_or_insert_with(ImpactSeed::default).operational = Some(operational);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    }

    // ================================================================
    // Template library tests
    // ================================================================

    #[test]
    fn test_builtin_library_contents() {
        let library = TemplateLibrary::builtin();
        assert_eq!(library.templates().len(), 4);
        for template in library.templates() {
            assert!(!template.scenarios.is_empty(), "{} has no seeds", template.id);
            assert!(!template.best_practices.is_empty());
        }
    }

    #[test]
    fn test_library_lookup() {
        let library = TemplateLibrary::builtin();
        let template = library.get("healthcare").unwrap();
        assert_eq!(template.name, "Healthcare Data Protection");

        let missing = library.get("aerospace");
        assert_eq!(
            missing.unwrap_err(),
            QuantError::TemplateNotFound("aerospace".to_string())
        );
    }

    #[test]
    fn test_seed_without_operational_takes_defaults() {
        let seed = ScenarioSeed {
            name: Some("Partial".to_string()),
            impact: Some(ImpactSeed {
                financial: Some(FinancialImpact {
                    min: 1.0,
                    likely: 2.0,
                    max: 3.0,
                    currency: "EUR".to_string(),
                }),
                ..ImpactSeed::default()
            }),
            ..ScenarioSeed::default()
        };

        let scenario = seed.into_scenario(ScenarioId::new("s1"), now());
        assert_eq!(scenario.impact.operational.downtime_hours, 24.0);
        assert_eq!(scenario.impact.operational.affected_users, 1000);
        assert_eq!(scenario.impact.operational.productivity_loss, 0.2);
        assert_eq!(scenario.impact.reputational, ReputationalImpact::default());
        assert_eq!(scenario.impact.financial.currency, "EUR");
    }

    #[test]
    fn test_empty_seed_matches_new_scenario() {
        let from_seed = ScenarioSeed::default().into_scenario(ScenarioId::new("s1"), now());
        let fresh = RiskScenario::new(ScenarioId::new("s1"), DEFAULT_SCENARIO_NAME, now());
        assert_eq!(from_seed, fresh);
    }

    #[test]
    fn test_template_industry_fills_seeds() {
        let template = TemplateLibrary::generate(TemplateKind::Manufacturing);
        assert!(template
            .seeds()
            .all(|s| s.industry.as_deref() == Some("manufacturing")));
    }

    #[test]
    fn test_seed_mitigations_get_fresh_ids() {
        let template = TemplateLibrary::generate(TemplateKind::FinancialServices);
        let a = template.seeds().next().unwrap().into_scenario(ScenarioId::new("a"), now());
        let b = template.seeds().next().unwrap().into_scenario(ScenarioId::new("b"), now());
        assert_eq!(a.mitigations.len(), 1);
        assert_ne!(a.mitigations[0].id, b.mitigations[0].id);
    }

    #[test]
    fn test_seed_deserialises_from_partial_json() {
        let seed: ScenarioSeed =
            serde_json::from_str(r#"{"name":"Vendor outage","threatType":"supply_chain"}"#)
                .unwrap();
        assert_eq!(seed.threat_type, Some(ThreatType::SupplyChain));
        assert!(seed.impact.is_none());
    }
}
