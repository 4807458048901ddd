//! Risk scenario value objects.
//!
//! A [`RiskScenario`] combines an annual probability with a three-part impact
//! model (financial, operational, reputational) and the mitigation controls
//! attached to it. Scenarios are plain values: every edit produces a new
//! copy through the `with_*` methods and the store stamps it.

use crate::ids::{MitigationId, ScenarioId};
use crate::mitigation::RiskMitigation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to scenarios created from scratch.
pub const DEFAULT_SCENARIO_NAME: &str = "New Risk Scenario";

/// Broad category of a risk scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Cyber security
    #[default]
    Cyber,
    /// Operational failure
    Operational,
    /// Financial loss
    Financial,
    /// Reputational damage
    Reputational,
    /// Regulatory compliance
    Compliance,
    /// Strategic risk
    Strategic,
}

impl RiskCategory {
    /// Lower-case label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cyber => "cyber",
            Self::Operational => "operational",
            Self::Financial => "financial",
            Self::Reputational => "reputational",
            Self::Compliance => "compliance",
            Self::Strategic => "strategic",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threat driving a risk scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    /// Unauthorised disclosure of data
    #[default]
    DataBreach,
    /// Ransomware attack
    Ransomware,
    /// Loss of service availability
    ServiceOutage,
    /// Breach of a regulation
    ComplianceViolation,
    /// Third-party or vendor compromise
    SupplyChain,
    /// Malicious or negligent insider
    InsiderThreat,
    /// Natural disaster
    NaturalDisaster,
}

impl ThreatType {
    /// Snake-case label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataBreach => "data_breach",
            Self::Ransomware => "ransomware",
            Self::ServiceOutage => "service_outage",
            Self::ComplianceViolation => "compliance_violation",
            Self::SupplyChain => "supply_chain",
            Self::InsiderThreat => "insider_threat",
            Self::NaturalDisaster => "natural_disaster",
        }
    }
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a probability figure came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilitySource {
    /// Organisation's own loss history
    Historical,
    /// Industry benchmark data
    Industry,
    /// Calibrated expert judgement
    #[default]
    Expert,
    /// Anything else
    Custom,
}

/// Annual likelihood of a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probability {
    /// Probability of at least one occurrence per year, in [0, 1]
    pub annual: f64,
    /// Confidence in the figure, in [0, 100]
    pub confidence: f64,
    /// Provenance of the figure
    pub source: ProbabilitySource,
}

impl Default for Probability {
    fn default() -> Self {
        Self {
            annual: 0.1,
            confidence: 70.0,
            source: ProbabilitySource::Expert,
        }
    }
}

/// Direct monetary loss range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialImpact {
    /// Best-case loss
    pub min: f64,
    /// Most likely loss
    pub likely: f64,
    /// Worst-case loss
    pub max: f64,
    /// ISO currency code (display only)
    pub currency: String,
}

impl FinancialImpact {
    /// Whether `min <= likely <= max` holds.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.likely && self.likely <= self.max
    }
}

impl Default for FinancialImpact {
    fn default() -> Self {
        Self {
            min: 100_000.0,
            likely: 500_000.0,
            max: 2_000_000.0,
            currency: "USD".to_string(),
        }
    }
}

/// Disruption to operations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalImpact {
    /// Hours of downtime
    pub downtime_hours: f64,
    /// Number of affected users
    pub affected_users: u64,
    /// Fractional productivity loss, in [0, 1]
    pub productivity_loss: f64,
}

impl Default for OperationalImpact {
    fn default() -> Self {
        Self {
            downtime_hours: 24.0,
            affected_users: 1000,
            productivity_loss: 0.2,
        }
    }
}

/// Damage to brand and customer base.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationalImpact {
    /// Fraction of customers lost, in [0, 1]
    pub customer_churn: f64,
    /// Brand damage score, in [0, 100]
    pub brand_impact: f64,
    /// Days until reputation recovers
    pub recovery_time: f64,
}

impl Default for ReputationalImpact {
    fn default() -> Self {
        Self {
            customer_churn: 0.1,
            brand_impact: 50.0,
            recovery_time: 90.0,
        }
    }
}

/// Combined impact model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    /// Financial loss range
    pub financial: FinancialImpact,
    /// Operational disruption
    pub operational: OperationalImpact,
    /// Reputational damage
    pub reputational: ReputationalImpact,
}

/// A quantified risk scenario.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use quant_core::ids::ScenarioId;
/// use quant_core::scenario::{RiskScenario, ThreatType};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let scenario = RiskScenario::new(ScenarioId::new("s1"), "Ransomware", now)
///     .with_threat_type(ThreatType::Ransomware)
///     .with_annual_probability(0.15);
///
/// assert_eq!(scenario.threat_type, ThreatType::Ransomware);
/// assert_eq!(scenario.probability.annual, 0.15);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScenario {
    /// Scenario identifier
    pub id: ScenarioId,
    /// Display name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Risk category
    pub category: RiskCategory,
    /// Threat type
    pub threat_type: ThreatType,
    /// Industry the scenario was modelled for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Annual likelihood
    pub probability: Probability,
    /// Impact model
    pub impact: Impact,
    /// Attached controls, in display order
    #[serde(default)]
    pub mitigations: Vec<RiskMitigation>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last modification instant
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version, bumped by the store on every update
    #[serde(default)]
    pub version: u64,
}

impl RiskScenario {
    /// Create a scenario with the documented defaults.
    pub fn new(id: ScenarioId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            category: RiskCategory::default(),
            threat_type: ThreatType::default(),
            industry: None,
            probability: Probability::default(),
            impact: Impact::default(),
            mitigations: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Replace the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the category.
    pub fn with_category(mut self, category: RiskCategory) -> Self {
        self.category = category;
        self
    }

    /// Replace the threat type.
    pub fn with_threat_type(mut self, threat_type: ThreatType) -> Self {
        self.threat_type = threat_type;
        self
    }

    /// Replace the industry.
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Replace the whole probability block.
    pub fn with_probability(mut self, probability: Probability) -> Self {
        self.probability = probability;
        self
    }

    /// Replace only the annual probability.
    pub fn with_annual_probability(mut self, annual: f64) -> Self {
        self.probability.annual = annual;
        self
    }

    /// Replace the whole impact model.
    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    /// Replace the financial impact range.
    pub fn with_financial_impact(mut self, min: f64, likely: f64, max: f64) -> Self {
        self.impact.financial.min = min;
        self.impact.financial.likely = likely;
        self.impact.financial.max = max;
        self
    }

    /// Append a mitigation control.
    pub fn with_mitigation(mut self, mitigation: RiskMitigation) -> Self {
        self.mitigations.push(mitigation);
        self
    }

    /// Drop the mitigation with the given id, if attached.
    pub fn without_mitigation(mut self, id: &MitigationId) -> Self {
        self.mitigations.retain(|m| &m.id != id);
        self
    }

    /// Look up an attached mitigation.
    pub fn mitigation(&self, id: &MitigationId) -> Option<&RiskMitigation> {
        self.mitigations.iter().find(|m| &m.id == id)
    }

    /// Whether the financial range satisfies `min <= likely <= max`.
    ///
    /// Not enforced on construction; validators report it as a warning.
    pub fn check_financial_order(&self) -> bool {
        self.impact.financial.is_ordered()
    }

    /// Total cost of all attached mitigations.
    pub fn mitigation_cost(&self) -> f64 {
        self.mitigations.iter().map(|m| m.cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_scenario_defaults() {
        let s = RiskScenario::new(ScenarioId::new("s1"), DEFAULT_SCENARIO_NAME, now());

        assert_eq!(s.probability.annual, 0.1);
        assert_eq!(s.probability.confidence, 70.0);
        assert_eq!(s.probability.source, ProbabilitySource::Expert);
        assert_eq!(s.impact.financial.min, 100_000.0);
        assert_eq!(s.impact.financial.likely, 500_000.0);
        assert_eq!(s.impact.financial.max, 2_000_000.0);
        assert_eq!(s.impact.operational, OperationalImpact::default());
        assert_eq!(s.impact.operational.downtime_hours, 24.0);
        assert_eq!(s.impact.operational.affected_users, 1000);
        assert_eq!(s.impact.operational.productivity_loss, 0.2);
        assert_eq!(s.impact.reputational.customer_churn, 0.1);
        assert_eq!(s.impact.reputational.brand_impact, 50.0);
        assert_eq!(s.impact.reputational.recovery_time, 90.0);
        assert!(s.mitigations.is_empty());
        assert_eq!(s.created_at, s.updated_at);
        assert_eq!(s.version, 0);
    }

    #[test]
    fn test_with_methods_leave_source_untouched() {
        let base = RiskScenario::new(ScenarioId::new("s1"), "Base", now());
        let edited = base.clone().with_name("Edited").with_annual_probability(0.4);

        assert_eq!(base.name, "Base");
        assert_eq!(base.probability.annual, 0.1);
        assert_eq!(edited.name, "Edited");
        assert_eq!(edited.probability.annual, 0.4);
    }

    #[test]
    fn test_mitigation_add_and_remove() {
        let m = RiskMitigation::new(MitigationId::new("m1"), "MFA", 10_000.0, 0.2);
        let s = RiskScenario::new(ScenarioId::new("s1"), "S", now()).with_mitigation(m);
        assert!(s.mitigation(&MitigationId::new("m1")).is_some());
        assert_eq!(s.mitigation_cost(), 10_000.0);

        let s = s.without_mitigation(&MitigationId::new("m1"));
        assert!(s.mitigations.is_empty());
    }

    #[test]
    fn test_financial_order_check() {
        let s = RiskScenario::new(ScenarioId::new("s1"), "S", now());
        assert!(s.check_financial_order());

        let inverted = s.with_financial_impact(500.0, 100.0, 1_000.0);
        assert!(!inverted.check_financial_order());
    }

    #[test]
    fn test_serde_uses_camel_case_and_snake_case_enums() {
        let s = RiskScenario::new(ScenarioId::new("s1"), "S", now())
            .with_threat_type(ThreatType::SupplyChain);
        let json = serde_json::to_value(&s).unwrap();

        assert_eq!(json["threatType"], "supply_chain");
        assert_eq!(json["impact"]["operational"]["downtimeHours"], 24.0);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("industry").is_none());

        let back: RiskScenario = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
