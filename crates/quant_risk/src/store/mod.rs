//! Scenario catalogue management.
//!
//! This module provides:
//! - [`ScenarioStore`]: the working set of scenarios for one editing session
//! - [`ScenarioSink`]: change notification towards the persistence layer
//! - Template library for bulk scenario creation (`templates`)
//!
//! ## Concurrency
//!
//! Mutations take `&mut self`, so a store shared between threads must sit
//! behind a single-writer lock. Independently of that, every scenario
//! carries a `version`; [`ScenarioStore::update`] only accepts a copy whose
//! version matches the stored one, so an edit based on a stale copy is
//! rejected with [`QuantError::VersionConflict`] instead of silently
//! overwriting a newer edit.

mod templates;

pub use templates::{
    ImpactSeed, MitigationSeed, RiskTemplate, ScenarioSeed, TemplateKind, TemplateLibrary,
};

use chrono::{DateTime, Utc};
use quant_core::clock::{Clock, SystemClock};
use quant_core::ids::{MitigationId, ScenarioId};
use quant_core::mitigation::RiskMitigation;
use quant_core::scenario::{RiskScenario, DEFAULT_SCENARIO_NAME};
use quant_core::{QuantError, QuantResult};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receiver of the full catalogue after every successful mutation.
///
/// Durable storage and cross-session conflict resolution are the
/// receiver's responsibility.
pub trait ScenarioSink: Send + Sync {
    /// Called with the catalogue as it stands after the mutation.
    fn on_scenarios_change(&self, scenarios: &[RiskScenario]);
}

impl<F> ScenarioSink for F
where
    F: Fn(&[RiskScenario]) + Send + Sync,
{
    fn on_scenarios_change(&self, scenarios: &[RiskScenario]) {
        self(scenarios)
    }
}

/// Deep copy of `source` under a new id, named `"<name> (Copy)"`.
///
/// Attached mitigations are copied with fresh ids since each mitigation
/// belongs to exactly one scenario.
pub fn duplicate_scenario(
    source: &RiskScenario,
    id: ScenarioId,
    now: DateTime<Utc>,
) -> RiskScenario {
    let mut copy = source.clone();
    copy.id = id;
    copy.name = format!("{} (Copy)", source.name);
    copy.created_at = now;
    copy.updated_at = now;
    copy.version = 0;
    for mitigation in &mut copy.mitigations {
        mitigation.id = MitigationId::generate();
    }
    copy
}

/// In-memory scenario catalogue.
///
/// # Examples
///
/// ```
/// use quant_risk::store::ScenarioStore;
///
/// let mut store = ScenarioStore::new();
/// let created = store.create();
/// let copy = store.duplicate(&created.id).unwrap();
///
/// assert_eq!(store.len(), 2);
/// assert_eq!(copy.name, "New Risk Scenario (Copy)");
/// ```
pub struct ScenarioStore {
    scenarios: Vec<RiskScenario>,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn ScenarioSink>>,
}

impl Default for ScenarioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScenarioStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioStore")
            .field("scenarios", &self.scenarios)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl ScenarioStore {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            scenarios: Vec::new(),
            clock,
            sinks: Vec::new(),
        }
    }

    /// Create a store pre-loaded with scenarios (e.g. from persistence).
    ///
    /// # Errors
    ///
    /// [`QuantError::DuplicateScenario`] naming the first id that appears
    /// more than once; lookups by id would otherwise be ambiguous.
    pub fn from_scenarios(
        scenarios: Vec<RiskScenario>,
        clock: Arc<dyn Clock>,
    ) -> QuantResult<Self> {
        let mut seen = HashSet::with_capacity(scenarios.len());
        if let Some(dup) = scenarios.iter().find(|s| !seen.insert(&s.id)) {
            warn!(id = %dup.id, "rejected catalogue with duplicate scenario id");
            return Err(QuantError::DuplicateScenario(dup.id.to_string()));
        }
        Ok(Self {
            scenarios,
            clock,
            sinks: Vec::new(),
        })
    }

    /// Register a change receiver.
    pub fn subscribe(&mut self, sink: Arc<dyn ScenarioSink>) {
        self.sinks.push(sink);
    }

    /// Scenarios in insertion order.
    pub fn scenarios(&self) -> &[RiskScenario] {
        &self.scenarios
    }

    /// Consume the store, returning its scenarios.
    pub fn into_scenarios(self) -> Vec<RiskScenario> {
        self.scenarios
    }

    /// Scenario count.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario.
    pub fn get(&self, id: &ScenarioId) -> Option<&RiskScenario> {
        self.scenarios.iter().find(|s| &s.id == id)
    }

    /// Whether a scenario with `id` exists.
    pub fn contains(&self, id: &ScenarioId) -> bool {
        self.get(id).is_some()
    }

    /// Add a new scenario with the documented defaults.
    pub fn create(&mut self) -> RiskScenario {
        let now = self.clock.now();
        let id = self.unique_id(ScenarioId::at(now.timestamp_millis()));
        let scenario = RiskScenario::new(id, DEFAULT_SCENARIO_NAME, now);
        debug!(id = %scenario.id, "created scenario");
        self.insert(scenario)
    }

    /// Insert a scenario built elsewhere; its id is made unique if needed.
    pub fn insert(&mut self, mut scenario: RiskScenario) -> RiskScenario {
        scenario.id = self.unique_id(scenario.id);
        self.scenarios.push(scenario.clone());
        self.notify();
        scenario
    }

    /// Add a deep copy of an existing scenario. The source is not modified.
    pub fn duplicate(&mut self, id: &ScenarioId) -> QuantResult<RiskScenario> {
        let source = self
            .get(id)
            .ok_or_else(|| QuantError::ScenarioNotFound(id.to_string()))?;
        let now = self.clock.now();
        let new_id = self.unique_id(ScenarioId::at(now.timestamp_millis()));
        let copy = duplicate_scenario(source, new_id, now);
        debug!(source = %id, id = %copy.id, "duplicated scenario");
        Ok(self.insert(copy))
    }

    /// Remove a scenario, returning it.
    ///
    /// Any selection pointing at the removed scenario is owned by the caller
    /// and must be cleared or moved there.
    pub fn delete(&mut self, id: &ScenarioId) -> QuantResult<RiskScenario> {
        let index = self
            .position(id)
            .ok_or_else(|| QuantError::ScenarioNotFound(id.to_string()))?;
        let removed = self.scenarios.remove(index);
        debug!(id = %id, "deleted scenario");
        self.notify();
        Ok(removed)
    }

    /// Expand every seed of `template` into a new scenario.
    ///
    /// Ids are always regenerated as `scenario_<millis>_<index>`, so applying
    /// the same template twice never collides.
    pub fn apply_template(&mut self, template: &RiskTemplate) -> Vec<RiskScenario> {
        let now = self.clock.now();
        let millis = now.timestamp_millis();
        let mut created = Vec::with_capacity(template.scenarios.len());
        for (index, seed) in template.seeds().enumerate() {
            let id = self.unique_id(ScenarioId::templated(millis, index));
            let scenario = seed.into_scenario(id, now);
            self.scenarios.push(scenario.clone());
            created.push(scenario);
        }
        debug!(template = %template.id, count = created.len(), "applied template");
        self.notify();
        created
    }

    /// Replace the stored scenario with the same id.
    ///
    /// `scenario.version` must equal the stored version. On success the
    /// stored copy gets `updated_at = now`, `version + 1` and keeps its
    /// original `created_at`.
    pub fn update(&mut self, scenario: RiskScenario) -> QuantResult<RiskScenario> {
        let index = self
            .position(&scenario.id)
            .ok_or_else(|| QuantError::ScenarioNotFound(scenario.id.to_string()))?;
        let stored = &self.scenarios[index];
        if stored.version != scenario.version {
            warn!(
                id = %scenario.id,
                submitted = scenario.version,
                stored = stored.version,
                "rejected stale scenario update"
            );
            return Err(QuantError::VersionConflict {
                id: scenario.id.to_string(),
                expected: scenario.version,
                found: stored.version,
            });
        }
        Ok(self.commit(index, scenario))
    }

    /// Attach a mitigation to a stored scenario.
    pub fn add_mitigation(
        &mut self,
        id: &ScenarioId,
        mitigation: RiskMitigation,
    ) -> QuantResult<RiskScenario> {
        let index = self
            .position(id)
            .ok_or_else(|| QuantError::ScenarioNotFound(id.to_string()))?;
        let edited = self.scenarios[index].clone().with_mitigation(mitigation);
        Ok(self.commit(index, edited))
    }

    /// Detach a mitigation from a stored scenario.
    pub fn remove_mitigation(
        &mut self,
        id: &ScenarioId,
        mitigation: &MitigationId,
    ) -> QuantResult<RiskScenario> {
        let index = self
            .position(id)
            .ok_or_else(|| QuantError::ScenarioNotFound(id.to_string()))?;
        let current = &self.scenarios[index];
        if current.mitigation(mitigation).is_none() {
            return Err(QuantError::MitigationNotFound(
                id.to_string(),
                mitigation.to_string(),
            ));
        }
        let edited = current.clone().without_mitigation(mitigation);
        Ok(self.commit(index, edited))
    }

    fn commit(&mut self, index: usize, mut scenario: RiskScenario) -> RiskScenario {
        let stored = &self.scenarios[index];
        scenario.created_at = stored.created_at;
        scenario.version = stored.version + 1;
        scenario.updated_at = self.clock.now();
        debug!(id = %scenario.id, version = scenario.version, "updated scenario");
        self.scenarios[index] = scenario.clone();
        self.notify();
        scenario
    }

    fn position(&self, id: &ScenarioId) -> Option<usize> {
        self.scenarios.iter().position(|s| &s.id == id)
    }

    fn unique_id(&self, candidate: ScenarioId) -> ScenarioId {
        if !self.contains(&candidate) {
            return candidate;
        }
        (1..)
            .map(|n| ScenarioId::new(format!("{}_{}", candidate, n)))
            .find(|id| !self.contains(id))
            .unwrap_or(candidate)
    }

    fn notify(&self) {
        for sink in &self.sinks {
            sink.on_scenarios_change(&self.scenarios);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use quant_core::clock::FixedClock;
    use std::sync::Mutex;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()
    }

    fn store() -> (ScenarioStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(start()));
        (ScenarioStore::with_clock(clock.clone()), clock)
    }

    // ================================================================
    // create / duplicate / delete
    // ================================================================

    #[test]
    fn test_create_uses_defaults_and_timestamp_id() {
        let (mut store, _) = store();
        let s = store.create();

        assert_eq!(s.id, ScenarioId::at(start().timestamp_millis()));
        assert_eq!(s.name, DEFAULT_SCENARIO_NAME);
        assert_eq!(s.probability.annual, 0.1);
        assert_eq!(s.created_at, start());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_twice_same_instant_has_unique_ids() {
        let (mut store, _) = store();
        let a = store.create();
        let b = store.create();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_is_deep_copy() {
        let (mut store, clock) = store();
        let original = store.create();
        let original = store
            .add_mitigation(
                &original.id,
                RiskMitigation::new(MitigationId::new("m1"), "MFA", 1_000.0, 0.1),
            )
            .unwrap();

        clock.advance(Duration::seconds(10));
        let copy = store.duplicate(&original.id).unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "New Risk Scenario (Copy)");
        assert_eq!(copy.created_at, start() + Duration::seconds(10));
        assert_eq!(copy.probability, original.probability);
        assert_eq!(copy.mitigations.len(), 1);
        assert_ne!(copy.mitigations[0].id, original.mitigations[0].id);
        assert_eq!(store.get(&original.id), Some(&original));
    }

    #[test]
    fn test_from_scenarios_rejects_duplicate_ids() {
        let a = RiskScenario::new(ScenarioId::new("s1"), "First", start());
        let b = RiskScenario::new(ScenarioId::new("s2"), "Second", start());
        let again = RiskScenario::new(ScenarioId::new("s1"), "Reused", start());
        let clock = Arc::new(FixedClock::new(start()));

        let err = ScenarioStore::from_scenarios(vec![a.clone(), b.clone(), again], clock.clone())
            .unwrap_err();
        assert_eq!(err, QuantError::DuplicateScenario("s1".to_string()));

        let store = ScenarioStore::from_scenarios(vec![a, b], clock).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_unknown_id() {
        let (mut store, _) = store();
        let err = store.duplicate(&ScenarioId::new("nope")).unwrap_err();
        assert_eq!(err, QuantError::ScenarioNotFound("nope".to_string()));
    }

    #[test]
    fn test_delete() {
        let (mut store, _) = store();
        let s = store.create();
        let removed = store.delete(&s.id).unwrap();
        assert_eq!(removed.id, s.id);
        assert!(store.is_empty());
        assert!(store.delete(&s.id).is_err());
    }

    // ================================================================
    // update / optimistic concurrency
    // ================================================================

    #[test]
    fn test_update_stamps_and_bumps_version() {
        let (mut store, clock) = store();
        let s = store.create();

        clock.advance(Duration::minutes(1));
        let updated = store.update(s.clone().with_name("Renamed")).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.version, 1);
        assert_eq!(updated.created_at, s.created_at);
        assert_eq!(updated.updated_at, start() + Duration::minutes(1));
        assert_eq!(store.get(&s.id).unwrap().name, "Renamed");
    }

    #[test]
    fn test_update_rejects_stale_copy() {
        let (mut store, _) = store();
        let s = store.create();
        let editor_a = s.clone();
        let editor_b = s.clone();

        store.update(editor_a.with_name("A")).unwrap();
        let err = store.update(editor_b.with_name("B")).unwrap_err();

        assert_eq!(
            err,
            QuantError::VersionConflict {
                id: s.id.to_string(),
                expected: 0,
                found: 1,
            }
        );
        assert_eq!(store.get(&s.id).unwrap().name, "A");
    }

    #[test]
    fn test_update_unknown_id() {
        let (mut store, _) = store();
        let orphan = RiskScenario::new(ScenarioId::new("ghost"), "Ghost", start());
        assert!(matches!(
            store.update(orphan),
            Err(QuantError::ScenarioNotFound(_))
        ));
    }

    #[test]
    fn test_remove_mitigation() {
        let (mut store, _) = store();
        let s = store.create();
        store
            .add_mitigation(
                &s.id,
                RiskMitigation::new(MitigationId::new("m1"), "MFA", 1_000.0, 0.1),
            )
            .unwrap();

        let after = store
            .remove_mitigation(&s.id, &MitigationId::new("m1"))
            .unwrap();
        assert!(after.mitigations.is_empty());
        assert_eq!(after.version, 2);

        assert!(matches!(
            store.remove_mitigation(&s.id, &MitigationId::new("m1")),
            Err(QuantError::MitigationNotFound(_, _))
        ));
    }

    // ================================================================
    // templates
    // ================================================================

    #[test]
    fn test_apply_template_ids() {
        let (mut store, _) = store();
        let template = TemplateLibrary::generate(TemplateKind::SaasTechnology);
        let created = store.apply_template(&template);

        let millis = start().timestamp_millis();
        assert_eq!(created.len(), template.scenarios.len());
        for (index, scenario) in created.iter().enumerate() {
            assert_eq!(scenario.id, ScenarioId::templated(millis, index));
            assert_eq!(scenario.industry.as_deref(), Some("technology"));
        }
    }

    #[test]
    fn test_apply_template_twice_never_collides() {
        let (mut store, _) = store();
        let template = TemplateLibrary::generate(TemplateKind::Healthcare);
        store.apply_template(&template);
        store.apply_template(&template);

        let mut ids: Vec<_> = store.scenarios().iter().map(|s| s.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 2 * template.scenarios.len());
    }

    // ================================================================
    // change notification
    // ================================================================

    #[test]
    fn test_sink_sees_every_mutation() {
        let (mut store, _) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        store.subscribe(Arc::new(move |scenarios: &[RiskScenario]| {
            seen_clone.lock().unwrap().push(scenarios.len());
        }));

        let s = store.create();
        store.duplicate(&s.id).unwrap();
        store.delete(&s.id).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn test_failed_mutation_does_not_notify() {
        let (mut store, _) = store();
        let count = Arc::new(Mutex::new(0usize));
        let count_clone = count.clone();
        store.subscribe(Arc::new(move |_: &[RiskScenario]| {
            *count_clone.lock().unwrap() += 1;
        }));

        assert!(store.delete(&ScenarioId::new("missing")).is_err());
        assert_eq!(*count.lock().unwrap(), 0);
    }
}
