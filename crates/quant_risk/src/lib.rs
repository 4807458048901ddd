//! # Quant Risk (L2: Engines)
//!
//! Scenario catalogue, calibrated estimation and portfolio reporting.
//!
//! This crate provides:
//! - Scenario store with template expansion and change notification
//! - Hubbard 5-point estimate validation and calibration training
//! - Bias correction, uncertainty decomposition and sensitivity analysis
//! - Annualised loss expectancy and priority tiers
//! - Mitigation cost-benefit analysis
//! - Executive summary composition
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------+
//! |             quant_risk (L2)              |
//! +------------------------------------------+
//! |  store/       - ScenarioStore, templates |
//! |  estimation/  - validation, training,    |
//! |                 pooling, fitting,        |
//! |                 bias, uncertainty        |
//! |  exposure     - ALE, priority tiers      |
//! |  mitigation   - benefit, ROI             |
//! |  summary/     - board report, approval   |
//! +------------------------------------------+
//!          |
//!          v
//! +------------------------------------------+
//! |             quant_core (L1)              |
//! |  value types, errors, configuration      |
//! +------------------------------------------+
//! ```
//!
//! Monte Carlo sampling is not performed here. When an external simulator
//! has run, its [`MonteCarloResult`](quant_core::MonteCarloResult) is
//! preferred over the closed-form fallbacks.
//!
//! ## Example
//!
//! ```
//! use quant_core::{MitigationId, RiskMitigation};
//! use quant_risk::prelude::*;
//!
//! let mut store = ScenarioStore::new();
//! let scenario = store.create();
//! store
//!     .add_mitigation(
//!         &scenario.id,
//!         RiskMitigation::new(MitigationId::new("mfa"), "MFA rollout", 10_000.0, 0.2),
//!     )
//!     .unwrap();
//!
//! let calc = ExposureCalculator::default();
//! // 0.1 × 500,000
//! assert_eq!(calc.priority(&store.scenarios()[0]), PriorityTier::Low);
//!
//! let report = ExecutiveSummaryBuilder::new()
//!     .organization_name("Acme Corp")
//!     .build(store.scenarios())
//!     .unwrap();
//! assert_eq!(report.scenarios.len(), 1);
//! ```

#![warn(clippy::all)]
#![deny(missing_docs)]

pub mod estimation;
pub mod exposure;
pub mod mitigation;
pub mod store;
pub mod summary;

pub use estimation::{EstimationEngine, ValidationResult};
pub use exposure::{ExposureCalculator, PriorityTier};
pub use mitigation::MitigationAnalyzer;
pub use store::{ScenarioStore, TemplateLibrary};
pub use summary::{ExecutiveReport, ExecutiveSummaryBuilder};

/// Commonly used types.
pub mod prelude {
    pub use crate::estimation::{
        BiasProfile, DistributionShape, EstimationEngine, QuantityKind, SimulatedResponder,
        TrainingRng, UncertaintyQuantification, ValidationResult,
    };
    pub use crate::exposure::{ExposureCalculator, PortfolioExposure, PriorityTier};
    pub use crate::mitigation::{MitigationAnalyzer, MitigationTotals};
    pub use crate::store::{ScenarioSink, ScenarioStore, TemplateKind, TemplateLibrary};
    pub use crate::summary::{ApprovalTier, ExecutiveReport, ExecutiveSummaryBuilder};
}
