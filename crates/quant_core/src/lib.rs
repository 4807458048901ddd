//! # quant_core: Foundation Types for Risk Quantification
//!
//! ## Layer 1 (Foundation) Role
//!
//! quant_core is the bottom layer of the workspace and provides:
//! - Risk scenario value objects (`scenario`, `mitigation`)
//! - Hubbard 5-point estimates and calibration sessions (`estimate`, `calibration`)
//! - The optional Monte Carlo hand-off record (`monte_carlo`)
//! - Strongly-typed identifiers (`ids`)
//! - Error types: `QuantError` (`error`)
//! - Tunable thresholds and factors: `QuantConfig` (`config`)
//! - Injectable time source: `Clock` (`clock`)
//!
//! No other crate of the workspace is a dependency; engines live in
//! `quant_risk`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use quant_core::scenario::RiskScenario;
//! use quant_core::ids::ScenarioId;
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let scenario = RiskScenario::new(ScenarioId::new("scenario_1"), "Ransomware", now);
//!
//! assert_eq!(scenario.probability.annual, 0.1);
//! assert_eq!(scenario.impact.financial.likely, 500_000.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;
pub mod clock;
pub mod config;
pub mod error;
pub mod estimate;
pub mod ids;
pub mod mitigation;
pub mod monte_carlo;
pub mod scenario;

pub use calibration::{CalibrationExercise, CalibrationLevel, CalibrationSession, ClaimedRange};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    CalibrationConfig, ConfigError, EstimationConfig, PriorityThresholds, QuantConfig,
    SummaryConfig,
};
pub use error::{QuantError, QuantResult};
pub use estimate::{EstimateDraft, Expertise, HubbardEstimate, Percentile, Percentiles};
pub use ids::{EstimateId, MitigationId, ScenarioId, TemplateId};
pub use mitigation::RiskMitigation;
pub use monte_carlo::{ConfidenceInterval, MonteCarloResult, RiskMetrics, SimulationStatistics};
pub use scenario::{
    FinancialImpact, Impact, OperationalImpact, Probability, ProbabilitySource,
    ReputationalImpact, RiskCategory, RiskScenario, ThreatType,
};
