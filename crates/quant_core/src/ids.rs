//! Identifier types for quantification entities.
//!
//! Newtypes keep scenario, mitigation, estimate and template identifiers
//! from being mixed up at call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id! {
    /// Unique identifier for a risk scenario.
    ///
    /// # Examples
    ///
    /// ```
    /// use quant_core::ids::ScenarioId;
    ///
    /// let id = ScenarioId::new("scenario_1700000000000");
    /// assert_eq!(id.as_str(), "scenario_1700000000000");
    /// ```
    ScenarioId
}

string_id! {
    /// Unique identifier for a mitigation control.
    MitigationId
}

string_id! {
    /// Unique identifier for a Hubbard estimate.
    EstimateId
}

string_id! {
    /// Identifier of an entry in the template library.
    TemplateId
}

impl ScenarioId {
    /// Identifier for a scenario created at `millis` (Unix epoch milliseconds).
    pub fn at(millis: i64) -> Self {
        Self(format!("scenario_{millis}"))
    }

    /// Identifier for the `index`-th scenario expanded from a template at `millis`.
    pub fn templated(millis: i64, index: usize) -> Self {
        Self(format!("scenario_{millis}_{index}"))
    }
}

impl MitigationId {
    /// Generates a random mitigation identifier.
    pub fn generate() -> Self {
        Self(format!("mitigation_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl EstimateId {
    /// Generates a random estimate identifier.
    pub fn generate() -> Self {
        Self(format!("estimate_{}", uuid::Uuid::new_v4().simple()))
    }
}
