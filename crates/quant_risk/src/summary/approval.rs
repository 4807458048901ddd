//! Sign-off level for a mitigation budget.

use quant_core::config::SummaryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who has to sign off an investment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalTier {
    /// Below the auto-approval limit
    AutoApprove,
    /// Between the auto-approval limit and the executive threshold
    Management,
    /// Above the executive threshold
    Executive,
    /// Above the board threshold
    Board,
}

impl ApprovalTier {
    /// Tier for `amount`. The auto-approval limit is exclusive; the
    /// executive and board thresholds must be exceeded.
    pub fn for_amount(amount: f64, config: &SummaryConfig) -> Self {
        if amount > config.board_approval_over {
            Self::Board
        } else if amount > config.executive_approval_over {
            Self::Executive
        } else if amount < config.auto_approve_under {
            Self::AutoApprove
        } else {
            Self::Management
        }
    }

    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoApprove => "auto_approve",
            Self::Management => "management",
            Self::Executive => "executive",
            Self::Board => "board",
        }
    }
}

impl fmt::Display for ApprovalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = SummaryConfig::default();
        assert_eq!(ApprovalTier::for_amount(0.0, &config), ApprovalTier::AutoApprove);
        assert_eq!(ApprovalTier::for_amount(49_999.0, &config), ApprovalTier::AutoApprove);
        assert_eq!(ApprovalTier::for_amount(50_000.0, &config), ApprovalTier::Management);
        assert_eq!(ApprovalTier::for_amount(1_000_000.0, &config), ApprovalTier::Management);
        assert_eq!(ApprovalTier::for_amount(1_000_001.0, &config), ApprovalTier::Executive);
        assert_eq!(ApprovalTier::for_amount(5_000_000.0, &config), ApprovalTier::Executive);
        assert_eq!(ApprovalTier::for_amount(5_000_001.0, &config), ApprovalTier::Board);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(ApprovalTier::Board > ApprovalTier::Executive);
        assert!(ApprovalTier::Management > ApprovalTier::AutoApprove);
        assert_eq!(ApprovalTier::Executive.to_string(), "executive");
    }
}
