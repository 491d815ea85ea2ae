mod rules;

pub use rules::PointsRule;

use super::domain::Receipt;
use serde::Serialize;

/// Stateless evaluator applying the reward rules to a validated receipt.
///
/// Each rule reads only the receipt, never another rule's contribution, so the breakdown
/// is the same whatever order the rules run in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsEngine;

impl PointsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, receipt: &Receipt) -> Result<PointsBreakdown, ScoringError> {
        let facts = rules::ReceiptFacts::extract(receipt)?;

        let mut components = Vec::new();
        let mut total: u64 = 0;
        for rule in PointsRule::ALL {
            let (points, notes) = rule.apply(&facts)?;
            if points == 0 {
                continue;
            }
            total = total.checked_add(points).ok_or(ScoringError::Overflow)?;
            components.push(ScoreComponent {
                rule,
                points,
                notes,
            });
        }

        Ok(PointsBreakdown { total, components })
    }

    pub fn total(&self, receipt: &Receipt) -> Result<u64, ScoringError> {
        self.score(receipt).map(|breakdown| breakdown.total)
    }
}

/// Contribution of a single rule, kept for audits and the CLI report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub rule: PointsRule,
    pub points: u64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsBreakdown {
    pub total: u64,
    pub components: Vec<ScoreComponent>,
}

impl PointsBreakdown {
    pub fn points_for(&self, rule: PointsRule) -> u64 {
        self.components
            .iter()
            .filter(|component| component.rule == rule)
            .map(|component| component.points)
            .sum()
    }
}

/// Raised when a field that validation accepted cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("total '{0}' is not a decimal amount")]
    Total(String),
    #[error("price '{value}' of item ({index}) is not a decimal amount")]
    ItemPrice { index: usize, value: String },
    #[error("purchaseDate '{0}' is not a calendar date")]
    PurchaseDate(String),
    #[error("purchaseTime '{0}' is not a time of day")]
    PurchaseTime(String),
    #[error("points total overflowed")]
    Overflow,
}
