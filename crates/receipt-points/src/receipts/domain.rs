use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle returned when a receipt is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub String);

impl ReceiptId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Purchase record as submitted on the wire.
///
/// Dates, times, and amounts keep the submitted text verbatim so a stored receipt reads
/// back byte-for-byte. Parsing happens in validation and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub retailer: String,
    pub purchase_date: String,
    pub purchase_time: String,
    pub items: Vec<Item>,
    pub total: String,
}

/// Single line on a receipt. Item order is significant for scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub short_description: String,
    pub price: String,
}

/// Lifecycle of the background points computation for one receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreState {
    Pending,
    Ready(u64),
    Failed,
}

impl ScoreState {
    pub const fn is_settled(self) -> bool {
        !matches!(self, ScoreState::Pending)
    }
}
