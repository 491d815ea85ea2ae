use uuid::Uuid;

use super::domain::ReceiptId;

/// Source of fresh receipt identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> ReceiptId;
}

/// Random 128-bit identifiers rendered as hyphenated UUID text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> ReceiptId {
        ReceiptId(Uuid::new_v4().to_string())
    }
}
