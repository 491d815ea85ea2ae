//! Receipt intake, background scoring, and points lookup.

pub mod domain;
pub mod ids;
pub mod lookup;
pub mod points;
pub mod repository;
pub mod router;
pub mod service;
pub mod spawner;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{Item, Receipt, ReceiptId, ScoreState};
pub use ids::{IdGenerator, UuidGenerator};
pub use lookup::PollPolicy;
pub use points::{PointsBreakdown, PointsEngine, PointsRule, ScoreComponent, ScoringError};
pub use repository::{ReceiptEntry, ReceiptRepository, RepositoryError, ShardedReceiptRepository};
pub use router::{receipt_router, IdResponse, PointsResponse};
pub use service::{LookupError, ReceiptService, SubmitError};
pub use spawner::{ScoreJob, TaskSpawner, TokioSpawner};
pub use validation::{validate_receipt, FailureKind, ValidationFailure};
