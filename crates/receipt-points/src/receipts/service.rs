use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::ScoringConfig;

use super::domain::{Receipt, ReceiptId, ScoreState};
use super::ids::{IdGenerator, UuidGenerator};
use super::lookup::{await_settled, PollPolicy};
use super::points::PointsEngine;
use super::repository::{ReceiptEntry, ReceiptRepository, RepositoryError};
use super::spawner::{TaskSpawner, TokioSpawner};
use super::validation::{validate_receipt, ValidationFailure};

/// Service composing validation, the repository, and background scoring.
pub struct ReceiptService<R> {
    repository: Arc<R>,
    ids: Arc<dyn IdGenerator>,
    spawner: Arc<dyn TaskSpawner>,
    engine: PointsEngine,
    id_attempts: u32,
    poll: PollPolicy,
}

impl<R> ReceiptService<R>
where
    R: ReceiptRepository + 'static,
{
    /// Service backed by random UUIDs and tokio tasks.
    pub fn new(repository: Arc<R>, config: &ScoringConfig) -> Self {
        Self::with_parts(
            repository,
            Arc::new(UuidGenerator),
            Arc::new(TokioSpawner),
            config,
        )
    }

    pub fn with_parts(
        repository: Arc<R>,
        ids: Arc<dyn IdGenerator>,
        spawner: Arc<dyn TaskSpawner>,
        config: &ScoringConfig,
    ) -> Self {
        Self {
            repository,
            ids,
            spawner,
            engine: PointsEngine::new(),
            id_attempts: config.id_attempts.max(1),
            poll: PollPolicy::from(config),
        }
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    /// Validate and admit a receipt, returning its identifier once it is readable.
    ///
    /// Scoring is handed to the spawner and is never awaited here.
    pub fn submit(&self, receipt: Receipt) -> Result<ReceiptId, SubmitError> {
        let failures = validate_receipt(&receipt);
        if !failures.is_empty() {
            debug!(failures = failures.len(), "receipt rejected by validation");
            return Err(SubmitError::Rejected(failures));
        }

        let item_count = receipt.items.len();
        let entry = Arc::new(ReceiptEntry::new(receipt));

        for attempt in 1..=self.id_attempts {
            let id = self.ids.next_id();
            match self.repository.insert_if_absent(&id, Arc::clone(&entry)) {
                Ok(()) => {
                    self.schedule_scoring(id.clone(), entry);
                    info!(receipt_id = %id, item_count, "receipt admitted");
                    return Ok(id);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(receipt_id = %id, attempt, "receipt identifier collision");
                }
                Err(err) => {
                    error!(receipt_id = %id, error = %err, "receipt repository insert failed");
                    return Err(err.into());
                }
            }
        }

        error!(attempts = self.id_attempts, "receipt identifier generation exhausted");
        Err(SubmitError::AdmissionExhausted {
            attempts: self.id_attempts,
        })
    }

    fn schedule_scoring(&self, id: ReceiptId, entry: Arc<ReceiptEntry>) {
        let engine = self.engine;
        self.spawner.spawn(Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.total(entry.receipt())));
            match outcome {
                Ok(Ok(points)) => {
                    entry.complete(points);
                    debug!(receipt_id = %id, points, "receipt scored");
                }
                Ok(Err(err)) => {
                    entry.fail();
                    error!(receipt_id = %id, error = %err, "receipt scoring failed");
                }
                Err(_) => {
                    entry.fail();
                    error!(receipt_id = %id, "receipt scoring panicked");
                }
            }
        }));
    }

    /// Look up a stored receipt without waiting on its score.
    pub fn fetch(&self, id: &ReceiptId) -> Result<Receipt, LookupError> {
        let entry = self.entry(id)?;
        Ok(entry.receipt().clone())
    }

    /// Current score state, without waiting.
    pub fn score_state(&self, id: &ReceiptId) -> Result<ScoreState, LookupError> {
        Ok(self.entry(id)?.score_state())
    }

    /// Points for `id`, polling within the configured deadline while scoring is in flight.
    pub async fn points(&self, id: &ReceiptId) -> Result<u64, LookupError> {
        self.points_within(id, self.poll.deadline).await
    }

    /// Points for `id`, giving up with [`LookupError::NotReady`] once `deadline` passes.
    pub async fn points_within(
        &self,
        id: &ReceiptId,
        deadline: Duration,
    ) -> Result<u64, LookupError> {
        let entry = self.entry(id)?;
        let deadline = deadline.min(self.poll.deadline);

        match await_settled(&entry, &self.poll, deadline).await {
            ScoreState::Ready(points) => Ok(points),
            ScoreState::Failed => Err(LookupError::ScoringFailed),
            ScoreState::Pending => {
                debug!(receipt_id = %id, "points still pending after polling");
                Err(LookupError::NotReady)
            }
        }
    }

    fn entry(&self, id: &ReceiptId) -> Result<Arc<ReceiptEntry>, LookupError> {
        self.repository.fetch(id)?.ok_or(LookupError::NotFound)
    }
}

/// Error raised while admitting a receipt.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("receipt failed validation with {} failure(s)", .0.len())]
    Rejected(Vec<ValidationFailure>),
    #[error("failed to allocate a receipt identifier after {attempts} attempt(s)")]
    AdmissionExhausted { attempts: u32 },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SubmitError {
    /// Validation messages, one per line, for reporting back to the submitter.
    pub fn failure_report(&self) -> Option<String> {
        match self {
            SubmitError::Rejected(failures) => Some(
                failures
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }
}

/// Outcomes of reading a receipt or its points other than success.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("receipt not found")]
    NotFound,
    #[error("points are not ready yet, try again later")]
    NotReady,
    #[error("failed to calculate points")]
    ScoringFailed,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
