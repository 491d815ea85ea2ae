use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Arc, OnceLock, RwLock};

use super::domain::{Receipt, ReceiptId, ScoreState};

/// Stored receipt plus the cell its scoring job settles exactly once.
#[derive(Debug)]
pub struct ReceiptEntry {
    receipt: Receipt,
    outcome: OnceLock<Settled>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Ready(u64),
    Failed,
}

impl ReceiptEntry {
    /// New entries always start out pending.
    pub fn new(receipt: Receipt) -> Self {
        Self {
            receipt,
            outcome: OnceLock::new(),
        }
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    pub fn score_state(&self) -> ScoreState {
        match self.outcome.get() {
            None => ScoreState::Pending,
            Some(Settled::Ready(points)) => ScoreState::Ready(*points),
            Some(Settled::Failed) => ScoreState::Failed,
        }
    }

    /// Moves pending to ready. Returns `false` if the score was already settled.
    pub fn complete(&self, points: u64) -> bool {
        self.outcome.set(Settled::Ready(points)).is_ok()
    }

    /// Moves pending to failed. Returns `false` if the score was already settled.
    pub fn fail(&self) -> bool {
        self.outcome.set(Settled::Failed).is_ok()
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Entries are write-once per identifier: `insert_if_absent` never replaces an existing
/// entry.
pub trait ReceiptRepository: Send + Sync {
    fn insert_if_absent(
        &self,
        id: &ReceiptId,
        entry: Arc<ReceiptEntry>,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReceiptId) -> Result<Option<Arc<ReceiptEntry>>, RepositoryError>;
    fn len(&self) -> Result<usize, RepositoryError>;

    fn is_empty(&self) -> Result<bool, RepositoryError> {
        self.len().map(|len| len == 0)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

type Shard = RwLock<HashMap<ReceiptId, Arc<ReceiptEntry>>>;

/// In-memory table split into independently locked shards.
///
/// Identifiers hash to one shard, so writers for different identifiers rarely contend and
/// readers only ever take a shared lock.
pub struct ShardedReceiptRepository {
    shards: Box<[Shard]>,
    hasher: RandomState,
}

impl ShardedReceiptRepository {
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, id: &ReceiptId) -> &Shard {
        let index = (self.hasher.hash_one(id) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl Default for ShardedReceiptRepository {
    fn default() -> Self {
        Self::new(16)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("receipt shard lock poisoned".to_string())
}

impl ReceiptRepository for ShardedReceiptRepository {
    fn insert_if_absent(
        &self,
        id: &ReceiptId,
        entry: Arc<ReceiptEntry>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.shard_for(id).write().map_err(|_| poisoned())?;
        match guard.entry(id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    fn fetch(&self, id: &ReceiptId) -> Result<Option<Arc<ReceiptEntry>>, RepositoryError> {
        let guard = self.shard_for(id).read().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn len(&self) -> Result<usize, RepositoryError> {
        self.shards.iter().try_fold(0, |total, shard| {
            let guard = shard.read().map_err(|_| poisoned())?;
            Ok(total + guard.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipts::domain::Item;

    fn receipt(retailer: &str) -> Receipt {
        Receipt {
            retailer: retailer.to_string(),
            purchase_date: "2022-01-01".to_string(),
            purchase_time: "13:01".to_string(),
            items: vec![Item {
                short_description: "Gatorade".to_string(),
                price: "2.25".to_string(),
            }],
            total: "2.25".to_string(),
        }
    }

    #[test]
    fn entry_transitions_exactly_once() {
        let entry = ReceiptEntry::new(receipt("Target"));
        assert_eq!(entry.score_state(), ScoreState::Pending);

        assert!(entry.complete(42));
        assert!(!entry.fail());
        assert!(!entry.complete(7));
        assert_eq!(entry.score_state(), ScoreState::Ready(42));
    }

    #[test]
    fn failed_entry_stays_failed() {
        let entry = ReceiptEntry::new(receipt("Target"));
        assert!(entry.fail());
        assert!(!entry.complete(10));
        assert_eq!(entry.score_state(), ScoreState::Failed);
    }

    #[test]
    fn insert_if_absent_never_overwrites() {
        let repository = ShardedReceiptRepository::new(4);
        let id = ReceiptId("fixed".to_string());

        repository
            .insert_if_absent(&id, Arc::new(ReceiptEntry::new(receipt("First"))))
            .expect("first insert succeeds");
        let second =
            repository.insert_if_absent(&id, Arc::new(ReceiptEntry::new(receipt("Second"))));

        assert!(matches!(second, Err(RepositoryError::Conflict)));
        let stored = repository
            .fetch(&id)
            .expect("fetch succeeds")
            .expect("entry present");
        assert_eq!(stored.receipt().retailer, "First");
        assert_eq!(repository.len().expect("len"), 1);
    }

    #[test]
    fn entries_spread_across_shards_are_all_counted() {
        let repository = ShardedReceiptRepository::new(8);
        for n in 0..64 {
            let id = ReceiptId(format!("receipt-{n}"));
            repository
                .insert_if_absent(&id, Arc::new(ReceiptEntry::new(receipt("Target"))))
                .expect("insert");
        }

        assert_eq!(repository.len().expect("len"), 64);
        assert!(repository
            .fetch(&ReceiptId("receipt-63".to_string()))
            .expect("fetch")
            .is_some());
        assert!(repository
            .fetch(&ReceiptId("missing".to_string()))
            .expect("fetch")
            .is_none());
    }

    #[test]
    fn zero_shards_falls_back_to_one() {
        let repository = ShardedReceiptRepository::new(0);
        assert_eq!(repository.shard_count(), 1);
        assert!(repository.is_empty().expect("is_empty"));
    }
}
