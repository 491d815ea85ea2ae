use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::receipts::domain::{Item, Receipt, ReceiptId};
use crate::receipts::ids::IdGenerator;
use crate::receipts::repository::{
    ReceiptEntry, ReceiptRepository, RepositoryError, ShardedReceiptRepository,
};
use crate::receipts::service::ReceiptService;
use crate::receipts::spawner::{ScoreJob, TaskSpawner};

fn item(description: &str, price: &str) -> Item {
    Item {
        short_description: description.to_string(),
        price: price.to_string(),
    }
}

/// Five items at Target, worth 28 points.
pub(super) fn target_receipt() -> Receipt {
    Receipt {
        retailer: "Target".to_string(),
        purchase_date: "2022-01-01".to_string(),
        purchase_time: "13:01".to_string(),
        items: vec![
            item("Mountain Dew 12PK", "6.49"),
            item("Emils Cheese Pizza", "12.25"),
            item("Knorr Creamy Chicken", "1.26"),
            item("Doritos Nacho Cheese", "3.35"),
            item("   Klarbrunn 12-PK 12 FL OZ  ", "12.00"),
        ],
        total: "35.35".to_string(),
    }
}

/// Four Gatorades at M&M Corner Market, worth 109 points.
pub(super) fn corner_market_receipt() -> Receipt {
    Receipt {
        retailer: "M&M Corner Market".to_string(),
        purchase_date: "2022-03-20".to_string(),
        purchase_time: "14:33".to_string(),
        items: vec![item("Gatorade", "2.25"); 4],
        total: "9.00".to_string(),
    }
}

/// Minimal receipt whose score depends only on the retailer, date, time, and total.
pub(super) fn single_item_receipt(total: &str, purchase_time: &str) -> Receipt {
    Receipt {
        retailer: "Shop".to_string(),
        purchase_date: "2022-01-02".to_string(),
        purchase_time: purchase_time.to_string(),
        items: vec![item("Milk", total)],
        total: total.to_string(),
    }
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig {
        poll_attempts: 3,
        poll_interval: Duration::from_millis(1),
        poll_deadline: Duration::from_millis(200),
        id_attempts: 3,
        store_shards: 4,
    }
}

/// Holds scoring jobs until the test releases them.
#[derive(Default, Clone)]
pub(super) struct ManualSpawner {
    jobs: Arc<Mutex<Vec<ScoreJob>>>,
}

impl ManualSpawner {
    pub(super) fn queued(&self) -> usize {
        self.jobs.lock().expect("spawner mutex poisoned").len()
    }

    pub(super) fn run_all(&self) {
        let jobs = std::mem::take(&mut *self.jobs.lock().expect("spawner mutex poisoned"));
        for job in jobs {
            job();
        }
    }
}

impl TaskSpawner for ManualSpawner {
    fn spawn(&self, job: ScoreJob) {
        self.jobs.lock().expect("spawner mutex poisoned").push(job);
    }
}

/// Hands out a scripted sequence of identifiers, repeating the last one.
pub(super) struct ScriptedIds {
    ids: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedIds {
    pub(super) fn new(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
            last: Mutex::new(String::from("exhausted")),
        }
    }
}

impl IdGenerator for ScriptedIds {
    fn next_id(&self) -> ReceiptId {
        let mut last = self.last.lock().expect("ids mutex poisoned");
        if let Some(next) = self.ids.lock().expect("ids mutex poisoned").pop_front() {
            *last = next;
        }
        ReceiptId(last.clone())
    }
}

pub(super) fn build_service(
    ids: Arc<dyn IdGenerator>,
) -> (
    ReceiptService<ShardedReceiptRepository>,
    Arc<ShardedReceiptRepository>,
    ManualSpawner,
) {
    let repository = Arc::new(ShardedReceiptRepository::new(4));
    let spawner = ManualSpawner::default();
    let service = ReceiptService::with_parts(
        repository.clone(),
        ids,
        Arc::new(spawner.clone()),
        &scoring_config(),
    );
    (service, repository, spawner)
}

pub(super) struct UnavailableRepository;

impl ReceiptRepository for UnavailableRepository {
    fn insert_if_absent(
        &self,
        _id: &ReceiptId,
        _entry: Arc<ReceiptEntry>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReceiptId) -> Result<Option<Arc<ReceiptEntry>>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn len(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
