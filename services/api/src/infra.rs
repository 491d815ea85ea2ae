use metrics_exporter_prometheus::PrometheusHandle;
use receipt_points::config::ScoringConfig;
use receipt_points::receipts::{ReceiptService, ShardedReceiptRepository};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_receipt_service(
    config: &ScoringConfig,
) -> Arc<ReceiptService<ShardedReceiptRepository>> {
    let repository = Arc::new(ShardedReceiptRepository::new(config.store_shards));
    Arc::new(ReceiptService::new(repository, config))
}
