use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::domain::{Receipt, ReceiptId};
use super::repository::ReceiptRepository;
use super::service::ReceiptService;

/// Body returned after a receipt is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: ReceiptId,
}

/// Body returned for a settled score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsResponse {
    #[serde(rename = "point")]
    pub points: u64,
}

/// Router builder exposing the receipt intake and lookup endpoints.
pub fn receipt_router<R>(service: Arc<ReceiptService<R>>) -> Router
where
    R: ReceiptRepository + 'static,
{
    Router::new()
        .route("/v1/receipts/process", post(process_handler::<R>))
        .route("/v1/receipts/:id", get(receipt_handler::<R>))
        .route("/v1/receipts/:id/points", get(points_handler::<R>))
        .with_state(service)
}

pub(crate) async fn process_handler<R>(
    State(service): State<Arc<ReceiptService<R>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<IdResponse>), AppError>
where
    R: ReceiptRepository + 'static,
{
    let receipt: Receipt = serde_json::from_slice(&body)?;
    let id = service.submit(receipt)?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub(crate) async fn receipt_handler<R>(
    State(service): State<Arc<ReceiptService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Receipt>, AppError>
where
    R: ReceiptRepository + 'static,
{
    let receipt = service.fetch(&ReceiptId(id))?;
    Ok(Json(receipt))
}

pub(crate) async fn points_handler<R>(
    State(service): State<Arc<ReceiptService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, AppError>
where
    R: ReceiptRepository + 'static,
{
    let points = service.points(&ReceiptId(id)).await?;
    Ok(Json(PointsResponse { points }))
}
