use axum::{extract::State, response::Json};
use std::sync::Arc;

use crate::services::PaymentService;

pub async fn get_metrics(
    State(service): State<Arc<PaymentService>>,
) -> Json<serde_json::Value> {
    Json(service.get_metrics())
}
