use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::services::PaymentService;

// Clients poll this while the gateway callback is in flight.
pub async fn payment_status(
    State(service): State<Arc<PaymentService>>,
    Path(checkout_request_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    match service.status(&checkout_request_id) {
        Some((status, payment_id)) => Ok(Json(json!({
            "status": status.as_str(),
            "paymentId": payment_id,
        }))),
        None => Err(StatusCode::NOT_FOUND),
    }
}
