use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::payment::StkCallback;
use crate::services::{PaymentError, PaymentService};

// The gateway retries on anything it reads as a delivery failure, so once a
// callback resolves to a payment the answer is 200 no matter what happened
// internally. Only malformed (400) and unresolvable (404) bodies differ.
pub async fn mpesa_callback(
    State(service): State<Arc<PaymentService>>,
    Json(payload): Json<Value>,
) -> StatusCode {
    let callback = match parse_callback(&payload) {
        Some(callback) => callback,
        None => {
            warn!("Malformed STK callback body");
            return StatusCode::BAD_REQUEST;
        }
    };

    match service.process_callback(&callback) {
        Ok(outcome) => {
            info!("STK callback processed: {:?}", outcome);
            StatusCode::OK
        }
        Err(PaymentError::MalformedCallback) => {
            warn!("STK callback missing checkout request id");
            StatusCode::BAD_REQUEST
        }
        Err(PaymentError::PaymentNotFound) => {
            warn!("STK callback for unknown checkout request id");
            StatusCode::NOT_FOUND
        }
        Err(e) => {
            error!("STK callback processing failed: {}", e);
            StatusCode::OK
        }
    }
}

fn parse_callback(payload: &Value) -> Option<StkCallback> {
    let stk = payload.get("Body")?.get("stkCallback")?;
    serde_json::from_value(stk.clone()).ok()
}
