use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::payment::{InitiatePaymentRequest, InitiatePaymentResponse};
use crate::services::{GatewayError, PaymentError, PaymentService};

pub async fn initiate_payment(
    State(service): State<Arc<PaymentService>>,
    Json(payload): Json<Value>,
) -> Result<Json<InitiatePaymentResponse>, (StatusCode, Json<Value>)> {
    let request: InitiatePaymentRequest = match serde_json::from_value(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Invalid initiate request: {}", e);
            return Err(error_response(StatusCode::BAD_REQUEST, "Invalid request body"));
        }
    };

    info!("Initiating payment for user {}", request.user_id);

    match service
        .initiate(request.user_id, &request.phone, request.product_data.as_ref())
        .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!("Payment initiation failed: {}", e);
            let status = match &e {
                PaymentError::InvalidPhone | PaymentError::InvalidPrice => StatusCode::BAD_REQUEST,
                // the gateway turned the push down; the client must re-initiate
                PaymentError::Gateway(GatewayError::Rejected(_)) => StatusCode::BAD_REQUEST,
                PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
                PaymentError::PaymentNotFound => StatusCode::NOT_FOUND,
                PaymentError::MalformedCallback => StatusCode::BAD_REQUEST,
            };
            Err(error_response(status, &e.to_string()))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}
