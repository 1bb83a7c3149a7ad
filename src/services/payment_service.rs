use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::payment::{
    InitiatePaymentResponse, Payment, PaymentStatus, StkCallback,
};
use crate::models::product::{Product, StagedProduct};
use crate::services::atomic_metrics::AtomicMetrics;
use crate::services::mpesa_client::{GatewayError, StkGateway};
use crate::store::{PaymentStore, ProductStore};
use crate::utils::{money, phone};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid phone number")]
    InvalidPhone,
    #[error("Invalid product price")]
    InvalidPrice,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("Malformed callback body")]
    MalformedCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Completed,
    Failed,
    AlreadyFinal,
}

pub struct PaymentService {
    payments: Arc<PaymentStore>,
    products: Arc<ProductStore>,
    gateway: Arc<dyn StkGateway>,
    metrics: Arc<AtomicMetrics>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<PaymentStore>,
        products: Arc<ProductStore>,
        gateway: Arc<dyn StkGateway>,
    ) -> Self {
        Self {
            payments,
            products,
            gateway,
            metrics: Arc::new(AtomicMetrics::new()),
        }
    }

    // Validates the request, stages the product payload, charges the posting
    // fee via STK push and hands back the gateway tracking id. Nothing is
    // written to the store until validation has passed.
    pub async fn initiate(
        &self,
        user_id: String,
        phone_number: &str,
        product_data: Option<&Value>,
    ) -> Result<InitiatePaymentResponse, PaymentError> {
        if !phone::is_valid_phone(phone_number) {
            return Err(PaymentError::InvalidPhone);
        }

        let staged = product_data.map(StagedProduct::from_value);
        let effective = staged
            .as_ref()
            .and_then(|s| money::effective_price(s.price, s.discount_price))
            .filter(|price| *price > 0.0)
            .ok_or(PaymentError::InvalidPrice)?;
        let amount = money::posting_fee(effective);

        let payment = Payment {
            id: Uuid::new_v4(),
            user_id,
            amount,
            status: PaymentStatus::Pending,
            checkout_request_id: None,
            staged_product: staged,
            created_at: Utc::now(),
        };
        let payment_id = payment.id;
        self.payments.insert(payment);
        self.metrics.increment_initiated();

        let msisdn = phone::to_msisdn(phone_number);
        let reference = format!("Payment_{payment_id}");

        let outcome = match self.gateway.stk_push(&msisdn, amount, &reference).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // A payment the gateway never accepted is failed, not left
                // pending forever.
                if self.payments.fail_if_pending(payment_id) {
                    self.metrics.increment_failed();
                }
                error!("STK push for payment {} failed: {}", payment_id, e);
                return Err(e.into());
            }
        };

        if !self.payments.set_checkout_id(payment_id, &outcome.checkout_request_id) {
            warn!(
                "Checkout id {} already recorded, keeping existing mapping",
                outcome.checkout_request_id
            );
        }
        info!(
            "Payment {} accepted by gateway ({}), checkout id {}",
            payment_id, outcome.response_description, outcome.checkout_request_id
        );

        Ok(InitiatePaymentResponse {
            payment_id,
            checkout_request_id: outcome.checkout_request_id,
        })
    }

    // Resolves a gateway callback to a payment and applies the single-shot
    // state transition. A redelivered callback finds the payment already
    // terminal and changes nothing.
    pub fn process_callback(&self, callback: &StkCallback) -> Result<CallbackOutcome, PaymentError> {
        let checkout_request_id = callback
            .checkout_request_id
            .as_deref()
            .ok_or(PaymentError::MalformedCallback)?;

        let payment = self
            .payments
            .find_by_checkout_id(checkout_request_id)
            .ok_or(PaymentError::PaymentNotFound)?;

        if callback.result_code == 0 {
            match self.payments.complete_if_pending(payment.id) {
                Some(completed) => {
                    self.metrics.increment_completed();
                    match receipt_number(callback) {
                        Some(receipt) => info!("Payment {} completed, receipt {}", completed.id, receipt),
                        None => info!("Payment {} completed", completed.id),
                    }
                    if let Some(staged) = completed.staged_product.as_ref() {
                        self.materialize_product(staged, &completed.user_id, completed.id);
                    }
                    Ok(CallbackOutcome::Completed)
                }
                None => {
                    info!(
                        "Payment {} already finalized, ignoring duplicate callback",
                        payment.id
                    );
                    Ok(CallbackOutcome::AlreadyFinal)
                }
            }
        } else if self.payments.fail_if_pending(payment.id) {
            self.metrics.increment_failed();
            info!(
                "Payment {} failed: result code {} ({})",
                payment.id,
                callback.result_code,
                callback.result_desc.as_deref().unwrap_or("no description")
            );
            Ok(CallbackOutcome::Failed)
        } else {
            info!(
                "Payment {} already finalized, ignoring duplicate callback",
                payment.id
            );
            Ok(CallbackOutcome::AlreadyFinal)
        }
    }

    pub fn status(&self, checkout_request_id: &str) -> Option<(PaymentStatus, Uuid)> {
        self.payments
            .find_by_checkout_id(checkout_request_id)
            .map(|payment| (payment.status, payment.id))
    }

    pub fn get_metrics(&self) -> Value {
        serde_json::json!({
            "payments": {
                "total": self.payments.len(),
                "initiated": self.metrics.get_initiated(),
                "completed": self.metrics.get_completed(),
                "failed": self.metrics.get_failed(),
            },
            "products": {
                "total": self.products.len(),
                "created_from_payments": self.metrics.get_products_created(),
            },
        })
    }

    // Payment success is authoritative; a product that cannot be built is
    // logged and dropped, never unwound into the payment status.
    fn materialize_product(&self, staged: &StagedProduct, seller_id: &str, payment_id: Uuid) {
        match Product::from_staged(staged, seller_id) {
            Ok(product) => {
                info!("Payment {} materialized product {}", payment_id, product.id);
                self.products.insert(product);
                self.metrics.increment_products_created();
            }
            Err(e) => {
                error!(
                    "Product materialization for payment {} failed: {}",
                    payment_id, e
                );
            }
        }
    }
}

// Successful callbacks carry a metadata item list with the receipt number.
fn receipt_number(callback: &StkCallback) -> Option<String> {
    let items = callback.callback_metadata.as_ref()?.get("Item")?.as_array()?;
    items.iter().find_map(|item| {
        if item.get("Name").and_then(Value::as_str) == Some("MpesaReceiptNumber") {
            item.get("Value").and_then(Value::as_str).map(str::to_string)
        } else {
            None
        }
    })
}
