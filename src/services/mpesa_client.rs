use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use crate::app::config::Config;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway auth failure: {0}")]
    AuthFailure(String),
    #[error("gateway unreachable: {0}")]
    Unreachable(String),
    #[error("gateway rejected request: {0}")]
    Rejected(String),
    #[error("unexpected gateway response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone)]
pub struct StkPushOutcome {
    pub checkout_request_id: String,
    pub response_description: String,
}

// Seam between the payment service and the mobile-money gateway; the
// service is tested against a mock implementation.
#[async_trait]
pub trait StkGateway: Send + Sync {
    async fn stk_push(
        &self,
        msisdn: &str,
        amount: u64,
        account_reference: &str,
    ) -> Result<StkPushOutcome, GatewayError>;
}

pub struct MpesaClient {
    client: Client,
    config: Config,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct StkPushPayload<'a> {
    #[serde(rename = "BusinessShortCode")]
    business_short_code: &'a str,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "TransactionType")]
    transaction_type: &'a str,
    #[serde(rename = "Amount")]
    amount: u64,
    #[serde(rename = "PartyA")]
    party_a: &'a str,
    #[serde(rename = "PartyB")]
    party_b: &'a str,
    #[serde(rename = "PhoneNumber")]
    phone_number: &'a str,
    #[serde(rename = "CallBackURL")]
    callback_url: &'a str,
    #[serde(rename = "AccountReference")]
    account_reference: &'a str,
    #[serde(rename = "TransactionDesc")]
    transaction_desc: &'a str,
}

#[derive(Debug, Deserialize)]
struct StkPushResponse {
    #[serde(rename = "ResponseCode")]
    response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    response_description: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: Option<String>,
}

impl MpesaClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.gateway_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
        }
    }

    async fn fetch_access_token(&self) -> Result<String, GatewayError> {
        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.config.mpesa_base_url
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(
                &self.config.mpesa_consumer_key,
                Some(&self.config.mpesa_consumer_secret),
            )
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            warn!("Token endpoint returned HTTP {}", response.status());
            return Err(GatewayError::AuthFailure(format!(
                "token endpoint returned HTTP {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::AuthFailure(format!("malformed token response: {e}")))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl StkGateway for MpesaClient {
    async fn stk_push(
        &self,
        msisdn: &str,
        amount: u64,
        account_reference: &str,
    ) -> Result<StkPushOutcome, GatewayError> {
        let access_token = self.fetch_access_token().await?;
        let timestamp = stk_timestamp(Utc::now());
        let password = stk_password(
            &self.config.mpesa_short_code,
            &self.config.mpesa_passkey,
            &timestamp,
        );

        let payload = StkPushPayload {
            business_short_code: &self.config.mpesa_short_code,
            password,
            timestamp,
            transaction_type: "CustomerPayBillOnline",
            amount,
            party_a: msisdn,
            party_b: &self.config.mpesa_short_code,
            phone_number: msisdn,
            callback_url: &self.config.mpesa_callback_url,
            account_reference,
            transaction_desc: "Product Posting Payment",
        };

        let url = format!(
            "{}/mpesa/stkpush/v1/processrequest",
            self.config.mpesa_base_url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            error!("STK push returned HTTP {}", response.status());
            return Err(GatewayError::Rejected(format!(
                "push endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: StkPushResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        match body.response_code.as_deref() {
            Some("0") => {}
            Some(code) => {
                let desc = body
                    .response_description
                    .unwrap_or_else(|| format!("response code {code}"));
                error!("STK push rejected: {}", desc);
                return Err(GatewayError::Rejected(desc));
            }
            None => {
                return Err(GatewayError::MalformedResponse(
                    "missing ResponseCode".to_string(),
                ))
            }
        }

        let checkout_request_id = body.checkout_request_id.ok_or_else(|| {
            GatewayError::MalformedResponse("missing CheckoutRequestID".to_string())
        })?;

        Ok(StkPushOutcome {
            checkout_request_id,
            response_description: body.response_description.unwrap_or_default(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Unreachable(format!("request timed out: {err}"))
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}

// Gateway timestamp format: yyyyMMddHHmmss.
pub fn stk_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

// base64(shortcode + passkey + timestamp), the password field of the push.
pub fn stk_password(short_code: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{short_code}{passkey}{timestamp}"))
}
