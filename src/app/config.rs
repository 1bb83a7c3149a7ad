use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub mpesa_base_url: String,
    pub mpesa_consumer_key: String,
    pub mpesa_consumer_secret: String,
    pub mpesa_short_code: String,
    pub mpesa_passkey: String,
    pub mpesa_callback_url: String,
    pub gateway_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            mpesa_base_url: env::var("MPESA_PROCESSING_URL")
                .unwrap_or_else(|_| "https://sandbox.safaricom.co.ke".to_string()),
            mpesa_consumer_key: env::var("MPESA_CONSUMER_KEY").unwrap_or_default(),
            mpesa_consumer_secret: env::var("MPESA_SECRET_KEY").unwrap_or_default(),
            mpesa_short_code: env::var("MPESA_SHORT_CODE")
                .unwrap_or_else(|_| "174379".to_string()),
            mpesa_passkey: env::var("MPESA_PASSKEY").unwrap_or_default(),
            mpesa_callback_url: env::var("MPESA_CALLBACK_URL")
                .unwrap_or_else(|_| "https://example.com/api/payment/callback".to_string()),
            gateway_timeout_ms: env::var("GATEWAY_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
        }
    }
}
