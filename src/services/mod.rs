pub mod atomic_metrics;
pub mod mpesa_client;
pub mod payment_service;

pub use mpesa_client::{GatewayError, MpesaClient, StkGateway};
pub use payment_service::{CallbackOutcome, PaymentError, PaymentService};
