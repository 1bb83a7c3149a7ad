mod app;
mod handlers;
mod models;
mod services;
mod store;
mod utils;

use app::config::Config;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use services::{MpesaClient, PaymentService};
use std::sync::Arc;
use store::{PaymentStore, ProductStore};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    info!("Starting sokoni backend on port {}", config.server_port);

    let payments = Arc::new(PaymentStore::new());
    let products = Arc::new(ProductStore::new());
    let gateway = Arc::new(MpesaClient::new(&config));

    let payment_service = Arc::new(PaymentService::new(payments, products, gateway));

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/payment/initiate", post(handlers::payments::initiate_payment))
        .route("/api/payment/callback", post(handlers::callback::mpesa_callback))
        .route(
            "/api/payment/status/:checkout_request_id",
            get(handlers::status::payment_status),
        )
        .route("/metrics", get(handlers::metrics::get_metrics))
        .with_state(payment_service);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}
