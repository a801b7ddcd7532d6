//! Application startup and lifecycle management.

use crate::config::Config;
use crate::handlers;
use crate::models::Product;
use crate::services::{PaymentRepository, TransactionService, TripayClient};
use anyhow::Context;
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransactionService>,
}

/// Build the HTTP router. Kept separate from [`Application::build`] so tests
/// can drive it with any store and gateway.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/transaction/buy", post(handlers::transactions::buy))
        .route(
            "/transaction/webhook/tripay",
            post(handlers::transactions::tripay_webhook),
        )
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// Parse a product seed file: a JSON array of `{id, name, price}`.
pub fn parse_product_seed(raw: &str) -> anyhow::Result<Vec<Product>> {
    serde_json::from_str(raw).context("product seed must be a JSON array of products")
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                e
            })?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let repository = PaymentRepository::new(&db);
        repository.init_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        if let Some(path) = &config.product_seed_path {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read product seed {}", path))?;
            repository.seed_products(&parse_product_seed(&raw)?).await?;
        }

        let tripay = TripayClient::new(config.tripay.clone())?;
        if tripay.is_configured() {
            tracing::info!(base_url = %tripay.base_url(), "Tripay client initialized");
        } else {
            tracing::warn!("Tripay credentials not configured - invoice creation will fail");
        }

        let service = TransactionService::new(
            Arc::new(repository),
            Arc::new(tripay),
            config.tripay.private_key.clone(),
            config.return_url.clone(),
            config.webhook.timeout(),
        );

        let state = AppState {
            service: Arc::new(service),
        };

        // Port 0 binds a random port.
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Transaction service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
