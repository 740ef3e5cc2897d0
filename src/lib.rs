pub mod adapters;
pub mod amount;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod paylike;
pub mod ports;
pub mod services;
pub mod signature;
pub mod utils;
pub mod validation;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::InMemoryOrderStore;
use crate::config::{Config, ConfigurationError, GatewaySettings, SecretKey, SiteUrls};
use crate::error::GatewayError;
use crate::paylike::{PaylikeClient, TransactionApi};
use crate::services::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub orders: Arc<InMemoryOrderStore>,
    pub settings: Arc<GatewaySettings>,
    pub urls: SiteUrls,
    pub admin_api_key: Option<SecretKey>,
}

impl AppState {
    /// Wires the gateway to the live processor client.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let gateway_config = config.gateway.resolve()?;
        let api = Arc::new(PaylikeClient::new(&gateway_config)?);
        Ok(Self::with_api(config, api)?)
    }

    pub fn with_api(
        config: &Config,
        api: Arc<dyn TransactionApi>,
    ) -> Result<Self, ConfigurationError> {
        let gateway_config = config.gateway.resolve()?;
        let orders = Arc::new(InMemoryOrderStore::new());
        let gateway = Gateway::new(gateway_config, api, orders.clone());

        Ok(Self {
            gateway: Arc::new(gateway),
            orders,
            settings: Arc::new(config.gateway.clone()),
            urls: config.urls(),
            admin_api_key: config.admin_api_key.clone(),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let admin = Router::new()
        .route("/orders/:id/capture", post(handlers::admin::capture))
        .route("/orders/:id/refund", post(handlers::admin::refund))
        .route("/orders/:id/status", post(handlers::admin::change_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/orders", post(handlers::checkout::create_order))
        .route("/orders/:id/receipt", get(handlers::checkout::receipt))
        .route("/orders/:id/payment", post(handlers::checkout::pay))
        .route(
            "/paylike/return",
            get(handlers::return_callback::payment_return),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .merge(admin)
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
