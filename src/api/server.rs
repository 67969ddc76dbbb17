use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware, routes};
use crate::actuator::{CommandSender, ZmqActuator};
use crate::config::ServerConfig;
use crate::registry::ModuleRegistry;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModuleRegistry>,
    pub actuator: Arc<dyn CommandSender>,
}

impl AppState {
    pub fn new(registry: Arc<ModuleRegistry>, actuator: Arc<dyn CommandSender>) -> Self {
        Self { registry, actuator }
    }
}

/// Control API server instance
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Server with a fresh registry and the ZeroMQ actuator
    pub fn new(config: ServerConfig) -> Self {
        let actuator = Arc::new(ZmqActuator::new(&config.actuator));
        let state = AppState::new(Arc::new(ModuleRegistry::new()), actuator);
        Self { config, state }
    }

    /// Bind and serve until the process is stopped
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Control API listening on {}", addr);
        serve(listener, self.state).await
    }
}

/// Serve the API on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, create_router(state))
        .await
        .context("Server error")
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let [cache_control, pragma, expires] = middleware::no_cache_layers();

    Router::new()
        .route("/", get(handlers::hello))
        .route("/health", get(handlers::health))
        .merge(routes::api_routes())
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::cors_layer())
        // Outside CORS so preflight answers carry the headers too
        .layer(cache_control)
        .layer(pragma)
        .layer(expires)
        .layer(middleware::last_modified_layer())
        .layer(TraceLayer::new_for_http())
}
