use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::server::AppState;

/// Module read/action routes and the relay's ingestion routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/modules/list", get(handlers::list_modules))
        .route("/modules/:id", get(handlers::get_module))
        .route("/modules/:id/start", get(handlers::start_module))
        .route("/modules/:id/stop", get(handlers::stop_module))
        // Everything after the endpoint is code/value pairs
        .route("/moduleinfos/*fields", post(handlers::ingest_info))
        .route("/modulestats/*fields", post(handlers::ingest_stats))
}
