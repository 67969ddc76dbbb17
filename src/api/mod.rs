//! Control API
//!
//! HTTP surface over the module registry: listing and lookup for operators,
//! start/stop actions routed to the actuator, and the ingestion endpoints the
//! relay posts telemetry to. Read and action endpoints always answer 200 and
//! report logical failures inside the `{result, content}` envelope.

pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{create_router, serve, ApiServer, AppState};
