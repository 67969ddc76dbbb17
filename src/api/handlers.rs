use axum::{
    extract::{OriginalUri, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};

use super::ingest;
use super::models::{ApiError, Envelope, HealthResponse, UnknownModule};
use super::server::AppState;
use crate::actuator::ModuleCommand;
use crate::error::SupervisorError;
use crate::registry::ModuleId;
use crate::telemetry::MessageKind;

/// Liveness probe kept from the first supervisor UI
pub async fn hello() -> &'static str {
    "Hello World!"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "vmi-supervisor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `{id, name}` of every known module
pub async fn list_modules(State(state): State<AppState>) -> impl IntoResponse {
    Json(Envelope::ok(state.registry.list().await))
}

/// Full snapshot of one module
pub async fn get_module(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(id) = parse_module_id(&id) else {
        return not_found_response();
    };
    match state.registry.get(id).await {
        Ok(module) => Json(Envelope::ok(module)).into_response(),
        Err(_) => unknown_module(id),
    }
}

pub async fn start_module(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match parse_module_id(&id) {
        Some(id) => actuate(state, id, ModuleCommand::Start).await,
        None => not_found_response(),
    }
}

pub async fn stop_module(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match parse_module_id(&id) {
        Some(id) => actuate(state, id, ModuleCommand::Stop).await,
        None => not_found_response(),
    }
}

/// Send `command` to module `id` and answer with its snapshot
///
/// Whether the command reached the module is not reported: the caller gets
/// the same answer when the module is unreachable.
async fn actuate(state: AppState, id: ModuleId, command: ModuleCommand) -> Response {
    let module = match state.registry.get(id).await {
        Ok(module) => module,
        Err(_) => return unknown_module(id),
    };

    let outcome = match module.control_endpoint() {
        Some((ip, port)) => {
            let actuator = state.actuator.clone();
            let ip = ip.to_string();
            tokio::task::spawn_blocking(move || actuator.send(&ip, port, command))
                .await
                .unwrap_or_else(|e| Err(SupervisorError::ActuationFailure(e.to_string())))
        },
        None => Err(SupervisorError::ActuationFailure(format!(
            "module {} has not announced a control endpoint",
            id
        ))),
    };

    match outcome {
        Ok(()) => {
            crate::log_module_operation!(command.as_str(), id);
        },
        Err(e) => {
            crate::log_error!(e, "actuating module command");
        },
    }

    Json(Envelope::ok(module)).into_response()
}

/// Identity/configuration update posted by the relay
pub async fn ingest_info(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    match ingest::parse_info(raw_fields(&uri, MessageKind::Info)) {
        Ok(update) => {
            let module = state.registry.apply_info(update).await;
            crate::log_module_operation!("info", module.id);
            StatusCode::OK.into_response()
        },
        Err(e) => invalid_ingestion(e),
    }
}

/// Statistics update posted by the relay
pub async fn ingest_stats(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    match ingest::parse_stats(raw_fields(&uri, MessageKind::Stats)) {
        Ok(update) => {
            let module = state.registry.apply_stats(update).await;
            tracing::debug!(module_id = module.id, fps = module.stats.fps, "Stats applied");
            StatusCode::OK.into_response()
        },
        Err(e) => invalid_ingestion(e),
    }
}

pub async fn not_found() -> Response {
    not_found_response()
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::error(ApiError {
            error: "Not found".to_string(),
            code: "NOT_FOUND".to_string(),
        })),
    )
        .into_response()
}

fn parse_module_id(raw: &str) -> Option<ModuleId> {
    raw.parse().ok()
}

/// Still-encoded code/value segments following the ingestion endpoint
///
/// The path extractor decodes before the segments can be split, which would
/// cut a value holding `%2F` in two.
fn raw_fields(uri: &Uri, kind: MessageKind) -> &str {
    let path = uri.path().trim_start_matches('/');
    path.strip_prefix(kind.endpoint()).unwrap_or(path)
}

fn unknown_module(id: ModuleId) -> Response {
    tracing::debug!(module_id = id, "Lookup of unknown module");
    Json(Envelope::ok(UnknownModule::new(id))).into_response()
}

fn invalid_ingestion(e: SupervisorError) -> Response {
    tracing::warn!(error = %e, "Rejected ingestion request");
    (
        StatusCode::BAD_REQUEST,
        Json(Envelope::error(ApiError::from(&e))),
    )
        .into_response()
}
