use serde::Serialize;

use crate::error::SupervisorError;
use crate::registry::ModuleId;

/// Logical outcome carried inside every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultCode {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

/// `{result, content}` wrapper used by every read and action endpoint
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub result: ResultCode,
    pub content: T,
}

impl<T> Envelope<T> {
    pub fn ok(content: T) -> Self {
        Self {
            result: ResultCode::Ok,
            content,
        }
    }

    pub fn error(content: T) -> Self {
        Self {
            result: ResultCode::Error,
            content,
        }
    }
}

/// Payload returned for an id the registry has never seen
#[derive(Debug, Serialize)]
pub struct UnknownModule {
    pub id: ModuleId,
    pub error: &'static str,
}

impl UnknownModule {
    pub fn new(id: ModuleId) -> Self {
        Self {
            id,
            error: "unknown module",
        }
    }
}

/// Payload of an ERROR envelope
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl From<&SupervisorError> for ApiError {
    fn from(e: &SupervisorError) -> Self {
        let response = e.to_error_response();
        Self {
            error: response.error,
            code: response.code,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
