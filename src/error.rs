use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Unknown module: {0}")]
    UnknownModule(i64),

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Thumbnail probe unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("Cannot forward to registry: {0}")]
    ForwardFailure(String),

    #[error("Cannot reach module control endpoint: {0}")]
    ActuationFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Message bus error: {0}")]
    Bus(#[from] zmq::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl SupervisorError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            SupervisorError::UnknownModule(_) => "UNKNOWN_MODULE",
            SupervisorError::MalformedFrame(_) => "MALFORMED_FRAME",
            SupervisorError::ProbeUnavailable(_) => "PROBE_UNAVAILABLE",
            SupervisorError::ForwardFailure(_) => "FORWARD_FAILURE",
            SupervisorError::ActuationFailure(_) => "ACTUATION_FAILURE",
            SupervisorError::InvalidInput(_) => "INVALID_INPUT",
            SupervisorError::Bus(_) => "BUS_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
