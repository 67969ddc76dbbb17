pub mod actuator;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod telemetry;
