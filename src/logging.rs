//! Logging
//!
//! Structured logging through `tracing`, with presets per process role and a
//! plain or JSON formatter writing to stdout or a file.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    /// Show timestamps
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
    /// Enable span events for tracing
    pub enable_spans: bool,
    /// Output to file instead of stdout
    pub file_output: Option<PathBuf>,
}

impl LoggingConfig {
    /// Create config for different application modes
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Server => Self {
                level: Level::INFO,
                color: false, // Long-running service
                show_timestamps: true,
                show_target: true,
                json_format: false,
                enable_spans: true, // Request spans from the trace layer
                file_output: None,
            },
            ApplicationMode::Relay => Self {
                level: Level::INFO,
                color: false,
                show_timestamps: true,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
            ApplicationMode::Cli => Self {
                level: Level::INFO,
                color: io::stdout().is_terminal(),
                show_timestamps: false,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
        }
    }

    /// Apply the CLI flags on top of a mode preset
    pub fn with_args(mut self, quiet: bool, verbose: bool, json: bool) -> Self {
        if verbose {
            self.level = Level::DEBUG;
            self.show_target = true;
        } else if quiet {
            self.level = Level::ERROR;
        }
        if json {
            self.json_format = true;
            self.color = false;
        }
        self
    }

    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.color = false;
        }
        self.file_output = path;
        self
    }

    fn default_filter(&self) -> String {
        format!("vmi_supervisor={},tower_http={}", self.level, self.level)
    }
}

/// Application modes with different logging requirements
#[derive(Debug, Clone, Copy)]
pub enum ApplicationMode {
    /// Control API server
    Server,
    /// Telemetry relay
    Relay,
    /// One-shot commands
    Cli,
}

/// Install the global subscriber
///
/// `RUST_LOG` replaces the mode's default filter when set.
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    let (writer, ansi) = match &config.file_output {
        Some(path) => (BoxMakeWriter::new(file_writer(path)?), false),
        None => (BoxMakeWriter::new(io::stdout), config.color),
    };

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(writer)
            .boxed()
    } else if config.show_timestamps {
        fmt::layer()
            .with_target(config.show_target)
            .with_ansi(ansi)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(config.show_target)
            .with_ansi(ansi)
            .without_time()
            .with_writer(writer)
            .boxed()
    };

    Registry::default()
        .with(env_filter)
        .with(layer)
        .try_init()
        .map_err(io::Error::other)
}

/// Non-rotating appender for `--log-file`; a bare file name lands in the cwd
fn file_writer(path: &Path) -> io::Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name"))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Ok(tracing_appender::rolling::never(directory, file_name))
}

/// Log a registry change for one module
#[macro_export]
macro_rules! log_module_operation {
    ($operation:expr, $module_id:expr) => {
        tracing::info!(
            operation = $operation,
            module_id = $module_id,
            "Module operation"
        );
    };
}

/// Log a bus frame the relay did not deliver
#[macro_export]
macro_rules! log_frame_dropped {
    ($outcome:expr, $frame:expr, $error:expr) => {
        tracing::warn!(
            outcome = $outcome,
            frame = %$frame,
            code = $error.to_error_code(),
            error = %$error,
            "Frame dropped"
        );
    };
}

/// Utility macro for structured error logging
#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Operation failed"
        );
    };
}
