//! Runtime configuration
//!
//! Each config starts from its `Default`, is overlaid by `VMISUP_*`
//! environment variables, then by command-line flags.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SupervisorError};
use crate::telemetry::codec::TOPIC_PREFIX;

pub const DEFAULT_API_PORT: u16 = 5002;
pub const DEFAULT_THUMB_PORT: u16 = 8080;
pub const DEFAULT_THUMB_PREFIX: &str = "ip2vf3";
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_ACTUATOR_LINGER_MS: u64 = 1000;

/// Control API settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub actuator: ActuatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_API_PORT,
            actuator: ActuatorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Overlay `VMISUP_HOST`, `VMISUP_PORT` and the actuator variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("VMISUP_HOST") {
            config.host = host;
        }
        if let Some(port) = env_parse("VMISUP_PORT")? {
            config.port = port;
        }
        config.actuator = ActuatorConfig::from_env()?;
        Ok(config)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Command channel settings
#[derive(Debug, Clone)]
pub struct ActuatorConfig {
    /// How long an unsent command may linger once the channel is closed
    pub linger: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            linger: Duration::from_millis(DEFAULT_ACTUATOR_LINGER_MS),
        }
    }
}

impl ActuatorConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(ms) = env_parse::<u64>("VMISUP_ACTUATOR_LINGER_MS")? {
            config.linger = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

/// Telemetry relay settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Local port the bus subscriber binds to
    pub bus_port: u16,
    /// Topic filter for the bus subscription
    pub topic: String,
    /// `host:port` of the Control API
    pub registry_addr: String,
    /// Address modules are reached at from the relay's host
    pub local_ip: String,
    /// Externally reachable address of the relay's host
    pub remote_ip: String,
    pub thumb_port: u16,
    pub thumb_prefix: String,
    pub probe_timeout: Duration,
    /// `None` waits on the registry for as long as it takes
    pub forward_timeout: Option<Duration>,
}

impl RelayConfig {
    pub fn new(
        bus_port: u16,
        registry_addr: impl Into<String>,
        local_ip: impl Into<String>,
        remote_ip: impl Into<String>,
    ) -> Self {
        Self {
            bus_port,
            topic: TOPIC_PREFIX.to_string(),
            registry_addr: registry_addr.into(),
            local_ip: local_ip.into(),
            remote_ip: remote_ip.into(),
            thumb_port: DEFAULT_THUMB_PORT,
            thumb_prefix: DEFAULT_THUMB_PREFIX.to_string(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            forward_timeout: None,
        }
    }

    /// Overlay `VMISUP_THUMB_PORT`, `VMISUP_THUMB_PREFIX`,
    /// `VMISUP_PROBE_TIMEOUT_MS` and `VMISUP_FORWARD_TIMEOUT_MS`
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(port) = env_parse("VMISUP_THUMB_PORT")? {
            self.thumb_port = port;
        }
        if let Ok(prefix) = std::env::var("VMISUP_THUMB_PREFIX") {
            self.thumb_prefix = prefix;
        }
        if let Some(ms) = env_parse::<u64>("VMISUP_PROBE_TIMEOUT_MS")? {
            self.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("VMISUP_FORWARD_TIMEOUT_MS")? {
            self.forward_timeout = Some(Duration::from_millis(ms));
        }
        Ok(self)
    }

    pub fn thumb_port(mut self, port: u16) -> Self {
        self.thumb_port = port;
        self
    }

    pub fn thumb_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thumb_prefix = prefix.into();
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn forward_timeout(mut self, timeout: Duration) -> Self {
        self.forward_timeout = Some(timeout);
        self
    }

    /// Endpoint the bus subscriber binds to
    pub fn bus_endpoint(&self) -> String {
        format!("tcp://127.0.0.1:{}", self.bus_port)
    }

    /// Base URL every ingestion path is appended to
    pub fn registry_url(&self) -> String {
        format!("http://{}", self.registry_addr)
    }

    /// Local URL the thumbnail probe hits
    pub fn local_thumbnail_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.local_ip, self.thumb_port, path)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            SupervisorError::InvalidInput(format!("{} has an invalid value '{}'", name, raw))
        }),
        Err(_) => Ok(None),
    }
}
