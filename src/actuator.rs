//! Module command channel
//!
//! A command is one plaintext token written to the module's PAIR socket at
//! `tcp://<ip>:<port>`. The channel is opened per command and closed right
//! after the write; nothing is read back. `Ok` only means the token was handed
//! to the local socket, not that the module received or obeyed it.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ActuatorConfig;
use crate::error::{Result, SupervisorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleCommand {
    Start,
    Stop,
}

impl ModuleCommand {
    /// Wire token understood by the module's control listener
    pub fn token(self) -> &'static str {
        match self {
            ModuleCommand::Start => "start:",
            ModuleCommand::Stop => "stop:",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleCommand::Start => "start",
            ModuleCommand::Stop => "stop",
        }
    }
}

impl fmt::Display for ModuleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleCommand {
    type Err = SupervisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ModuleCommand::Start),
            "stop" => Ok(ModuleCommand::Stop),
            other => Err(SupervisorError::InvalidInput(format!(
                "unknown command '{}', expected start or stop",
                other
            ))),
        }
    }
}

/// Something that can deliver a command to a module's control endpoint
///
/// Sending blocks on socket setup; async callers run it on the blocking pool.
pub trait CommandSender: Send + Sync {
    fn send(&self, ip: &str, port: u16, command: ModuleCommand) -> Result<()>;
}

/// ZeroMQ PAIR implementation of [`CommandSender`]
#[derive(Clone)]
pub struct ZmqActuator {
    context: zmq::Context,
    linger: Duration,
}

impl ZmqActuator {
    pub fn new(config: &ActuatorConfig) -> Self {
        Self {
            context: zmq::Context::new(),
            linger: config.linger,
        }
    }
}

impl CommandSender for ZmqActuator {
    fn send(&self, ip: &str, port: u16, command: ModuleCommand) -> Result<()> {
        if ip.is_empty() || port == 0 {
            return Err(SupervisorError::ActuationFailure(
                "module has not announced a control endpoint".to_string(),
            ));
        }

        let endpoint = format!("tcp://{}:{}", ip, port);
        let actuation = |e: zmq::Error| {
            SupervisorError::ActuationFailure(format!("{}: {}", endpoint, e))
        };

        let socket = self.context.socket(zmq::PAIR).map_err(actuation)?;
        let linger_ms = i32::try_from(self.linger.as_millis()).unwrap_or(i32::MAX);
        socket.set_linger(linger_ms).map_err(actuation)?;
        socket.connect(&endpoint).map_err(actuation)?;
        socket
            .send(command.token(), zmq::DONTWAIT)
            .map_err(actuation)?;

        tracing::info!(endpoint = %endpoint, command = %command, "Command sent");
        Ok(())
    }
}
