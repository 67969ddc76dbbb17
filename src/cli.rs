use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::actuator::ModuleCommand;

const LONG_ABOUT: &str = r#"
vmisup - supervisor for vMI media-processing modules

Modules announce themselves on a ZeroMQ bus. The relay turns those
announcements into registry updates, the server exposes the registry over
HTTP and sends start/stop commands back to modules.

Typical deployment:
  vmisup serve --port 5002
  vmisup relay 5555 127.0.0.1:5002 192.168.1.10 203.0.113.7

Endpoints:
  GET  /modules/list
  GET  /modules/{id}
  GET  /modules/{id}/start | /modules/{id}/stop
  POST /moduleinfos/...    | /modulestats/...   (relay only)
"#;

#[derive(Parser, Clone)]
#[command(name = "vmisup")]
#[command(about = "Registry, telemetry relay and command channel for vMI modules")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the Control API and module registry
    Serve {
        /// Address to listen on (default: 0.0.0.0, env VMISUP_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: 5002, env VMISUP_PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Relay bus telemetry to the Control API
    ///
    /// Binds a SUB socket on tcp://127.0.0.1:<BUS_PORT> and forwards every
    /// IP2VFINFOS/IP2VFSTATS frame to the registry.
    ///
    /// Examples:
    ///   vmisup relay 5555 127.0.0.1:5002 192.168.1.10 203.0.113.7
    ///   vmisup relay 5555 10.0.0.2:5002 127.0.0.1 10.0.0.9:8080 --thumb-port 8080
    Relay {
        /// Local port modules publish their frames to
        bus_port: u16,

        /// host:port of the Control API
        registry: String,

        /// Address modules and thumbnails are reached at from this host
        local_ip: String,

        /// Externally reachable address used in thumbnail URLs
        remote_ip: String,

        /// Port of the local thumbnail server (default: 8080)
        #[arg(long)]
        thumb_port: Option<u16>,

        /// Path prefix of thumbnail images (default: ip2vf3)
        #[arg(long)]
        thumb_prefix: Option<String>,

        /// Thumbnail probe timeout in milliseconds (default: 2000)
        #[arg(long)]
        probe_timeout_ms: Option<u64>,

        /// Registry request timeout in milliseconds (default: none)
        #[arg(long)]
        forward_timeout_ms: Option<u64>,
    },

    /// Send a single command to a module's control endpoint
    ///
    /// Delivery is not acknowledged; success only means the command left
    /// this host.
    Command {
        /// Module address
        ip: String,

        /// Module control port
        port: u16,

        /// Command to send
        #[arg(value_enum)]
        action: CommandAction,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CommandAction {
    Start,
    Stop,
}

impl From<CommandAction> for ModuleCommand {
    fn from(action: CommandAction) -> Self {
        match action {
            CommandAction::Start => ModuleCommand::Start,
            CommandAction::Stop => ModuleCommand::Stop,
        }
    }
}
