use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use vmi_supervisor::actuator::{CommandSender, ModuleCommand, ZmqActuator};
use vmi_supervisor::api::ApiServer;
use vmi_supervisor::cli::{Cli, Commands};
use vmi_supervisor::config::{ActuatorConfig, RelayConfig, ServerConfig};
use vmi_supervisor::error::{ErrorResponse, SupervisorError};
use vmi_supervisor::logging::{ApplicationMode, LoggingConfig};
use vmi_supervisor::telemetry::{bus, Relay};

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to get logging configuration
    let cli = Cli::parse();

    let mode = match cli.command {
        Commands::Serve { .. } => ApplicationMode::Server,
        Commands::Relay { .. } => ApplicationMode::Relay,
        Commands::Command { .. } => ApplicationMode::Cli,
    };
    let log_config = LoggingConfig::for_mode(mode)
        .with_args(cli.quiet, cli.verbose > 0, cli.json)
        .with_file(cli.log_file.clone());

    if let Err(e) = vmi_supervisor::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        let error_response = match e.downcast_ref::<SupervisorError>() {
            Some(err) => err.to_error_response(),
            None => ErrorResponse {
                error: format!("{:#}", e),
                code: "INTERNAL_ERROR".to_string(),
            },
        };
        match serde_json::to_string_pretty(&error_response) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", error_response.error),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config = config.host(host);
            }
            if let Some(port) = port {
                config = config.port(port);
            }

            ApiServer::new(config).run().await?;
        },

        Commands::Relay {
            bus_port,
            registry,
            local_ip,
            remote_ip,
            thumb_port,
            thumb_prefix,
            probe_timeout_ms,
            forward_timeout_ms,
        } => {
            let mut config = RelayConfig::new(bus_port, registry, local_ip, remote_ip).apply_env()?;
            if let Some(port) = thumb_port {
                config = config.thumb_port(port);
            }
            if let Some(prefix) = thumb_prefix {
                config = config.thumb_prefix(prefix);
            }
            if let Some(ms) = probe_timeout_ms {
                config = config.probe_timeout(Duration::from_millis(ms));
            }
            if let Some(ms) = forward_timeout_ms {
                config = config.forward_timeout(Duration::from_millis(ms));
            }

            let context = zmq::Context::new();
            let frames = bus::subscribe(&context, &config.bus_endpoint(), &config.topic)?;
            let relay = Relay::new(config)?;
            relay.run(frames).await;
        },

        Commands::Command { ip, port, action } => {
            let command = ModuleCommand::from(action);
            let actuator = Arc::new(ZmqActuator::new(&ActuatorConfig::from_env()?));

            let endpoint = format!("tcp://{}:{}", ip, port);
            let sender = actuator.clone();
            tokio::task::spawn_blocking(move || sender.send(&ip, port, command)).await??;

            println!("Sent {} to {}", command.token(), endpoint);
        },
    }

    Ok(())
}
