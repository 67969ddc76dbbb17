//! Common utilities for integration tests

#![allow(dead_code)] // Not every test file uses every helper

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use tokio::net::TcpListener;
use vmi_supervisor::actuator::{CommandSender, ModuleCommand};
use vmi_supervisor::api::{serve, AppState};
use vmi_supervisor::error::Result;
use vmi_supervisor::registry::ModuleRegistry;

/// Get the path to the `vmisup` binary
///
/// Prefers `CARGO_BIN_EXE_vmisup` (custom target directories) and falls back
/// to `cargo_bin()` for a standard local build.
#[allow(deprecated)]
pub fn vmisup_binary() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_vmisup")
        .map(PathBuf::from)
        .unwrap_or_else(|_| assert_cmd::cargo::cargo_bin("vmisup"))
}

/// `vmisup` command with the supervisor's environment cleared
pub fn vmisup_command() -> Command {
    let mut cmd = Command::new(vmisup_binary());
    for var in [
        "VMISUP_HOST",
        "VMISUP_PORT",
        "VMISUP_THUMB_PORT",
        "VMISUP_THUMB_PREFIX",
        "VMISUP_PROBE_TIMEOUT_MS",
        "VMISUP_FORWARD_TIMEOUT_MS",
        "VMISUP_ACTUATOR_LINGER_MS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Command sender that records instead of touching the network
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, u16, ModuleCommand)>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, u16, ModuleCommand)> {
        self.sent.lock().unwrap().clone()
    }
}

impl CommandSender for RecordingSender {
    fn send(&self, ip: &str, port: u16, command: ModuleCommand) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((ip.to_string(), port, command));
        Ok(())
    }
}

/// Fresh state backed by a [`RecordingSender`]
pub fn test_state() -> (AppState, Arc<ModuleRegistry>, Arc<RecordingSender>) {
    let registry = Arc::new(ModuleRegistry::new());
    let sender = Arc::new(RecordingSender::default());
    let state = AppState::new(registry.clone(), sender.clone());
    (state, registry, sender)
}

/// Serve the Control API on an ephemeral local port
pub async fn spawn_api(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = serve(listener, state).await;
    });
    addr
}

/// Port that was free a moment ago
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
