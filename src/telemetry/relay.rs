//! Telemetry relay
//!
//! Takes frames off the bus one at a time, decodes them, adds the fields only
//! the relay can know for INFO frames (`IP`, `THUMB`), and POSTs the result to
//! the registry's ingestion endpoint. Delivery is at-most-once: a frame that
//! cannot be forwarded is logged and dropped, the module's next periodic
//! announcement brings the registry up to date again.

use tokio::sync::mpsc;

use super::codec::{FieldCode, Frame, MessageKind};
use super::thumbnail::{encode_reference, thumbnail_path, ThumbnailProbe};
use crate::config::RelayConfig;
use crate::error::{Result, SupervisorError};

/// Counters of what happened to the frames a relay run has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub forwarded: u64,
    pub discarded: u64,
    pub dropped: u64,
}

pub struct Relay {
    config: RelayConfig,
    client: reqwest::Client,
    probe: ThumbnailProbe,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.forward_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SupervisorError::InvalidInput(format!("forward client: {}", e)))?;
        let probe = ThumbnailProbe::new(config.probe_timeout)?;

        Ok(Self {
            config,
            client,
            probe,
        })
    }

    /// Relay frames until the bus side of `frames` closes
    pub async fn run(&self, mut frames: mpsc::Receiver<String>) -> RelaySummary {
        tracing::info!(
            registry = %self.config.registry_addr,
            local_ip = %self.config.local_ip,
            remote_ip = %self.config.remote_ip,
            "Relay started"
        );

        let mut summary = RelaySummary::default();
        while let Some(raw) = frames.recv().await {
            match self.handle_frame(&raw).await {
                Ok(()) => summary.forwarded += 1,
                Err(e @ SupervisorError::MalformedFrame(_)) => {
                    crate::log_frame_dropped!("discarded", &raw, e);
                    summary.discarded += 1;
                },
                Err(e) => {
                    crate::log_frame_dropped!("not forwarded", &raw, e);
                    summary.dropped += 1;
                },
            }
        }

        tracing::info!(
            forwarded = summary.forwarded,
            discarded = summary.discarded,
            dropped = summary.dropped,
            "Relay stopped, bus closed"
        );
        summary
    }

    /// Decode, augment and forward a single frame
    pub async fn handle_frame(&self, raw: &str) -> Result<()> {
        let mut frame = Frame::decode(raw)?;
        tracing::debug!(
            kind = frame.kind.keyword(),
            module_id = frame.module_id,
            "Frame decoded"
        );

        if frame.kind == MessageKind::Info {
            self.augment_info(&mut frame).await;
        }

        self.forward(&frame).await
    }

    /// Append `IP`, and `THUMB` when the module's still frame exists
    pub async fn augment_info(&self, frame: &mut Frame) {
        frame.push(FieldCode::Ip, self.config.local_ip.clone());

        let path = thumbnail_path(&self.config.thumb_prefix, frame.module_id);
        let local_url = self.config.local_thumbnail_url(&path);
        if self.probe.exists(&local_url).await {
            frame.push(
                FieldCode::Thumb,
                encode_reference(&self.config.remote_ip, &path),
            );
        }
    }

    /// POST the frame's ingestion path to the registry
    pub async fn forward(&self, frame: &Frame) -> Result<()> {
        let url = self.ingestion_url(frame)?;
        tracing::debug!(url = %url, "Forwarding frame");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| SupervisorError::ForwardFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupervisorError::ForwardFailure(format!(
                "registry answered {}",
                status
            )));
        }
        Ok(())
    }

    /// Registry URL carrying the frame as path segments
    ///
    /// Each value is pushed as its own segment, so `/`, spaces or `?` inside a
    /// value get percent-encoded instead of breaking the URL.
    pub fn ingestion_url(&self, frame: &Frame) -> Result<reqwest::Url> {
        let base = self.config.registry_url();
        let mut url = reqwest::Url::parse(&base).map_err(|e| {
            SupervisorError::InvalidInput(format!("registry address '{}': {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SupervisorError::InvalidInput(format!("registry address '{}' has no path", base))
            })?
            .clear()
            .extend(frame.path_segments());
        Ok(url)
    }
}
