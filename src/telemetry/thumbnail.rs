//! Thumbnail references
//!
//! Modules drop a still frame at `/<prefix>/<id>_frame.png` on the host the
//! relay runs on. The relay checks that the image exists through its local
//! address, then hands the registry a reference built on the externally
//! reachable address. The reference travels as a single path segment, so
//! `/` becomes `-` and `:` becomes `--`.

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{Result, SupervisorError};
use crate::registry::ModuleId;

const URL_SCHEME: &str = "http://";

/// Path of a module's still frame, e.g. `/ip2vf3/5_frame.png`
pub fn thumbnail_path(prefix: &str, id: ModuleId) -> String {
    format!("/{}/{}_frame.png", prefix.trim_matches('/'), id)
}

/// Encode `<remote_host><path>` for embedding as one path segment
pub fn encode_reference(remote_host: &str, path: &str) -> String {
    format!("{}{}", remote_host, path)
        .replace('/', "-")
        .replace(':', "--")
}

/// Absolute URL of an encoded reference
pub fn decode_reference(encoded: &str) -> String {
    format!(
        "{}{}",
        URL_SCHEME,
        encoded.replace("--", ":").replace('-', "/")
    )
}

/// Existence check for thumbnails served on the relay's local address
#[derive(Debug, Clone)]
pub struct ThumbnailProbe {
    client: reqwest::Client,
}

impl ThumbnailProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SupervisorError::InvalidInput(format!("probe client: {}", e)))?;
        Ok(Self { client })
    }

    /// Whether `url` answers with anything but 404
    ///
    /// Transport failures and timeouts come back as `ProbeUnavailable`;
    /// callers treat those as "no thumbnail".
    pub async fn check(&self, url: &str) -> Result<bool> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SupervisorError::ProbeUnavailable(e.to_string()))?;

        tracing::debug!(url, status = %response.status(), "Thumbnail probe answered");
        Ok(response.status() != StatusCode::NOT_FOUND)
    }

    /// Like [`check`](Self::check), with failures folded into `false`
    pub async fn exists(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(url, error = %e, "Thumbnail probe failed, assuming absent");
                false
            },
        }
    }
}
