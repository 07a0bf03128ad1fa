//! HTTP transport against a chronoseal relay server.
//!
//! Route shapes:
//!
//! - `POST {base}/upload?recipient=<id>` — raw container bytes in the
//!   body, filename and unlock time in `x-chronoseal-*` headers; the
//!   response is `{"capsule_id": "..."}`.
//! - `GET {base}/release/download/{id}` — raw container bytes, or an
//!   error status while the capsule is still locked.
//! - `GET {base}/release/metadata/{id}` — `{"status": "pending" | ...}`.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use chronoseal_capsule::CapsuleMetadata;
use chronoseal_core::{CapsuleStatus, Transport, TransportError};

const FILENAME_HEADER: &str = "x-chronoseal-filename";
const UNLOCK_HEADER: &str = "x-chronoseal-unlock-time";

#[derive(Deserialize)]
struct UploadResponse {
    capsule_id: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

/// Blocking HTTP client for a relay server.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url` (no trailing
    /// slash required).
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError(format!("building HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

impl Transport for HttpTransport {
    fn upload(
        &self,
        container: &[u8],
        recipient_id: &str,
        metadata: &CapsuleMetadata,
    ) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url("upload"))
            .query(&[("recipient", recipient_id)])
            .header(FILENAME_HEADER, metadata.original_filename.as_str())
            .header(UNLOCK_HEADER, metadata.unlock_time.to_string())
            .body(container.to_vec())
            .send()
            .map_err(|e| TransportError(format!("upload request: {e}")))?
            .error_for_status()
            .map_err(|e| TransportError(format!("upload rejected: {e}")))?;

        let parsed: UploadResponse = response
            .json()
            .map_err(|e| TransportError(format!("upload response: {e}")))?;
        debug!(capsule_id = %parsed.capsule_id, "upload accepted");
        Ok(parsed.capsule_id)
    }

    fn download(&self, capsule_id: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("release/download/{capsule_id}")))
            .send()
            .map_err(|e| TransportError(format!("download request: {e}")))?
            .error_for_status()
            .map_err(|e| TransportError(format!("download rejected: {e}")))?;

        let bytes = response
            .bytes()
            .map_err(|e| TransportError(format!("download body: {e}")))?;
        Ok(bytes.to_vec())
    }

    fn status(&self, capsule_id: &str) -> Result<CapsuleStatus, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("release/metadata/{capsule_id}")))
            .send()
            .map_err(|e| TransportError(format!("status request: {e}")))?
            .error_for_status()
            .map_err(|e| TransportError(format!("status rejected: {e}")))?;

        let parsed: StatusResponse = response
            .json()
            .map_err(|e| TransportError(format!("status response: {e}")))?;
        match parsed.status.as_str() {
            "pending" => Ok(CapsuleStatus::Pending),
            "delivered" => Ok(CapsuleStatus::Delivered),
            "error" => Ok(CapsuleStatus::Error),
            other => Err(TransportError(format!("unknown capsule status {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let transport = HttpTransport::new("http://localhost:8080/").unwrap();
        assert_eq!(transport.url("upload"), "http://localhost:8080/upload");
    }

    #[test]
    fn test_url_joins_nested_paths() {
        let transport = HttpTransport::new("http://relay.example").unwrap();
        assert_eq!(
            transport.url("release/download/cap-7"),
            "http://relay.example/release/download/cap-7"
        );
    }
}
