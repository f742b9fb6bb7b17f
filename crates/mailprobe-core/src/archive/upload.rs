//! Upload capability: hand a finished bundle to the remote blob store.

use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::ArchiveConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no upload token configured")]
    NotConfigured,
    #[error("upload transport: {0}")]
    Transport(String),
    #[error("upload rejected with HTTP {0}")]
    Status(u32),
    #[error("upload response malformed: {0}")]
    Response(String),
    #[error("upload refused: status {0:?}")]
    Refused(String),
}

impl From<curl::Error> for UploadError {
    fn from(e: curl::Error) -> Self {
        UploadError::Transport(e.to_string())
    }
}

/// Blob-store upload transport. Blocking; the scheduler calls it from a
/// blocking task. Failure is per-tick and non-fatal.
pub trait Uploader: Send + Sync + 'static {
    /// Upload the bundle; returns its download link.
    fn upload(&self, bundle: &Path) -> Result<String, UploadError>;
}

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://upload.gofile.io/uploadfile";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Multipart uploader for the gofile blob store.
pub struct GofileUploader {
    endpoint: String,
    token: Option<String>,
    folder_id: Option<String>,
}

impl GofileUploader {
    pub fn from_config(cfg: &ArchiveConfig) -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            token: cfg.gofile_token.clone(),
            folder_id: cfg.gofile_folder_id.clone(),
        }
    }

    /// Override the endpoint (e.g. a local stub in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn parse_response(body: &[u8]) -> Result<String, UploadError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| UploadError::Response(e.to_string()))?;
        let status = value
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");
        if status != "ok" {
            return Err(UploadError::Refused(status.to_string()));
        }
        value
            .pointer("/data/downloadPage")
            .and_then(|l| l.as_str())
            .map(str::to_string)
            .ok_or_else(|| UploadError::Response("missing downloadPage".to_string()))
    }
}

impl Uploader for GofileUploader {
    fn upload(&self, bundle: &Path) -> Result<String, UploadError> {
        let Some(token) = &self.token else {
            return Err(UploadError::NotConfigured);
        };

        let mut form = curl::easy::Form::new();
        form.part("file")
            .file(bundle)
            .content_type("application/octet-stream")
            .add()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        form.part("token")
            .contents(token.as_bytes())
            .add()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        if let Some(folder_id) = &self.folder_id {
            form.part("folderId")
                .contents(folder_id.as_bytes())
                .add()
                .map_err(|e| UploadError::Transport(e.to_string()))?;
        }

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint)?;
        easy.timeout(UPLOAD_TIMEOUT)?;
        easy.httppost(form)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(UploadError::Status(code));
        }
        Self::parse_response(&body)
    }
}
