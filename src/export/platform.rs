//! Host integrations: clipboard and native share sheet.

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a host integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("not available on this platform")]
    Unavailable,

    #[error("permission denied: {0}")]
    Denied(String),

    #[error("{0}")]
    Failed(String),
}

/// Text clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError>;
}

/// Content handed to a share target.
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Native share sheet.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Whether sharing files is supported at all.
    fn is_available(&self) -> bool;

    async fn share(&self, payload: &SharePayload) -> Result<(), PlatformError>;
}

/// Share target for hosts without a share sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShareTarget;

#[async_trait]
impl ShareTarget for NoShareTarget {
    fn is_available(&self) -> bool {
        false
    }

    async fn share(&self, _payload: &SharePayload) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable)
    }
}

/// Clipboard that prints to stdout; used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutClipboard;

#[async_trait]
impl Clipboard for StdoutClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        use tokio::io::AsyncWriteExt;

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{text}\n").as_bytes())
            .await
            .map_err(|e| PlatformError::Failed(e.to_string()))?;
        stdout.flush().await.map_err(|e| PlatformError::Failed(e.to_string()))
    }
}
