//! # Error Types
//!
//! Each stage has its own error type next to the code that raises it; this
//! module gathers them into [`QreativeError`] for the pipeline and the CLI.
//!
//! | Stage | Error |
//! |-------|-------|
//! | Color parsing | [`ColorError`] |
//! | Encoding | [`EncodeError`] |
//! | SVG subset | [`MarkupError`] |
//! | Logo | [`LogoError`] |
//! | Export / platform | [`ExportError`], [`PlatformError`] |

use thiserror::Error;

pub use crate::color::ColorError;
pub use crate::export::{ExportError, PlatformError};
pub use crate::render::LogoError;
pub use crate::symbol::{EncodeError, MarkupError};

/// Main error type for qreative operations
#[derive(Debug, Error)]
pub enum QreativeError {
    /// Malformed color text
    #[error("Color error: {0}")]
    Color(#[from] ColorError),

    /// The encoder rejected the data or failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Markup outside the supported SVG subset
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Logo could not be read or parsed
    #[error("Logo error: {0}")]
    Logo(#[from] LogoError),

    /// Artifact or platform failure
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Options file is not valid JSON for [`crate::QrOptions`]
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A generation task did not complete
    #[error("Generation failed: {0}")]
    Task(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
