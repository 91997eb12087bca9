//! # QReative - Styled QR Code Library
//!
//! QReative turns structured content into styled QR codes. It provides:
//!
//! - **Payloads**: URL, text, WiFi, email and phone formatting
//! - **Contrast check**: WCAG contrast ratio between the two code colors
//! - **Styling**: square, rounded or dot corner squares and data modules
//! - **Rasterizing**: deterministic RGBA rendering with a centered logo
//! - **Export**: PNG/SVG files, clipboard data URLs, share-sheet payloads
//!
//! ## Quick Start
//!
//! ```no_run
//! use qreative::{
//!     Pipeline, QrOptions,
//!     export::{self, ExportFormat},
//! };
//!
//! # async fn demo() -> Result<(), qreative::QreativeError> {
//! let options = QrOptions::from_json(
//!     r#"{ "payload": { "kind": "phone", "number": "+15550100" },
//!          "style": { "dot_type": "dot", "corner_square_type": "rounded", "corner_radius": 8 } }"#,
//! )?;
//!
//! let code = Pipeline::default().generate(&options).await?;
//! if let Some(warning) = code.contrast.warning() {
//!     eprintln!("{warning}");
//! }
//!
//! let png = export::export(&code, ExportFormat::Png)?;
//! export::save(&png, "out").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`payload`] | Payload kinds and their scanner strings |
//! | [`color`] | Hex colors |
//! | [`contrast`] | Luminance and contrast ratio |
//! | [`symbol`] | Encoder boundary, vector model, SVG subset |
//! | [`style`] | Corner and dot shapes |
//! | [`render`] | Rasterizer and logo compositing |
//! | [`export`] | Files, clipboard, sharing |
//! | [`pipeline`] | Options to finished code |
//! | [`regenerate`] | Newest-wins preview regeneration |
//! | [`error`] | Error types |

pub mod color;
pub mod contrast;
pub mod error;
pub mod export;
pub mod logging;
pub mod payload;
pub mod pipeline;
pub mod regenerate;
pub mod render;
pub mod style;
pub mod symbol;

// Re-exports for convenience
pub use color::Color;
pub use contrast::ContrastReport;
pub use error::QreativeError;
pub use payload::{PayloadConfig, PayloadForm, PayloadKind};
pub use pipeline::{Pipeline, QrOptions, RenderedCode};
pub use regenerate::Regenerator;
pub use render::Logo;
pub use style::{ShapeType, StyleConfig};
pub use symbol::{QrCodeEncoder, SymbolEncoder};
