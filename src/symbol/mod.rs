//! # QR Symbols
//!
//! The boundary to the QR matrix encoder and the symbol representations that
//! flow through the rest of the pipeline.
//!
//! ## Encoder Contract
//!
//! | Input | Value |
//! |-------|-------|
//! | Error correction | H (~30% recovery, leaves room for a logo) |
//! | Pixel width | 300 |
//! | Margin (quiet zone) | 1 module |
//! | Colors | style foreground / background |
//!
//! A vector symbol lists the three finder patterns first (top-left,
//! top-right, bottom-left), then one rectangle per remaining dark module in
//! row-major order. The style applier relies on that order.
//!
//! Encoding failures (data too long for any version at level H) come back as
//! [`EncodeError`] and never panic.

mod encoder;
pub mod svg;
mod vector;

pub use encoder::{FINDER_SIZE, QrCodeEncoder, finder_origins};
pub use svg::MarkupError;
pub use vector::{BBox, Primitive, RoundedRect, Shape, VectorSymbol, ViewBox};

use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::style::StyleConfig;

/// Rendered width of a symbol in pixels.
pub const SYMBOL_WIDTH: u32 = 300;

/// Quiet zone in modules.
pub const SYMBOL_MARGIN: u32 = 1;

/// Error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery (always used for styled codes)
    #[default]
    H,
}

/// Requested symbol representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolFormat {
    /// Primitive model; can be styled and exported as SVG.
    #[default]
    Vector,
    /// Bitmap only; skips shape styling.
    Raster,
}

/// Everything the encoder needs for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub data: String,
    pub ec_level: ErrorCorrection,
    pub foreground: Color,
    pub background: Color,
    pub width: u32,
    pub margin: u32,
    pub format: SymbolFormat,
}

impl EncodeRequest {
    /// Request with the fixed pipeline parameters and the style's colors.
    pub fn new(data: impl Into<String>, style: &StyleConfig) -> Self {
        Self {
            data: data.into(),
            ec_level: ErrorCorrection::H,
            foreground: style.foreground,
            background: style.background,
            width: SYMBOL_WIDTH,
            margin: SYMBOL_MARGIN,
            format: SymbolFormat::Vector,
        }
    }

    pub fn with_format(mut self, format: SymbolFormat) -> Self {
        self.format = format;
        self
    }
}

/// Encoder output.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Vector(VectorSymbol),
    Raster(RgbaImage),
}

impl Symbol {
    /// Natural size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Symbol::Vector(v) => (v.width, v.height),
            Symbol::Raster(img) => img.dimensions(),
        }
    }

    pub fn as_vector(&self) -> Option<&VectorSymbol> {
        match self {
            Symbol::Vector(v) => Some(v),
            Symbol::Raster(_) => None,
        }
    }
}

/// Errors from a [`SymbolEncoder`].
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// The data cannot be represented (too long, invalid for the mode, ...).
    #[error("QR encoding failed: {0}")]
    Rejected(String),

    /// The encoder itself failed (crashed task, unavailable backend).
    #[error("encoder failed: {0}")]
    Backend(String),
}

/// Produces the base QR symbol for a data string.
///
/// Implementations must be pure with respect to the request: the same
/// request always yields the same symbol.
#[async_trait]
pub trait SymbolEncoder: Send + Sync {
    async fn encode(&self, request: &EncodeRequest) -> Result<Symbol, EncodeError>;
}
