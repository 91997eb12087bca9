//! Logo images and their placement on a code.

use std::fmt;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::RgbaImage;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fraction of the canvas width covered by the logo.
pub const LOGO_SCALE: f32 = 0.25;

/// Background pad around the logo, in pixels.
pub const LOGO_PADDING: u32 = 2;

/// Errors reading or decoding a logo.
#[derive(Debug, Error)]
pub enum LogoError {
    #[error("Logo is not a data URL")]
    NotDataUrl,

    #[error("Invalid logo media type '{0}'")]
    InvalidMime(String),

    #[error("Invalid base64 logo data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Logo decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to read logo: {0}")]
    Io(#[from] std::io::Error),
}

/// An encoded logo image (PNG, JPEG, ...), kept as bytes until rasterization.
///
/// Serializes as a `data:` URL so it can live in a JSON options file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Logo {
    mime: String,
    bytes: Vec<u8>,
}

impl Logo {
    /// Wrap encoded bytes; the media type is sniffed from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Self { mime, bytes }
    }

    /// Parse `data:<mime>[;base64],<data>`.
    pub fn from_data_url(url: &str) -> Result<Self, LogoError> {
        let rest = url.trim().strip_prefix("data:").ok_or(LogoError::NotDataUrl)?;
        let (header, data) = rest.split_once(',').ok_or(LogoError::NotDataUrl)?;

        let (mime, bytes) = match header.strip_suffix(";base64") {
            Some(mime) => (mime, STANDARD.decode(data.trim())?),
            None => (header, percent_decode_str(data).collect()),
        };
        // parameters such as `;charset=` are dropped
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let essence = if essence.is_empty() { "text/plain" } else { essence };
        if !is_media_type(essence) {
            return Err(LogoError::InvalidMime(mime.to_string()));
        }

        Ok(Self {
            mime: essence.to_ascii_lowercase(),
            bytes,
        })
    }

    /// Read an image file from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogoError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 `data:` URL of the encoded bytes.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Decode to RGBA pixels.
    pub fn decode(&self) -> Result<RgbaImage, LogoError> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }
}

/// `type/subtype` made of RFC 6838 token characters.
fn is_media_type(mime: &str) -> bool {
    let token = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    matches!(mime.split_once('/'), Some((kind, sub)) if token(kind) && token(sub))
}

impl fmt::Debug for Logo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logo")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl TryFrom<String> for Logo {
    type Error = LogoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(&value)
    }
}

impl From<Logo> for String {
    fn from(logo: Logo) -> Self {
        logo.data_url()
    }
}

/// Square area the logo occupies, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoRegion {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl LogoRegion {
    /// A quarter of the canvas width, centered.
    pub fn centered(width: u32, height: u32) -> Self {
        let size = width as f32 * LOGO_SCALE;
        Self {
            x: (width as f32 - size) / 2.0,
            y: (height as f32 - size) / 2.0,
            size,
        }
    }

    /// Whole-pixel placement: `(x, y, side)` with the origin floored.
    pub fn pixel_bounds(&self) -> (u32, u32, u32) {
        (
            self.x.floor().max(0.0) as u32,
            self.y.floor().max(0.0) as u32,
            self.size.round().max(0.0) as u32,
        )
    }

    /// Pixel bounds grown by [`LOGO_PADDING`] on every side.
    pub fn padded_bounds(&self) -> (u32, u32, u32, u32) {
        let (x, y, side) = self.pixel_bounds();
        (
            x.saturating_sub(LOGO_PADDING),
            y.saturating_sub(LOGO_PADDING),
            x + side + LOGO_PADDING,
            y + side + LOGO_PADDING,
        )
    }
}
