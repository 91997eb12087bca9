//! # Generation Pipeline
//!
//! One pass from options to pixels:
//!
//! ```text
//!   PayloadConfig ──► format ──► encode ──┐
//!                                         ├──► apply_style ──► rasterize ──► RenderedCode
//!   Logo ───────────► decode ─────────────┘
//! ```
//!
//! Encoding and logo decoding are awaited together with `tokio::join!`. Both
//! run on the blocking pool (`spawn_blocking`), so they overlap instead of
//! running back to back on the async worker.

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contrast::ContrastReport;
use crate::error::QreativeError;
use crate::payload::{self, PayloadConfig};
use crate::render::{self, Logo};
use crate::style::{StyleConfig, apply_style};
use crate::symbol::{EncodeRequest, QrCodeEncoder, Symbol, SymbolEncoder, SymbolFormat, VectorSymbol};

/// Everything that determines a code.
///
/// Loaded from JSON with snake_case keys; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
    pub payload: PayloadConfig,
    pub style: StyleConfig,
    /// Logo as a `data:` URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
}

impl QrOptions {
    pub fn from_json(json: &str) -> Result<Self, QreativeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON options file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, QreativeError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// The string that gets encoded.
    pub fn data(&self) -> String {
        payload::format(&self.payload)
    }
}

/// Output of one generation.
#[derive(Debug, Clone)]
pub struct RenderedCode {
    /// Encoded payload string.
    pub data: String,
    pub style: StyleConfig,
    /// Styled symbol.
    pub symbol: Symbol,
    /// Final pixels, logo included.
    pub image: RgbaImage,
    /// Logo that was composited; `None` when absent or undecodable.
    pub logo: Option<Logo>,
    pub contrast: ContrastReport,
}

impl RenderedCode {
    pub fn vector(&self) -> Option<&VectorSymbol> {
        self.symbol.as_vector()
    }
}

/// Runs generations against a [`SymbolEncoder`].
#[derive(Clone)]
pub struct Pipeline {
    encoder: Arc<dyn SymbolEncoder>,
    format: SymbolFormat,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Arc::new(QrCodeEncoder::new()))
    }
}

impl Pipeline {
    pub fn new(encoder: Arc<dyn SymbolEncoder>) -> Self {
        Self {
            encoder,
            format: SymbolFormat::Vector,
        }
    }

    /// Ask the encoder for a different representation. Raster symbols skip
    /// shape styling and cannot be exported as SVG.
    pub fn with_format(mut self, format: SymbolFormat) -> Self {
        self.format = format;
        self
    }

    /// Generate a code. Only encoder failures are errors; a bad logo is
    /// dropped with a warning.
    pub async fn generate(&self, options: &QrOptions) -> Result<RenderedCode, QreativeError> {
        let data = options.data();
        let style = options.style.clone();
        let request = EncodeRequest::new(data.as_str(), &style).with_format(self.format);

        let (encoded, logo) = tokio::join!(
            self.encoder.encode(&request),
            decode_logo(options.logo.as_ref())
        );

        let symbol = encoded.inspect_err(|e| warn!(error = %e, "encoding failed"))?;
        let symbol = match symbol {
            Symbol::Vector(vector) => Symbol::Vector(apply_style(&vector, &style)),
            raster @ Symbol::Raster(_) => raster,
        };

        let mut image = render::rasterize(&symbol, &style, None);
        let logo = logo.map(|(logo, decoded)| {
            render::overlay_logo(&mut image, &decoded, style.background);
            logo
        });

        debug!(
            len = data.len(),
            primitives = symbol.as_vector().map_or(0, |v| v.primitives.len()),
            "generated code"
        );

        Ok(RenderedCode {
            contrast: ContrastReport::evaluate(&style),
            data,
            style,
            symbol,
            image,
            logo,
        })
    }
}

async fn decode_logo(logo: Option<&Logo>) -> Option<(Logo, RgbaImage)> {
    let logo = logo?.clone();
    let decoded = tokio::task::spawn_blocking(move || logo.decode().map(|image| (logo, image)))
        .await;

    match decoded {
        Ok(Ok(pair)) => Some(pair),
        Ok(Err(e)) => {
            warn!(error = %e, "logo could not be decoded, rendering without it");
            None
        }
        Err(e) => {
            warn!(error = %e, "logo decode task failed, rendering without it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::WifiEncryption;
    use crate::style::ShapeType;
    use crate::symbol::{EncodeError, Shape};
    use async_trait::async_trait;

    struct FailingEncoder;

    #[async_trait]
    impl SymbolEncoder for FailingEncoder {
        async fn encode(&self, _request: &EncodeRequest) -> Result<Symbol, EncodeError> {
            Err(EncodeError::Backend("offline".into()))
        }
    }

    #[test]
    fn test_options_from_json() {
        let options = QrOptions::from_json(
            r##"{
                "payload": { "kind": "wifi", "ssid": "Home", "password": "secret1" },
                "style": { "foreground": "#112233", "corner_radius": 8, "dot_type": "dot" }
            }"##,
        )
        .unwrap();

        assert_eq!(
            options.payload,
            PayloadConfig::Wifi {
                ssid: "Home".into(),
                password: "secret1".into(),
                encryption: WifiEncryption::Wpa,
                hidden: false,
            }
        );
        assert_eq!(options.style.foreground, "#112233".parse().unwrap());
        assert_eq!(options.style.background, crate::color::Color::WHITE);
        assert_eq!(options.style.dot_type, ShapeType::Dot);
        assert_eq!(options.style.corner_square_type, ShapeType::Square);
        assert!(options.logo.is_none());
        assert_eq!(options.data(), "WIFI:S:Home;T:WPA;P:secret1;H:false;;");
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(QrOptions::from_json("{}").unwrap(), QrOptions::default());
    }

    #[test]
    fn test_bad_color_in_json_is_rejected() {
        let err = QrOptions::from_json(r#"{"style": {"foreground": "red"}}"#).unwrap_err();
        assert!(matches!(err, QreativeError::Config(_)));
    }

    #[tokio::test]
    async fn test_generate_styles_vector() {
        let options = QrOptions {
            style: StyleConfig {
                dot_type: ShapeType::Dot,
                ..Default::default()
            },
            ..Default::default()
        };
        let code = Pipeline::default().generate(&options).await.unwrap();

        assert_eq!(code.data, "https://example.com");
        assert_eq!(code.image.dimensions(), (300, 300));
        assert!(code.contrast.passes);
        let vector = code.vector().unwrap();
        assert!(matches!(vector.primitives[0].shape, Shape::Path { .. }));
        assert!(matches!(vector.primitives[3].shape, Shape::Circle { .. }));
    }

    #[tokio::test]
    async fn test_generate_raster_format() {
        let code = Pipeline::default()
            .with_format(SymbolFormat::Raster)
            .generate(&QrOptions::default())
            .await
            .unwrap();
        assert!(code.vector().is_none());
        assert_eq!(code.image.dimensions(), (300, 300));
        assert_eq!(code.image, render::rasterize(&code.symbol, &code.style, None));
    }

    #[tokio::test]
    async fn test_corrupt_logo_is_dropped() {
        let options = QrOptions {
            logo: Some(Logo::from_bytes(b"garbage".to_vec())),
            ..Default::default()
        };
        let code = Pipeline::default().generate(&options).await.unwrap();
        assert!(code.logo.is_none());

        let plain = Pipeline::default().generate(&QrOptions::default()).await.unwrap();
        assert_eq!(code.image, plain.image);
    }

    #[tokio::test]
    async fn test_encoder_failure_is_returned() {
        let pipeline = Pipeline::new(Arc::new(FailingEncoder));
        let err = pipeline.generate(&QrOptions::default()).await.unwrap_err();
        assert!(matches!(err, QreativeError::Encode(EncodeError::Backend(_))));
    }
}
