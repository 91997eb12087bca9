//! # Artifact Export
//!
//! Turns a [`RenderedCode`] into downloadable bytes, clipboard text, or a
//! share-sheet payload.
//!
//! | Format | File | Media type |
//! |--------|------|------------|
//! | PNG | `qrcode.png` | `image/png` |
//! | SVG | `qrcode.svg` | `image/svg+xml` |
//!
//! SVG output carries the logo as a background pad plus an embedded `<image>`,
//! placed where the rasterizer composites it.
//!
//! Host integrations sit behind the [`Clipboard`] and [`ShareTarget`] traits.
//! Their errors are always returned to the caller.

mod platform;

pub use platform::{
    Clipboard, NoShareTarget, PlatformError, SharePayload, ShareTarget, StdoutClipboard,
};

use std::fmt::{self, Write as _};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::info;

use crate::color::Color;
use crate::pipeline::RenderedCode;
use crate::render::{Logo, LogoRegion};
use crate::symbol::VectorSymbol;
use crate::symbol::svg::{self, escape_attr, fmt_num};

/// Base name of exported files.
pub const EXPORT_BASENAME: &str = "qrcode";

/// Share sheet title.
pub const SHARE_TITLE: &str = "QR Code";

/// Share sheet message.
pub const SHARE_TEXT: &str = "Check out this QR code I created with QReative!";

/// Errors producing or delivering an artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("SVG export needs a vector symbol")]
    VectorUnavailable,

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Svg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn filename(self) -> String {
        format!("{EXPORT_BASENAME}.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            other => Err(format!("unknown format '{other}', expected png or svg")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file ready to be written or handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    fn new(filename: String, bytes: Vec<u8>) -> Self {
        let mime = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            filename,
            mime,
            bytes,
        }
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// SVG markup for a styled symbol, with the logo overlaid.
pub fn svg_with_logo(symbol: &VectorSymbol, background: Color, logo: Option<&Logo>) -> String {
    let Some(logo) = logo else {
        return symbol.to_svg();
    };

    let mut out = String::new();
    svg::write_header(&mut out, symbol);
    svg::write_body(&mut out, symbol);

    let region = LogoRegion::centered(symbol.width, symbol.height);
    let (x, y, side) = region.pixel_bounds();
    let (pad_x0, pad_y0, pad_x1, pad_y1) = region.padded_bounds();

    // pixel bounds to view-box attributes
    let vb = symbol.view_box;
    let sx = symbol.units_per_pixel();
    let sy = if symbol.height == 0 { 1.0 } else { vb.height / symbol.height as f32 };
    let bounds = |x0: u32, y0: u32, x1: u32, y1: u32| {
        format!(
            "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
            fmt_num(vb.min_x + x0 as f32 * sx),
            fmt_num(vb.min_y + y0 as f32 * sy),
            fmt_num(x1.saturating_sub(x0) as f32 * sx),
            fmt_num(y1.saturating_sub(y0) as f32 * sy),
        )
    };

    let _ = writeln!(
        out,
        "<rect {} fill=\"{background}\"/>",
        bounds(pad_x0, pad_y0, pad_x1, pad_y1)
    );
    let _ = writeln!(
        out,
        "<image {} preserveAspectRatio=\"none\" href=\"{}\"/>",
        bounds(x, y, x + side, y + side),
        escape_attr(&logo.data_url())
    );
    out.push_str("</svg>\n");
    out
}

/// Produce the downloadable artifact.
pub fn export(code: &RenderedCode, format: ExportFormat) -> Result<ExportPayload, ExportError> {
    let bytes = match format {
        ExportFormat::Png => encode_png(&code.image)?,
        ExportFormat::Svg => {
            let vector = code.vector().ok_or(ExportError::VectorUnavailable)?;
            svg_with_logo(vector, code.style.background, code.logo.as_ref()).into_bytes()
        }
    };
    let payload = ExportPayload::new(format.filename(), bytes);
    info!(file = %payload.filename, bytes = payload.bytes.len(), "exported code");
    Ok(payload)
}

/// PNG as a `data:image/png;base64,...` URL.
pub fn to_clipboard_text(code: &RenderedCode) -> Result<String, ExportError> {
    let png = encode_png(&code.image)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

// ============================================================================
// DELIVERY
// ============================================================================

/// How a share request was fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
}

/// Copy the PNG data URL to the clipboard.
pub async fn copy_to_clipboard(
    code: &RenderedCode,
    clipboard: &dyn Clipboard,
) -> Result<(), ExportError> {
    let text = to_clipboard_text(code)?;
    clipboard.write_text(&text).await?;
    Ok(())
}

/// Share the PNG through the host share sheet, or copy it to the clipboard
/// when no share sheet is available.
pub async fn share(
    code: &RenderedCode,
    target: &dyn ShareTarget,
    clipboard: &dyn Clipboard,
) -> Result<ShareOutcome, ExportError> {
    if !target.is_available() {
        info!("share sheet unavailable, copying to clipboard");
        copy_to_clipboard(code, clipboard).await?;
        return Ok(ShareOutcome::CopiedToClipboard);
    }

    let png = export(code, ExportFormat::Png)?;
    let payload = SharePayload {
        title: SHARE_TITLE.to_string(),
        text: SHARE_TEXT.to_string(),
        filename: png.filename,
        mime: png.mime,
        bytes: png.bytes,
    };
    target.share(&payload).await?;
    Ok(ShareOutcome::Shared)
}

/// Write the artifact into `dir` and return its path.
pub async fn save(payload: &ExportPayload, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&payload.filename);
    tokio::fs::write(&path, &payload.bytes).await?;
    info!(path = %path.display(), "saved code");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, QrOptions};
    use crate::symbol::SymbolFormat;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryClipboard {
        text: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl Clipboard for MemoryClipboard {
        async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
            *self.text.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    struct DeniedClipboard;

    #[async_trait::async_trait]
    impl Clipboard for DeniedClipboard {
        async fn write_text(&self, _text: &str) -> Result<(), PlatformError> {
            Err(PlatformError::Denied("clipboard-write".into()))
        }
    }

    #[derive(Default)]
    struct RecordingShare {
        shared: Mutex<Vec<SharePayload>>,
    }

    #[async_trait::async_trait]
    impl ShareTarget for RecordingShare {
        fn is_available(&self) -> bool {
            true
        }

        async fn share(&self, payload: &SharePayload) -> Result<(), PlatformError> {
            self.shared.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    async fn rendered(logo: Option<Logo>) -> RenderedCode {
        let options = QrOptions {
            logo,
            ..Default::default()
        };
        Pipeline::default().generate(&options).await.unwrap()
    }

    fn png_logo() -> Logo {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
        Logo::from_bytes(encode_png(&img).unwrap())
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!(" svg ".parse::<ExportFormat>(), Ok(ExportFormat::Svg));
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Svg.filename(), "qrcode.svg");
    }

    #[tokio::test]
    async fn test_png_export_decodes_to_image() {
        let code = rendered(None).await;
        let payload = export(&code, ExportFormat::Png).unwrap();
        assert_eq!(payload.filename, "qrcode.png");
        assert_eq!(payload.mime, "image/png");

        let decoded = image::load_from_memory(&payload.bytes).unwrap().to_rgba8();
        assert_eq!(decoded, code.image);
    }

    #[tokio::test]
    async fn test_svg_export_without_logo() {
        let code = rendered(None).await;
        let payload = export(&code, ExportFormat::Svg).unwrap();
        assert_eq!(payload.filename, "qrcode.svg");
        assert_eq!(payload.mime, "image/svg+xml");
        assert_eq!(String::from_utf8(payload.bytes).unwrap(), code.vector().unwrap().to_svg());
    }

    #[tokio::test]
    async fn test_svg_export_embeds_logo() {
        let logo = png_logo();
        let code = rendered(Some(logo.clone())).await;
        let svg = String::from_utf8(export(&code, ExportFormat::Svg).unwrap().bytes).unwrap();

        assert!(svg.contains(&format!("href=\"{}\"", logo.data_url())));
        assert!(svg.ends_with("</svg>\n"));
        let image_at = svg.find("<image").unwrap();
        let pad_at = svg[..image_at].rfind("<rect").unwrap();
        assert!(svg[pad_at..image_at].contains("fill=\"#ffffff\""));
    }

    #[tokio::test]
    async fn test_svg_logo_attributes_stay_closed() {
        let logo = png_logo();
        let injected = logo
            .data_url()
            .replacen("image/png", "image/png\" onload=\"alert(1)", 1);
        assert!(Logo::from_data_url(&injected).is_err());

        let code = rendered(Some(logo)).await;
        let svg = String::from_utf8(export(&code, ExportFormat::Svg).unwrap().bytes).unwrap();
        let image = svg.lines().find(|l| l.starts_with("<image")).unwrap();
        // x, y, width, height, preserveAspectRatio, href
        assert_eq!(image.matches('"').count(), 12);
        assert!(!image.contains("onload"));
    }

    #[tokio::test]
    async fn test_svg_of_raster_symbol_is_unavailable() {
        let code = Pipeline::default()
            .with_format(SymbolFormat::Raster)
            .generate(&QrOptions::default())
            .await
            .unwrap();
        assert!(matches!(
            export(&code, ExportFormat::Svg),
            Err(ExportError::VectorUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_clipboard_text_is_png_data_url() {
        let code = rendered(None).await;
        let text = to_clipboard_text(&code).unwrap();
        let encoded = text.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(image::load_from_memory(&bytes).unwrap().to_rgba8(), code.image);
    }

    #[tokio::test]
    async fn test_share_uses_target_when_available() {
        let code = rendered(None).await;
        let target = RecordingShare::default();
        let clipboard = MemoryClipboard::default();

        let outcome = share(&code, &target, &clipboard).await.unwrap();
        assert_eq!(outcome, ShareOutcome::Shared);

        let shared = target.shared.lock().unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].title, "QR Code");
        assert_eq!(shared[0].text, "Check out this QR code I created with QReative!");
        assert_eq!(shared[0].filename, "qrcode.png");
        assert!(clipboard.text.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_share_falls_back_to_clipboard() {
        let code = rendered(None).await;
        let clipboard = MemoryClipboard::default();

        let outcome = share(&code, &NoShareTarget, &clipboard).await.unwrap();
        assert_eq!(outcome, ShareOutcome::CopiedToClipboard);
        let copied = clipboard.text.lock().unwrap().clone().unwrap();
        assert_eq!(copied, to_clipboard_text(&code).unwrap());
    }

    #[tokio::test]
    async fn test_platform_errors_are_returned() {
        let code = rendered(None).await;
        let err = copy_to_clipboard(&code, &DeniedClipboard).await.unwrap_err();
        assert!(matches!(err, ExportError::Platform(PlatformError::Denied(_))));
    }

    #[tokio::test]
    async fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let code = rendered(None).await;
        let payload = export(&code, ExportFormat::Png).unwrap();

        let path = save(&payload, dir.path().join("out")).await.unwrap();
        assert_eq!(path, dir.path().join("out").join("qrcode.png"));
        assert_eq!(std::fs::read(&path).unwrap(), payload.bytes);
    }
}
