//! # Rasterizer
//!
//! Turns a symbol into RGBA pixels and composites the optional logo.
//!
//! ## Pipeline
//!
//! ```text
//!   Symbol::Vector ──► paint primitives ──┐
//!                                         ├──► logo pad + logo ──► RgbaImage
//!   Symbol::Raster ──► clone bitmap ──────┘
//! ```
//!
//! Primitives are sampled at pixel centers, without anti-aliasing, so the
//! same inputs always give the same pixels.
//!
//! ## Logo Placement
//!
//! | Canvas | Region | Pad |
//! |--------|--------|-----|
//! | 300×300 | 75×75 at (112.5, 112.5) | pixels 110..=188 |
//!
//! The pad is the style background. The logo is stretched to the region and
//! alpha-composited over it.

mod logo;

pub use logo::{LOGO_PADDING, LOGO_SCALE, Logo, LogoError, LogoRegion};

use image::{RgbaImage, imageops};
use tracing::warn;

use crate::color::Color;
use crate::style::StyleConfig;
use crate::symbol::{MarkupError, Symbol, VectorSymbol};

/// Rasterize a symbol and composite the logo, if any.
///
/// A logo that fails to decode is skipped with a warning.
pub fn rasterize(symbol: &Symbol, style: &StyleConfig, logo: Option<&Logo>) -> RgbaImage {
    let mut canvas = match symbol {
        Symbol::Vector(vector) => paint_vector(vector, style.background),
        Symbol::Raster(bitmap) => bitmap.clone(),
    };

    if let Some(logo) = logo {
        match logo.decode() {
            Ok(decoded) => overlay_logo(&mut canvas, &decoded, style.background),
            Err(e) => warn!(error = %e, "logo could not be decoded, rendering without it"),
        }
    }

    canvas
}

/// [`rasterize`] for SVG markup in the supported subset.
pub fn rasterize_markup(
    markup: &str,
    style: &StyleConfig,
    logo: Option<&Logo>,
) -> Result<RgbaImage, MarkupError> {
    let vector = VectorSymbol::parse(markup)?;
    Ok(rasterize(&Symbol::Vector(vector), style, logo))
}

/// Paint a vector symbol onto a fresh `width × height` canvas.
pub fn paint_vector(symbol: &VectorSymbol, background: Color) -> RgbaImage {
    let (width, height) = (symbol.width, symbol.height);
    let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());
    if width == 0 || height == 0 {
        return canvas;
    }

    if let Some(fill) = symbol.background {
        for pixel in canvas.pixels_mut() {
            *pixel = fill.to_rgba();
        }
    }

    let vb = symbol.view_box;
    let sx = vb.width / width as f32;
    let sy = vb.height / height as f32;

    for primitive in &symbol.primitives {
        let bbox = primitive.bbox();
        if bbox.is_empty() {
            continue;
        }

        // pixel range whose centers can fall inside the bbox
        let x0 = ((bbox.x - vb.min_x) / sx).floor().max(0.0) as u32;
        let y0 = ((bbox.y - vb.min_y) / sy).floor().max(0.0) as u32;
        let x1 = (((bbox.right() - vb.min_x) / sx).ceil().max(0.0) as u32).min(width);
        let y1 = (((bbox.bottom() - vb.min_y) / sy).ceil().max(0.0) as u32).min(height);

        let color = primitive.fill.to_rgba();
        for py in y0..y1 {
            let uy = vb.min_y + (py as f32 + 0.5) * sy;
            for px in x0..x1 {
                let ux = vb.min_x + (px as f32 + 0.5) * sx;
                if primitive.shape.contains(ux, uy) {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }

    canvas
}

/// Paint the background pad, then the logo stretched over the centered region.
pub fn overlay_logo(canvas: &mut RgbaImage, logo: &RgbaImage, background: Color) {
    let (width, height) = canvas.dimensions();
    let region = LogoRegion::centered(width, height);
    let (x, y, side) = region.pixel_bounds();
    if side == 0 {
        return;
    }

    let (pad_x0, pad_y0, pad_x1, pad_y1) = region.padded_bounds();
    let pad = background.to_rgba();
    for py in pad_y0..pad_y1.min(height) {
        for px in pad_x0..pad_x1.min(width) {
            canvas.put_pixel(px, py, pad);
        }
    }

    let scaled = imageops::resize(logo, side, side, imageops::FilterType::Triangle);
    imageops::overlay(canvas, &scaled, x as i64, y as i64);
}
