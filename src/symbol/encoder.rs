//! `qrcode`-backed symbol encoder.

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use super::vector::{Primitive, RoundedRect, Shape, VectorSymbol, ViewBox};
use super::{EncodeError, EncodeRequest, ErrorCorrection, Symbol, SymbolEncoder, SymbolFormat};

/// Side of a finder pattern in modules.
pub const FINDER_SIZE: usize = 7;

/// Top-left module of each finder pattern for a symbol `width` modules wide,
/// in emission order: top-left, top-right, bottom-left.
pub fn finder_origins(width: usize) -> [(usize, usize); 3] {
    let far = width.saturating_sub(FINDER_SIZE);
    [(0, 0), (far, 0), (0, far)]
}

fn in_finder(x: usize, y: usize, width: usize) -> bool {
    finder_origins(width)
        .iter()
        .any(|&(fx, fy)| x >= fx && x < fx + FINDER_SIZE && y >= fy && y < fy + FINDER_SIZE)
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Encoder built on the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder;

impl QrCodeEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous encode; the async trait method delegates here.
    pub fn encode_now(&self, request: &EncodeRequest) -> Result<Symbol, EncodeError> {
        let code = QrCode::with_error_correction_level(request.data.as_bytes(), request.ec_level.into())
            .map_err(|e| EncodeError::Rejected(e.to_string()))?;

        Ok(match request.format {
            SymbolFormat::Vector => Symbol::Vector(vector_symbol(&code, request)),
            SymbolFormat::Raster => Symbol::Raster(raster_symbol(&code, request)),
        })
    }
}

#[async_trait]
impl SymbolEncoder for QrCodeEncoder {
    /// Runs [`encode_now`](Self::encode_now) on the blocking pool.
    async fn encode(&self, request: &EncodeRequest) -> Result<Symbol, EncodeError> {
        let encoder = *self;
        let request = request.clone();
        tokio::task::spawn_blocking(move || encoder.encode_now(&request))
            .await
            .map_err(|e| EncodeError::Backend(e.to_string()))?
    }
}

/// Build the primitive model: finder paths first, then module rects.
fn vector_symbol(code: &QrCode, request: &EncodeRequest) -> VectorSymbol {
    let n = code.width();
    let m = request.margin as usize;
    let fill = request.foreground;
    let offset = |v: usize| (v + m) as f32;

    let mut primitives = Vec::new();

    for (fx, fy) in finder_origins(n) {
        // outer ring, gap, center; even-odd turns the nesting into a ring
        let subpaths = (0..3)
            .map(|inset| {
                let side = (FINDER_SIZE - 2 * inset) as f32;
                RoundedRect::new(offset(fx + inset), offset(fy + inset), side, side)
            })
            .collect();
        primitives.push(Primitive::new(Shape::Path { subpaths }, fill));
    }

    for y in 0..n {
        for x in 0..n {
            if code[(x, y)] == qrcode::Color::Dark && !in_finder(x, y, n) {
                let rect = RoundedRect::new(offset(x), offset(y), 1.0, 1.0);
                primitives.push(Primitive::new(Shape::Rect(rect), fill));
            }
        }
    }

    VectorSymbol {
        width: request.width,
        height: request.width,
        view_box: ViewBox::square((n + 2 * m) as f32),
        background: Some(request.background),
        primitives,
    }
}

/// Bitmap exactly `request.width` pixels wide. Modules are drawn at the
/// largest whole-pixel size that fits, then scaled with nearest-neighbor
/// sampling to the requested width.
fn raster_symbol(code: &QrCode, request: &EncodeRequest) -> RgbaImage {
    let total = (code.width() as u32 + 2 * request.margin).max(1);
    let module_px = (request.width / total).max(1);

    let modules = code
        .render::<Rgba<u8>>()
        .quiet_zone(false)
        .module_dimensions(module_px, module_px)
        .dark_color(request.foreground.to_rgba())
        .light_color(request.background.to_rgba())
        .build();

    let side = module_px * total;
    let mut canvas = RgbaImage::from_pixel(side, side, request.background.to_rgba());
    let inset = (request.margin * module_px) as i64;
    imageops::replace(&mut canvas, &modules, inset, inset);

    if side == request.width {
        canvas
    } else {
        imageops::resize(&canvas, request.width, request.width, FilterType::Nearest)
    }
}
