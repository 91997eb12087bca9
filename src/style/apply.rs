//! Applies [`StyleConfig`] shapes to a vector symbol.

use tracing::warn;

use super::{ShapeType, StyleConfig};
use crate::color::Color;
use crate::symbol::{BBox, FINDER_SIZE, Primitive, Shape, VectorSymbol};

/// Relative tolerance when matching finder geometry.
const GEOMETRY_TOLERANCE: f32 = 0.01;

/// Indices of the primitives treated as corner squares.
///
/// Three primitives with a square bounding box seven modules wide, one in each
/// of three different quadrants, win. Anything else falls back to the encoder
/// order, where the first three primitives are the finders.
pub fn corner_indices(symbol: &VectorSymbol) -> Vec<usize> {
    match finder_geometry(symbol) {
        Some(found) => found,
        None => (0..symbol.primitives.len().min(3)).collect(),
    }
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= GEOMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn finder_geometry(symbol: &VectorSymbol) -> Option<Vec<usize>> {
    // smallest primitive side is one module
    let module = symbol
        .primitives
        .iter()
        .map(|p| p.bbox())
        .filter(|b| !b.is_empty())
        .map(|b| b.width.min(b.height))
        .reduce(f32::min)?;
    let finder_side = module * FINDER_SIZE as f32;

    let candidates: Vec<(usize, BBox)> = symbol
        .primitives
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.bbox()))
        .filter(|(_, b)| close(b.width, b.height) && close(b.width, finder_side))
        .collect();

    if candidates.len() != 3 {
        return None;
    }

    let (mid_x, mid_y) = symbol.view_box.as_bbox().center();
    let mut quadrants: Vec<(bool, bool)> = candidates
        .iter()
        .map(|(_, b)| {
            let (cx, cy) = b.center();
            (cx >= mid_x, cy >= mid_y)
        })
        .collect();
    quadrants.sort();
    quadrants.dedup();
    if quadrants.len() != 3 {
        return None;
    }

    Some(candidates.into_iter().map(|(i, _)| i).collect())
}

/// Reshape one primitive. `radius` is in view-box units.
fn restyle(primitive: &Primitive, shape: ShapeType, radius: f32, foreground: Color) -> Primitive {
    let bbox = primitive.bbox();
    if bbox.is_empty() {
        return primitive.clone();
    }

    match shape {
        ShapeType::Square => primitive.clone(),
        ShapeType::Rounded => {
            let shape = match &primitive.shape {
                Shape::Rect(rect) => Shape::Rect(rect.with_radius(radius)),
                Shape::Path { subpaths } => Shape::Path {
                    subpaths: subpaths.iter().map(|s| s.with_radius(radius)).collect(),
                },
                circle @ Shape::Circle { .. } => circle.clone(),
            };
            Primitive::new(shape, primitive.fill)
        }
        ShapeType::Dot => {
            let (cx, cy) = bbox.center();
            let r = bbox.width.min(bbox.height) / 2.0;
            Primitive::new(Shape::Circle { cx, cy, r }, foreground)
        }
    }
}

/// Apply corner and dot shapes.
///
/// Order, dimensions, view box and background are preserved. With
/// `square`/`square` every primitive comes back unchanged.
pub fn apply_style(symbol: &VectorSymbol, style: &StyleConfig) -> VectorSymbol {
    let units = symbol.units_per_pixel();
    let corner_radius = style.corner_radius as f32 * units;
    let dot_radius = style.corner_radius as f32 / 2.0 * units;
    let corners = corner_indices(symbol);

    let primitives = symbol
        .primitives
        .iter()
        .enumerate()
        .map(|(i, primitive)| {
            if corners.contains(&i) {
                restyle(primitive, style.corner_square_type, corner_radius, style.foreground)
            } else {
                restyle(primitive, style.dot_type, dot_radius, style.foreground)
            }
        })
        .collect();

    VectorSymbol {
        primitives,
        ..symbol.clone()
    }
}

/// [`apply_style`] on SVG markup.
///
/// Markup outside the supported subset is returned unchanged.
pub fn apply_style_markup(markup: &str, style: &StyleConfig) -> String {
    if style.is_plain() {
        return markup.to_string();
    }
    match VectorSymbol::parse(markup) {
        Ok(symbol) => apply_style(&symbol, style).to_svg(),
        Err(e) => {
            warn!(error = %e, "could not parse symbol markup, leaving it unstyled");
            markup.to_string()
        }
    }
}
