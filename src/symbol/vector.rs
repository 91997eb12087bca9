//! Vector primitive model.
//!
//! A [`VectorSymbol`] is the QR symbol as an ordered list of filled shapes in
//! view-box units, plus the background rectangle that forms the quiet zone.
//! The style applier rewrites primitives in place; [`super::svg`] turns the
//! model into markup and back.
//!
//! ```text
//!   width × height (pixels)
//!   ┌───────────────────────────┐
//!   │ background (quiet zone)   │   viewBox = 0 0 n+2m n+2m
//!   │  ┌───┐           ┌───┐    │   primitives[0..3]  finder paths
//!   │  │ ▣ │  ▪ ▪  ▪   │ ▣ │    │   primitives[3..]   module rects
//!   │  └───┘   ▪ ▪▪    └───┘    │
//!   │  ┌───┐ ▪   ▪ ▪  ▪         │
//!   │  │ ▣ │  ▪▪   ▪            │
//!   │  └───┘                    │
//!   └───────────────────────────┘
//! ```

use crate::color::Color;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero (or negative) area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BBox::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Rectangle with an optional corner radius (the SVG `rx`/`ry` pair).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl RoundedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            radius: 0.0,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x, self.y, self.width, self.height)
    }

    /// Copy with the radius set, clamped to half the shorter side.
    pub fn with_radius(&self, radius: f32) -> Self {
        let max = (self.width.min(self.height) / 2.0).max(0.0);
        Self {
            radius: radius.clamp(0.0, max),
            ..*self
        }
    }

    /// Point test, half-open on the right and bottom edges.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        if px < self.x || py < self.y || px >= self.x + self.width || py >= self.y + self.height {
            return false;
        }
        if self.radius <= 0.0 {
            return true;
        }
        let r = self.radius.min(self.width.min(self.height) / 2.0);
        // distance to the nearest point of the inner (radius-shrunk) rectangle
        let cx = px.clamp(self.x + r, self.x + self.width - r);
        let cy = py.clamp(self.y + r, self.y + self.height - r);
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= r * r
    }
}

/// Filled shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A single module, or any plain rectangle.
    Rect(RoundedRect),
    /// Even-odd combination of rectangular subpaths (finder patterns).
    Path { subpaths: Vec<RoundedRect> },
    Circle { cx: f32, cy: f32, r: f32 },
}

impl Shape {
    pub fn bbox(&self) -> BBox {
        match self {
            Shape::Rect(rect) => rect.bbox(),
            Shape::Path { subpaths } => subpaths
                .iter()
                .map(RoundedRect::bbox)
                .reduce(|a, b| a.union(&b))
                .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0)),
            Shape::Circle { cx, cy, r } => BBox::new(cx - r, cy - r, 2.0 * r, 2.0 * r),
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains(px, py),
            Shape::Path { subpaths } => {
                subpaths.iter().filter(|s| s.contains(px, py)).count() % 2 == 1
            }
            Shape::Circle { cx, cy, r } => {
                let (dx, dy) = (px - cx, py - cy);
                dx * dx + dy * dy <= r * r
            }
        }
    }
}

/// One filled shape of the symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub fill: Color,
}

impl Primitive {
    pub fn new(shape: Shape, fill: Color) -> Self {
        Self { shape, fill }
    }

    pub fn bbox(&self) -> BBox {
        self.shape.bbox()
    }
}

/// SVG `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    pub fn square(size: f32) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: size,
            height: size,
        }
    }

    pub fn as_bbox(&self) -> BBox {
        BBox::new(self.min_x, self.min_y, self.width, self.height)
    }
}

/// A QR symbol as vector primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSymbol {
    /// Rendered width in pixels.
    pub width: u32,
    /// Rendered height in pixels.
    pub height: u32,
    pub view_box: ViewBox,
    /// Fill of the full-view-box rectangle behind everything (quiet zone).
    pub background: Option<Color>,
    /// Shapes in emission order.
    pub primitives: Vec<Primitive>,
}

impl VectorSymbol {
    /// View-box units covered by one horizontal pixel.
    pub fn units_per_pixel(&self) -> f32 {
        if self.width == 0 {
            return 1.0;
        }
        self.view_box.width / self.width as f32
    }

    /// Serialize to SVG markup.
    pub fn to_svg(&self) -> String {
        super::svg::serialize(self)
    }

    /// Parse SVG markup produced by [`Self::to_svg`] (or any markup using
    /// the same element subset).
    pub fn parse(markup: &str) -> Result<Self, super::svg::MarkupError> {
        super::svg::parse(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = RoundedRect::new(1.0, 1.0, 1.0, 1.0);
        assert!(r.contains(1.0, 1.0));
        assert!(r.contains(1.5, 1.99));
        assert!(!r.contains(2.0, 1.5));
        assert!(!r.contains(0.99, 1.5));
    }

    #[test]
    fn test_rounded_rect_cuts_corners() {
        let r = RoundedRect::new(0.0, 0.0, 10.0, 10.0).with_radius(4.0);
        assert!(r.contains(5.0, 0.1));
        assert!(!r.contains(0.2, 0.2));
        assert!(r.contains(4.0, 4.0));
    }

    #[test]
    fn test_radius_clamped_to_half_side() {
        let r = RoundedRect::new(0.0, 0.0, 1.0, 3.0).with_radius(5.0);
        assert_eq!(r.radius, 0.5);
        let r = RoundedRect::new(0.0, 0.0, 1.0, 3.0).with_radius(-1.0);
        assert_eq!(r.radius, 0.0);
    }

    #[test]
    fn test_path_even_odd_ring() {
        let finder = Shape::Path {
            subpaths: vec![
                RoundedRect::new(0.0, 0.0, 7.0, 7.0),
                RoundedRect::new(1.0, 1.0, 5.0, 5.0),
                RoundedRect::new(2.0, 2.0, 3.0, 3.0),
            ],
        };
        assert!(finder.contains(0.5, 0.5)); // outer ring
        assert!(!finder.contains(1.5, 1.5)); // gap
        assert!(finder.contains(3.5, 3.5)); // center
        assert_eq!(finder.bbox(), BBox::new(0.0, 0.0, 7.0, 7.0));
    }

    #[test]
    fn test_circle_bbox() {
        let c = Shape::Circle {
            cx: 3.5,
            cy: 3.5,
            r: 3.5,
        };
        assert_eq!(c.bbox(), BBox::new(0.0, 0.0, 7.0, 7.0));
        assert!(c.contains(3.5, 0.5));
        assert!(!c.contains(0.3, 0.3));
    }
}
