//! # Code Styling
//!
//! Colors and module shapes for a QR code, and the applier that reshapes a
//! vector symbol to match them.
//!
//! ## Shapes
//!
//! | Shape | Corner squares | Data dots |
//! |-------|----------------|-----------|
//! | `square` | untouched | untouched |
//! | `rounded` | radius = `corner_radius` | radius = `corner_radius / 2` |
//! | `dot` | circle in the bounding box | circle in the bounding box |
//!
//! Radii are in output pixels.

mod apply;

pub use apply::{apply_style, apply_style_markup, corner_indices};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Shape of a corner square or data dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Square,
    Rounded,
    Dot,
}

/// Visual configuration of a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub foreground: Color,
    pub background: Color,
    /// Corner rounding in pixels.
    pub corner_radius: u32,
    pub corner_square_type: ShapeType,
    pub dot_type: ShapeType,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            foreground: Color::BLACK,
            background: Color::WHITE,
            corner_radius: 0,
            corner_square_type: ShapeType::Square,
            dot_type: ShapeType::Square,
        }
    }
}

impl StyleConfig {
    /// True when applying the style cannot change any primitive.
    pub fn is_plain(&self) -> bool {
        self.corner_square_type == ShapeType::Square && self.dot_type == ShapeType::Square
    }
}
