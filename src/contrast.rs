//! # Contrast Check
//!
//! WCAG 2.0 contrast ratio between the foreground and background colors.
//!
//! The ratio is advisory: a failing pair still produces a code, the caller
//! only surfaces a warning.
//!
//! ## Algorithm
//!
//! ```text
//! c'  = c / 255
//! c'' = c' / 12.92                       if c' <= 0.03928
//!       ((c' + 0.055) / 1.055) ^ 2.4     otherwise
//! L   = 0.2126 R'' + 0.7152 G'' + 0.0722 B''
//!
//! ratio = (L_max + 0.05) / (L_min + 0.05), rounded to 2 decimals
//! ```
//!
//! A ratio of at least [`MIN_CONTRAST_RATIO`] (WCAG AA for normal text) is
//! treated as good enough for scanners.

use serde::Serialize;

use crate::color::Color;
use crate::style::StyleConfig;

/// WCAG AA threshold.
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

fn linearize(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in [0.0, 1.0].
pub fn relative_luminance(color: Color) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Contrast ratio between two colors, in [1.0, 21.0], rounded to 2 decimals.
///
/// Symmetric: the lighter color is always the numerator.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la > lb { (la, lb) } else { (lb, la) };
    let ratio = (lighter + 0.05) / (darker + 0.05);
    (ratio * 100.0).round() / 100.0
}

/// True when the pair meets [`MIN_CONTRAST_RATIO`].
pub fn has_good_contrast(a: Color, b: Color) -> bool {
    ContrastReport::between(a, b).passes
}

/// Contrast verdict for a style, attached to every rendered code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastReport {
    pub ratio: f64,
    pub passes: bool,
}

impl ContrastReport {
    /// Verdict for an arbitrary color pair.
    pub fn between(a: Color, b: Color) -> Self {
        let ratio = contrast_ratio(a, b);
        Self {
            ratio,
            passes: ratio >= MIN_CONTRAST_RATIO,
        }
    }

    pub fn evaluate(style: &StyleConfig) -> Self {
        Self::between(style.foreground, style.background)
    }

    /// User-facing warning, or `None` when the pair passes.
    pub fn warning(&self) -> Option<String> {
        if self.passes {
            None
        } else {
            Some(format!(
                "Low contrast ({:.2}:1, recommended at least {}:1). The QR code may be hard to scan.",
                self.ratio, MIN_CONTRAST_RATIO
            ))
        }
    }
}
