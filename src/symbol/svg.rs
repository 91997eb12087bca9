//! # SVG Serializer and Parser
//!
//! Converts a [`VectorSymbol`] to SVG markup and back. Only the element
//! subset the encoder emits is understood:
//!
//! | Element | Model |
//! |---------|-------|
//! | `<svg width height viewBox>` | symbol dimensions |
//! | first `<rect>` covering the whole view box | background (quiet zone) |
//! | `<rect x y width height rx ry fill>` | [`Shape::Rect`] |
//! | `<path d fill>` | [`Shape::Path`] (rectangular subpaths, even-odd) |
//! | `<circle cx cy r fill>` | [`Shape::Circle`] |
//!
//! Path data may use `M L H V A Z` (absolute or relative). Each subpath is
//! reduced to its bounding rectangle; the radius of its first arc becomes the
//! corner radius. Curves and diagonal lines are rejected.
//!
//! ## Output Example
//!
//! ```text
//! <svg xmlns="http://www.w3.org/2000/svg" width="300" height="300" viewBox="0 0 23 23" shape-rendering="crispEdges">
//! <rect x="0" y="0" width="23" height="23" fill="#ffffff"/>
//! <path d="M1 1h7v7h-7zM2 2h5v5h-5zM3 3h3v3h-3z" fill="#000000" fill-rule="evenodd"/>
//! <rect x="9" y="1" width="1" height="1" fill="#000000"/>
//! </svg>
//! ```

use std::fmt::Write as _;

use thiserror::Error;

use super::vector::{Primitive, RoundedRect, Shape, VectorSymbol, ViewBox};
use crate::color::{Color, ColorError};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Largest accepted `width`/`height` of parsed markup, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Errors from [`parse`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("markup has no <svg> root element")]
    MissingRoot,

    #[error("unsupported element <{0}>")]
    UnsupportedElement(String),

    #[error("missing attribute '{attr}' on <{element}>")]
    MissingAttribute { element: String, attr: &'static str },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error(transparent)]
    InvalidColor(#[from] ColorError),

    #[error("unsupported path data: {0}")]
    UnsupportedPath(String),

    #[error("malformed markup: {0}")]
    Malformed(String),
}

// ============================================================================
// SERIALIZER
// ============================================================================

/// Format a coordinate: integers without a fraction, otherwise up to three
/// decimals with trailing zeros trimmed.
pub fn fmt_num(v: f32) -> String {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-4 {
        return format!("{}", rounded as i64);
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn subpath_data(out: &mut String, rect: &RoundedRect) {
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    let r = rect.radius.min(w.min(h) / 2.0);
    if r <= 0.0 {
        let _ = write!(
            out,
            "M{} {}h{}v{}h{}z",
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            fmt_num(-w)
        );
        return;
    }

    let (rs, nr) = (fmt_num(r), fmt_num(-r));
    let (hw, hh) = (w - 2.0 * r, h - 2.0 * r);
    let _ = write!(out, "M{} {}", fmt_num(x + r), fmt_num(y));
    let _ = write!(out, "h{}a{rs} {rs} 0 0 1 {rs} {rs}", fmt_num(hw));
    let _ = write!(out, "v{}a{rs} {rs} 0 0 1 {nr} {rs}", fmt_num(hh));
    let _ = write!(out, "h{}a{rs} {rs} 0 0 1 {nr} {nr}", fmt_num(-hw));
    let _ = write!(out, "v{}a{rs} {rs} 0 0 1 {rs} {nr}z", fmt_num(-hh));
}

/// Path `d` attribute for a set of rectangular subpaths.
pub fn path_data(subpaths: &[RoundedRect]) -> String {
    let mut d = String::new();
    for rect in subpaths {
        subpath_data(&mut d, rect);
    }
    d
}

fn write_primitive(out: &mut String, primitive: &Primitive) {
    let fill = primitive.fill;
    let _ = match &primitive.shape {
        Shape::Rect(rect) => {
            let _ = write!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                fmt_num(rect.x),
                fmt_num(rect.y),
                fmt_num(rect.width),
                fmt_num(rect.height)
            );
            if rect.radius > 0.0 {
                let r = fmt_num(rect.radius);
                let _ = write!(out, " rx=\"{r}\" ry=\"{r}\"");
            }
            writeln!(out, " fill=\"{fill}\"/>")
        }
        Shape::Path { subpaths } => writeln!(
            out,
            "<path d=\"{}\" fill=\"{fill}\" fill-rule=\"evenodd\"/>",
            path_data(subpaths)
        ),
        Shape::Circle { cx, cy, r } => writeln!(
            out,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{fill}\"/>",
            fmt_num(*cx),
            fmt_num(*cy),
            fmt_num(*r)
        ),
    };
}

/// Opening `<svg>` tag and background; shared with overlay writers.
pub(crate) fn write_header(out: &mut String, symbol: &VectorSymbol) {
    let vb = symbol.view_box;
    let _ = writeln!(
        out,
        "<svg xmlns=\"{SVG_NS}\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\" shape-rendering=\"crispEdges\">",
        symbol.width,
        symbol.height,
        fmt_num(vb.min_x),
        fmt_num(vb.min_y),
        fmt_num(vb.width),
        fmt_num(vb.height)
    );
    if let Some(background) = symbol.background {
        let _ = writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{background}\"/>",
            fmt_num(vb.min_x),
            fmt_num(vb.min_y),
            fmt_num(vb.width),
            fmt_num(vb.height)
        );
    }
}

/// Primitives in order, without the surrounding `<svg>`.
pub(crate) fn write_body(out: &mut String, symbol: &VectorSymbol) {
    for primitive in &symbol.primitives {
        write_primitive(out, primitive);
    }
}

/// Serialize a symbol to SVG markup.
pub fn serialize(symbol: &VectorSymbol) -> String {
    let mut out = String::with_capacity(64 * (symbol.primitives.len() + 2));
    write_header(&mut out, symbol);
    write_body(&mut out, symbol);
    out.push_str("</svg>\n");
    out
}

// ============================================================================
// TAG SCANNER
// ============================================================================

struct Element<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, String)>,
}

impl Element<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    fn number(&self, name: &'static str) -> Result<f32, MarkupError> {
        let raw = self.attr(name).ok_or_else(|| MarkupError::MissingAttribute {
            element: self.name.to_string(),
            attr: name,
        })?;
        parse_number(raw)
    }

    fn number_or(&self, name: &'static str, default: f32) -> Result<f32, MarkupError> {
        match self.attr(name) {
            Some(raw) => parse_number(raw),
            None => Ok(default),
        }
    }

    /// Missing fill is black, per SVG defaults.
    fn fill(&self) -> Result<Color, MarkupError> {
        match self.attr("fill") {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(Color::BLACK),
        }
    }
}

fn parse_number(raw: &str) -> Result<f32, MarkupError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed);
    trimmed
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MarkupError::InvalidNumber(raw.to_string()))
}

/// Rendered pixel size from a `width`/`height` value, bounded by
/// [`MAX_DIMENSION`].
fn pixel_dimension(value: f32, attr: &str) -> Result<u32, MarkupError> {
    let rounded = value.round();
    if !(0.0..=MAX_DIMENSION as f32).contains(&rounded) {
        return Err(MarkupError::Malformed(format!(
            "{attr} {value} outside 0..={MAX_DIMENSION}"
        )));
    }
    Ok(rounded as u32)
}

/// Escape a value for a double-quoted attribute.
pub(crate) fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Opening (and self-closing) tags in document order. Declarations,
/// comments, closing tags and text are skipped.
fn scan_elements(markup: &str) -> Result<Vec<Element<'_>>, MarkupError> {
    let mut elements = Vec::new();
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        rest = &rest[start..];

        let skip_to = |rest: &str, end: &str| -> Result<usize, MarkupError> {
            rest.find(end)
                .map(|i| i + end.len())
                .ok_or_else(|| MarkupError::Malformed(format!("unterminated '{}'", &rest[..2])))
        };

        if rest.starts_with("<?") {
            rest = &rest[skip_to(rest, "?>")?..];
            continue;
        }
        if rest.starts_with("<!--") {
            rest = &rest[skip_to(rest, "-->")?..];
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("</") {
            rest = &rest[skip_to(rest, ">")?..];
            continue;
        }

        let body = &rest[1..];
        let name_end = body
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .ok_or_else(|| MarkupError::Malformed("unterminated tag".into()))?;
        let name = &body[..name_end];
        if name.is_empty() {
            return Err(MarkupError::Malformed("empty tag name".into()));
        }

        let mut attrs = Vec::new();
        let mut cursor = &body[name_end..];
        loop {
            cursor = cursor.trim_start();
            if let Some(after) = cursor.strip_prefix("/>") {
                cursor = after;
                break;
            }
            if let Some(after) = cursor.strip_prefix('>') {
                cursor = after;
                break;
            }
            // the name must be followed by '=' before the tag closes
            let eq = cursor
                .find(['=', '>'])
                .filter(|&i| cursor[i..].starts_with('='))
                .filter(|&i| {
                    let key = cursor[..i].trim();
                    !key.is_empty() && !key.contains(char::is_whitespace)
                })
                .ok_or_else(|| MarkupError::Malformed(format!("attribute without value in <{name}>")))?;
            let key = cursor[..eq].trim();
            let after_eq = cursor[eq + 1..].trim_start();
            let quote = after_eq
                .chars()
                .next()
                .filter(|q| *q == '"' || *q == '\'')
                .ok_or_else(|| MarkupError::Malformed(format!("unquoted attribute '{key}'")))?;
            let value_start = &after_eq[1..];
            let value_end = value_start
                .find(quote)
                .ok_or_else(|| MarkupError::Malformed(format!("unterminated attribute '{key}'")))?;
            attrs.push((key, unescape(&value_start[..value_end])));
            cursor = &value_start[value_end + 1..];
        }

        elements.push(Element { name, attrs });
        rest = cursor;
    }

    Ok(elements)
}

// ============================================================================
// PATH DATA
// ============================================================================

enum PathToken {
    Command(char),
    Number(f32),
}

fn tokenize_path(d: &str) -> Result<Vec<PathToken>, MarkupError> {
    let mut tokens = Vec::new();
    let bytes = d.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(PathToken::Command(c));
            i += 1;
        } else if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() {
            let start = i;
            i += 1;
            let mut seen_dot = c == '.';
            while i < bytes.len() {
                let n = bytes[i] as char;
                if n.is_ascii_digit() {
                    i += 1;
                } else if n == '.' && !seen_dot {
                    seen_dot = true;
                    i += 1;
                } else if (n == 'e' || n == 'E') && i + 1 < bytes.len() {
                    i += 1;
                    if bytes[i] == b'-' || bytes[i] == b'+' {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            tokens.push(PathToken::Number(parse_number(&d[start..i])?));
        } else {
            return Err(MarkupError::UnsupportedPath(format!("unexpected '{c}'")));
        }
    }

    Ok(tokens)
}

#[derive(Default)]
struct Subpath {
    min: (f32, f32),
    max: (f32, f32),
    radius: Option<f32>,
    points: usize,
}

impl Subpath {
    fn add(&mut self, x: f32, y: f32) {
        if self.points == 0 {
            self.min = (x, y);
            self.max = (x, y);
        } else {
            self.min = (self.min.0.min(x), self.min.1.min(y));
            self.max = (self.max.0.max(x), self.max.1.max(y));
        }
        self.points += 1;
    }

    fn finish(&self) -> Option<RoundedRect> {
        if self.points < 2 {
            return None;
        }
        let rect = RoundedRect::new(
            self.min.0,
            self.min.1,
            self.max.0 - self.min.0,
            self.max.1 - self.min.1,
        );
        Some(rect.with_radius(self.radius.unwrap_or(0.0)))
    }
}

/// Reduce path data to rectangular subpaths.
pub fn parse_path_data(d: &str) -> Result<Vec<RoundedRect>, MarkupError> {
    let tokens = tokenize_path(d)?;
    let mut rects = Vec::new();
    let mut current = Subpath::default();
    let (mut x, mut y) = (0.0f32, 0.0f32);
    let (mut start_x, mut start_y) = (0.0f32, 0.0f32);
    let mut command: Option<char> = None;
    let mut i = 0;

    let take = |i: &mut usize, n: usize| -> Result<Vec<f32>, MarkupError> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match tokens.get(*i) {
                Some(PathToken::Number(v)) => out.push(*v),
                _ => return Err(MarkupError::UnsupportedPath("missing arguments".into())),
            }
            *i += 1;
        }
        Ok(out)
    };

    while i < tokens.len() {
        let cmd = match tokens[i] {
            PathToken::Command(c) => {
                i += 1;
                c
            }
            // repeated arguments reuse the previous command (M becomes L)
            PathToken::Number(_) => match command {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) if c != 'z' && c != 'Z' => c,
                _ => return Err(MarkupError::UnsupportedPath("number before command".into())),
            },
        };
        command = Some(cmd);
        let relative = cmd.is_ascii_lowercase();

        match cmd.to_ascii_uppercase() {
            'M' => {
                if let Some(rect) = current.finish() {
                    rects.push(rect);
                }
                current = Subpath::default();
                let a = take(&mut i, 2)?;
                if relative {
                    x += a[0];
                    y += a[1];
                } else {
                    x = a[0];
                    y = a[1];
                }
                start_x = x;
                start_y = y;
                current.add(x, y);
            }
            'L' => {
                let a = take(&mut i, 2)?;
                let (nx, ny) = if relative { (x + a[0], y + a[1]) } else { (a[0], a[1]) };
                if nx != x && ny != y {
                    return Err(MarkupError::UnsupportedPath("diagonal line".into()));
                }
                x = nx;
                y = ny;
                current.add(x, y);
            }
            'H' => {
                let a = take(&mut i, 1)?;
                x = if relative { x + a[0] } else { a[0] };
                current.add(x, y);
            }
            'V' => {
                let a = take(&mut i, 1)?;
                y = if relative { y + a[0] } else { a[0] };
                current.add(x, y);
            }
            'A' => {
                let a = take(&mut i, 7)?;
                if current.radius.is_none() {
                    current.radius = Some(a[0].abs().min(a[1].abs()));
                }
                if relative {
                    x += a[5];
                    y += a[6];
                } else {
                    x = a[5];
                    y = a[6];
                }
                current.add(x, y);
            }
            'Z' => {
                x = start_x;
                y = start_y;
            }
            other => {
                return Err(MarkupError::UnsupportedPath(format!("command '{other}'")));
            }
        }
    }

    if let Some(rect) = current.finish() {
        rects.push(rect);
    }
    Ok(rects)
}

// ============================================================================
// PARSER
// ============================================================================

fn covers(rect: &RoundedRect, view_box: &ViewBox) -> bool {
    rect.x <= view_box.min_x
        && rect.y <= view_box.min_y
        && rect.x + rect.width >= view_box.min_x + view_box.width
        && rect.y + rect.height >= view_box.min_y + view_box.height
}

/// Parse markup into a [`VectorSymbol`].
pub fn parse(markup: &str) -> Result<VectorSymbol, MarkupError> {
    let elements = scan_elements(markup)?;
    let mut iter = elements.iter();

    let root = iter.next().ok_or(MarkupError::MissingRoot)?;
    if root.name != "svg" {
        return Err(MarkupError::MissingRoot);
    }

    let view_box = match root.attr("viewBox") {
        Some(raw) => {
            let parts = raw
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(parse_number)
                .collect::<Result<Vec<_>, _>>()?;
            if parts.len() != 4 {
                return Err(MarkupError::Malformed(format!("viewBox '{raw}'")));
            }
            ViewBox {
                min_x: parts[0],
                min_y: parts[1],
                width: parts[2],
                height: parts[3],
            }
        }
        None => {
            let w = root.number("width")?;
            let h = root.number("height")?;
            ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: w,
                height: h,
            }
        }
    };
    let width = pixel_dimension(root.number_or("width", view_box.width)?, "width")?;
    let height = pixel_dimension(root.number_or("height", view_box.height)?, "height")?;

    let mut background = None;
    let mut primitives = Vec::new();

    for element in iter {
        let fill = element.fill()?;
        let shape = match element.name {
            "rect" => {
                let rx = element.number_or("rx", 0.0)?;
                let ry = element.number_or("ry", rx)?;
                let rx = if element.attr("rx").is_some() { rx } else { ry };
                let rect = RoundedRect::new(
                    element.number_or("x", 0.0)?,
                    element.number_or("y", 0.0)?,
                    element.number("width")?,
                    element.number("height")?,
                )
                .with_radius(rx.min(ry));

                if background.is_none() && primitives.is_empty() && covers(&rect, &view_box) {
                    background = Some(fill);
                    continue;
                }
                Shape::Rect(rect)
            }
            "path" => {
                let d = element.attr("d").ok_or_else(|| MarkupError::MissingAttribute {
                    element: "path".into(),
                    attr: "d",
                })?;
                Shape::Path {
                    subpaths: parse_path_data(d)?,
                }
            }
            "circle" => Shape::Circle {
                cx: element.number_or("cx", 0.0)?,
                cy: element.number_or("cy", 0.0)?,
                r: element.number("r")?,
            },
            other => return Err(MarkupError::UnsupportedElement(other.to_string())),
        };
        primitives.push(Primitive::new(shape, fill));
    }

    Ok(VectorSymbol {
        width,
        height,
        view_box,
        background,
        primitives,
    })
}
