//! Tick label formatting and text measurement.

use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::error::GaugeError;
use crate::geometry::Size;

/// Turns a tick value into the text written on the dial.
///
/// This is the gauge's extension point for custom tick labels (symbolic
/// units, fractions of π, blank dials). Closures `Fn(f64) -> String`
/// implement it directly.
pub trait TickFormatter {
    fn format_tick(&self, value: f64) -> String;
}

/// Default formatter: integer truncation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerTicks;

impl TickFormatter for IntegerTicks {
    fn format_tick(&self, value: f64) -> String {
        format!("{}", value.trunc() as i64)
    }
}

impl<F> TickFormatter for F
where
    F: Fn(f64) -> String,
{
    fn format_tick(&self, value: f64) -> String {
        self(value)
    }
}

/// Measures rendered text so layers can centre it.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64, bold: bool) -> Size;
}

/// Font-free estimate: fixed advance per character and a line height
/// proportional to the font size. Used when no font is loaded.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMetrics {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for ApproxMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for ApproxMetrics {
    fn measure(&self, text: &str, font_size: f64, bold: bool) -> Size {
        let chars = text.chars().count() as f64;
        if chars == 0.0 {
            return Size::default();
        }
        let extra = if bold { 1.0 } else { 0.0 };
        Size::new(
            chars * self.advance * font_size + extra,
            self.line_height * font_size,
        )
    }
}

/// Exact metrics from a TrueType/OpenType font.
#[derive(Clone)]
pub struct FontMetrics {
    font: Font<'static>,
}

impl FontMetrics {
    pub fn new(font: Font<'static>) -> Self {
        Self { font }
    }

    pub fn from_file(path: &Path) -> Result<Self, GaugeError> {
        load_font(path).map(Self::new)
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }
}

impl TextMeasure for FontMetrics {
    fn measure(&self, text: &str, font_size: f64, bold: bool) -> Size {
        let scale = Scale::uniform(font_size as f32);
        let v_metrics = self.font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let width = glyphs
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        let extra = if bold && width > 0.0 { 1.0 } else { 0.0 };
        Size::new(
            f64::from(width.ceil()) + extra,
            f64::from((v_metrics.ascent - v_metrics.descent).ceil()),
        )
    }
}

pub fn load_font(path: &Path) -> Result<Font<'static>, GaugeError> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes).ok_or_else(|| GaugeError::Font(path.display().to_string()))
}

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// First bold sans-serif font found in the usual system locations. The list
/// is best-effort; `--font` (or [`load_font`]) overrides it.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}
