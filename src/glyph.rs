//! Glyph measurement behind a provider trait, plus the advance rule every
//! stroke and spring uses.

use crate::settings::{MIN_ADVANCE_EM, MIN_THIN_EM};
use std::collections::HashMap;

/// Font identity for measurement: pixel size and CSS-style weight (100-900)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub weight: u16,
}

impl FontSpec {
    pub fn new(size: f32, weight: u16) -> Self {
        Self { size, weight }
    }
}

/// Host text measurement
pub trait GlyphMetrics {
    /// Natural advance width of `ch` in pixels
    fn width(&self, ch: char, font: &FontSpec) -> f32;

    /// Distance from baseline to the top of the em box
    fn ascent(&self, font: &FontSpec) -> f32 {
        font.size * 0.78
    }

    /// Distance from baseline to the bottom of the em box
    fn descent(&self, font: &FontSpec) -> f32 {
        font.size * 0.22
    }
}

/// Measured width of `ch` with thin glyphs floored to `MIN_THIN_EM`
pub fn visual_width(metrics: &dyn GlyphMetrics, ch: char, font: &FontSpec) -> f32 {
    metrics.width(ch, font).max(MIN_THIN_EM * font.size)
}

/// Final advance for `ch`: the visual width scaled by `char_spacing`, never
/// below `MIN_ADVANCE_EM`.
pub fn advance(metrics: &dyn GlyphMetrics, ch: char, font: &FontSpec, char_spacing: f32) -> f32 {
    (visual_width(metrics, ch, font) * char_spacing).max(MIN_ADVANCE_EM * font.size)
}

/// Collision radius for a glyph of the given visual width and em-box height
pub fn collision_radius(width: f32, height: f32) -> f32 {
    (height * 0.5).max(0.45 * width) * 0.85
}

/// Approximates a proportional sans-serif face with a handful of width classes.
/// Terminals cannot measure text, so this stands in for the host's measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalMetrics;

impl ProportionalMetrics {
    fn em_width(ch: char) -> f32 {
        match ch {
            ' ' => 0.28,
            'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' | '`' => 0.24,
            'I' | '1' | 'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.34,
            'M' | 'W' | 'm' | 'w' | '@' | '%' => 0.86,
            'A'..='Z' | '&' | '#' => 0.67,
            '0'..='9' => 0.56,
            c if c.is_alphabetic() => 0.54,
            _ => 0.6,
        }
    }
}

impl GlyphMetrics for ProportionalMetrics {
    fn width(&self, ch: char, font: &FontSpec) -> f32 {
        // Heavier weights run slightly wider
        let bold = 1.0 + (f32::from(font.weight.clamp(100, 900)) - 400.0).max(0.0) / 5000.0;
        Self::em_width(ch) * font.size * bold
    }
}

/// Fixed widths per character, measured at `reference_size` and scaled linearly.
/// With an empty table every glyph uses the fallback width (a monospace face).
#[derive(Debug, Clone)]
pub struct TableMetrics {
    reference_size: f32,
    widths: HashMap<char, f32>,
    fallback: f32,
    ascent: f32,
    descent: f32,
}

impl TableMetrics {
    pub fn new(reference_size: f32) -> Self {
        Self {
            reference_size,
            widths: HashMap::new(),
            fallback: reference_size * 0.6,
            ascent: reference_size * 0.78,
            descent: reference_size * 0.22,
        }
    }

    pub fn monospace() -> Self {
        Self::new(100.0)
    }

    fn scale(&self, font: &FontSpec) -> f32 {
        font.size / self.reference_size
    }
}

/// Fixture builders
#[cfg(test)]
impl TableMetrics {
    pub fn with_width(mut self, ch: char, width: f32) -> Self {
        self.widths.insert(ch, width);
        self
    }

    pub fn with_fallback(mut self, width: f32) -> Self {
        self.fallback = width;
        self
    }

    pub fn with_vertical(mut self, ascent: f32, descent: f32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }
}

impl GlyphMetrics for TableMetrics {
    fn width(&self, ch: char, font: &FontSpec) -> f32 {
        self.widths.get(&ch).copied().unwrap_or(self.fallback) * self.scale(font)
    }

    fn ascent(&self, font: &FontSpec) -> f32 {
        self.ascent * self.scale(font)
    }

    fn descent(&self, font: &FontSpec) -> f32 {
        self.descent * self.scale(font)
    }
}

/// Per-character advance and collision radius for the current font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInfo {
    pub advance: f32,
    pub radius: f32,
}

/// Owns the metrics provider and memoises `advance` per character.
/// Entries are dropped whenever the font or spacing changes.
pub struct GlyphCache {
    metrics: Box<dyn GlyphMetrics>,
    font: FontSpec,
    char_spacing: f32,
    entries: HashMap<char, GlyphInfo>,
}

impl GlyphCache {
    pub fn new(metrics: Box<dyn GlyphMetrics>, font: FontSpec, char_spacing: f32) -> Self {
        Self {
            metrics,
            font,
            char_spacing,
            entries: HashMap::new(),
        }
    }

    /// Point the cache at a font/spacing, invalidating it if either changed
    pub fn sync(&mut self, font: FontSpec, char_spacing: f32) {
        if font != self.font || char_spacing != self.char_spacing {
            self.font = font;
            self.char_spacing = char_spacing;
            self.entries.clear();
        }
    }

    pub fn font(&self) -> FontSpec {
        self.font
    }

    pub fn ascent(&self) -> f32 {
        self.metrics.ascent(&self.font)
    }

    pub fn descent(&self) -> f32 {
        self.metrics.descent(&self.font)
    }

    pub fn info(&mut self, ch: char) -> GlyphInfo {
        if let Some(info) = self.entries.get(&ch) {
            return *info;
        }
        let metrics = self.metrics.as_ref();
        let height = metrics.ascent(&self.font) + metrics.descent(&self.font);
        let info = GlyphInfo {
            advance: advance(metrics, ch, &self.font, self.char_spacing),
            radius: collision_radius(visual_width(metrics, ch, &self.font), height),
        };
        self.entries.insert(ch, info);
        info
    }
}
