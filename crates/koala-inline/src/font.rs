//! Font metrics interface for text measurement during line layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use crate::style::InlineStyle;

const fn is_zero_width(ch: char) -> bool {
    matches!(ch, '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}')
}

/// Measures text for the line breaker and the line constructor.
///
/// Implementations must be deterministic: the same characters measured
/// with the same style at the same position always produce the same
/// width. Incremental relayout relies on this to reproduce identical line
/// breaks for unchanged content.
pub trait FontMetrics {
    /// Advance width of `text[start..start + len]`.
    ///
    /// `x` is the horizontal position at which the run begins, for fonts
    /// whose tab stops depend on position. Word spacing is not included;
    /// the caller adds it once per inter-word boundary.
    fn width(&self, text: &[char], start: usize, len: usize, x: f32, style: &InlineStyle) -> f32;

    /// Height of the font above the baseline.
    fn ascent(&self, style: &InlineStyle) -> f32;

    /// Depth of the font below the baseline.
    fn descent(&self, style: &InlineStyle) -> f32;

    /// The font's natural line spacing (`line-height: normal`).
    fn line_spacing(&self, style: &InlineStyle) -> f32;

    /// Height of a lowercase `x`, used for `vertical-align: middle`.
    fn x_height(&self, style: &InlineStyle) -> f32 {
        self.ascent(style) / 2.0
    }

    /// The used line height: the explicit `line-height` if any, otherwise
    /// the font's line spacing.
    fn line_height(&self, style: &InlineStyle) -> f32 {
        style
            .line_height
            .unwrap_or_else(|| self.line_spacing(style))
    }
}

/// Approximate font metrics using fixed ratios.
///
/// Implementation note: Without access to actual font data, we use fixed
/// ratio approximations. The average advance width of Latin glyphs in a
/// proportional font is approximately 0.6× the font size. Line spacing
/// uses 1.2×, split 4:1 between ascent and descent.
///
/// Soft hyphens and zero-width format characters measure as zero; every
/// other character (including tabs and combining marks) measures as one
/// advance plus `letter-spacing`.
///
/// This is used as a fallback when no font is available, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_SPACING_RATIO: f32 = 1.2;

    fn advance(ch: char, style: &InlineStyle) -> f32 {
        if is_zero_width(ch) {
            0.0
        } else {
            style.font_size * Self::CHAR_WIDTH_RATIO + style.letter_spacing
        }
    }
}

impl FontMetrics for ApproximateFontMetrics {
    fn width(&self, text: &[char], start: usize, len: usize, _x: f32, style: &InlineStyle) -> f32 {
        let end = start.saturating_add(len).min(text.len());
        text.get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|&ch| Self::advance(ch, style))
            .sum()
    }

    fn ascent(&self, style: &InlineStyle) -> f32 {
        self.line_spacing(style) * 0.8
    }

    fn descent(&self, style: &InlineStyle) -> f32 {
        self.line_spacing(style) * 0.2
    }

    fn line_spacing(&self, style: &InlineStyle) -> f32 {
        style.font_size * Self::LINE_SPACING_RATIO
    }
}

/// Metrics of a monospace font: every visible character advances by the
/// same amount.
///
/// Soft hyphens and zero-width format characters measure as zero, as with
/// [`ApproximateFontMetrics`]. The font size in the style is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceFontMetrics {
    /// Advance of one character.
    pub advance: f32,
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
}

impl MonospaceFontMetrics {
    /// Create metrics with the given advance, ascent and descent.
    #[must_use]
    pub const fn new(advance: f32, ascent: f32, descent: f32) -> Self {
        Self {
            advance,
            ascent,
            descent,
        }
    }
}

impl Default for MonospaceFontMetrics {
    fn default() -> Self {
        Self::new(10.0, 8.0, 2.0)
    }
}

impl FontMetrics for MonospaceFontMetrics {
    fn width(&self, text: &[char], start: usize, len: usize, _x: f32, style: &InlineStyle) -> f32 {
        let end = start.saturating_add(len).min(text.len());
        text.get(start..end)
            .unwrap_or_default()
            .iter()
            .filter(|&&ch| !is_zero_width(ch))
            .map(|_| self.advance + style.letter_spacing)
            .sum()
    }

    fn ascent(&self, _style: &InlineStyle) -> f32 {
        self.ascent
    }

    fn descent(&self, _style: &InlineStyle) -> f32 {
        self.descent
    }

    fn line_spacing(&self, _style: &InlineStyle) -> f32 {
        self.ascent + self.descent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_width() {
        let style = InlineStyle {
            font_size: 10.0,
            ..InlineStyle::default()
        };
        let text: Vec<char> = "Hello world".chars().collect();
        let metrics = ApproximateFontMetrics;
        assert!((metrics.width(&text, 0, 5, 0.0, &style) - 30.0).abs() < 1e-4);
        assert!((metrics.width(&text, 6, 100, 0.0, &style) - 30.0).abs() < 1e-4);
        assert!(metrics.width(&text, 20, 3, 0.0, &style).abs() < f32::EPSILON);
    }

    #[test]
    fn test_soft_hyphen_is_invisible() {
        let style = InlineStyle::default();
        let text: Vec<char> = "a\u{00AD}b".chars().collect();
        let metrics = ApproximateFontMetrics;
        let full = metrics.width(&text, 0, 3, 0.0, &style);
        let plain = metrics.width(&text, 0, 1, 0.0, &style) * 2.0;
        assert!((full - plain).abs() < 1e-4);
    }

    #[test]
    fn test_monospace_metrics() {
        let metrics = MonospaceFontMetrics::default();
        let style = InlineStyle::default();
        let text: Vec<char> = "ab\u{00AD}c".chars().collect();
        assert!((metrics.width(&text, 0, 4, 0.0, &style) - 30.0).abs() < f32::EPSILON);
        assert!((metrics.line_height(&style) - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_explicit_line_height_wins() {
        let style = InlineStyle {
            line_height: Some(30.0),
            ..InlineStyle::default()
        };
        assert!((ApproximateFontMetrics.line_height(&style) - 30.0).abs() < f32::EPSILON);
    }
}
