//! Text width estimation.
//!
//! Pagination never runs a real text shaper. A [`TextMeasurer`] may provide glyph-accurate
//! widths; when it cannot, [`estimate_width`] falls back to half an em per character.

use crate::formatting::FontSpec;
use unicode_width::UnicodeWidthChar;

/// Average glyph advance as a fraction of the font size.
pub const FALLBACK_CHAR_WIDTH_EM: f64 = 0.5;

/// Optional measurement hook for rendered line widths.
pub trait TextMeasurer: Send + Sync {
    /// Rendered width of `line` in device units, or `None` if metrics are unavailable.
    fn measure(&self, line: &str, font: &FontSpec) -> Option<f64>;
}

/// A measurer with no metrics at all; every line uses the fixed-ratio fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMeasurer;

impl TextMeasurer for FallbackMeasurer {
    fn measure(&self, _line: &str, _font: &FontSpec) -> Option<f64> {
        None
    }
}

/// Measures by terminal-style cell widths (UAX #11): wide CJK glyphs count as two half-em
/// cells, combining marks count as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellWidthMeasurer;

impl TextMeasurer for CellWidthMeasurer {
    fn measure(&self, line: &str, font: &FontSpec) -> Option<f64> {
        let cells: usize = line.chars().map(char_cells).sum();
        Some(cells as f64 * font.size * FALLBACK_CHAR_WIDTH_EM)
    }
}

fn char_cells(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Fixed-ratio width of `line`: `chars * font.size * 0.5`.
pub fn fallback_width(line: &str, font: &FontSpec) -> f64 {
    line.chars().count() as f64 * font.size * FALLBACK_CHAR_WIDTH_EM
}

/// Estimated rendered width of `line`, in device units.
///
/// Empty lines are always `0`. Measurement failures (or non-finite results) degrade to
/// [`fallback_width`].
pub fn estimate_width(measurer: &dyn TextMeasurer, line: &str, font: &FontSpec) -> f64 {
    if line.is_empty() {
        return 0.0;
    }
    match measurer.measure(line, font) {
        Some(width) if width.is_finite() && width >= 0.0 => width,
        _ => {
            tracing::trace!(
                chars = line.chars().count(),
                "width measurement unavailable, using fallback"
            );
            fallback_width(line, font)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenMeasurer;

    impl TextMeasurer for BrokenMeasurer {
        fn measure(&self, _line: &str, _font: &FontSpec) -> Option<f64> {
            Some(f64::NAN)
        }
    }

    fn font() -> FontSpec {
        FontSpec::new("Segoe UI", 16.0)
    }

    #[test]
    fn test_empty_line_is_zero() {
        assert_eq!(estimate_width(&FallbackMeasurer, "", &font()), 0.0);
        assert_eq!(estimate_width(&CellWidthMeasurer, "", &font()), 0.0);
    }

    #[test]
    fn test_fallback_ratio() {
        assert_eq!(estimate_width(&FallbackMeasurer, "abcd", &font()), 32.0);
        assert_eq!(estimate_width(&BrokenMeasurer, "abcd", &font()), 32.0);
    }

    #[test]
    fn test_cell_width_counts_wide_chars_twice() {
        assert_eq!(estimate_width(&CellWidthMeasurer, "ab", &font()), 16.0);
        assert_eq!(estimate_width(&CellWidthMeasurer, "你好", &font()), 32.0);
    }

    #[test]
    fn test_monotonic_in_length() {
        let mut previous = 0.0;
        let mut line = String::new();
        for ch in "a你b\u{301}c".chars().cycle().take(40) {
            line.push(ch);
            let width = estimate_width(&CellWidthMeasurer, &line, &font());
            assert!(width >= previous);
            previous = width;
        }
    }
}
