//! Page geometry.
//!
//! All lengths are device units (1/96 inch). The defaults model an A4 sheet at 96 DPI
//! (210mm x 297mm).

/// Page width in device units.
pub const PAGE_WIDTH: f64 = 794.0;
/// Page height in device units.
pub const PAGE_HEIGHT: f64 = 1123.0;
/// Margin applied on every side of the page content box.
pub const PAGE_MARGIN: f64 = 60.0;
/// Vertical gap between two stacked pages.
pub const PAGE_GAP: f64 = 24.0;
/// Slack allowed above the content height before a page counts as overflowing.
pub const OVERFLOW_TOLERANCE: f64 = 10.0;
/// Device units per inch.
pub const DEVICE_UNITS_PER_INCH: f64 = 96.0;
/// Typographic points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Geometry of a single page and of the stacked page column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Full page width.
    pub width: f64,
    /// Full page height.
    pub height: f64,
    /// Margin on each side.
    pub margin: f64,
    /// Gap between pages when stacked vertically.
    pub gap: f64,
    /// Overflow tolerance used by the reconciler.
    pub overflow_tolerance: f64,
}

impl PageGeometry {
    /// A4 at 96 DPI with the default margin, gap and tolerance.
    pub const A4: Self = Self {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        margin: PAGE_MARGIN,
        gap: PAGE_GAP,
        overflow_tolerance: OVERFLOW_TOLERANCE,
    };

    /// Width available to text.
    pub fn content_width(&self) -> f64 {
        (self.width - self.margin * 2.0).max(1.0)
    }

    /// Height available to text.
    pub fn content_height(&self) -> f64 {
        (self.height - self.margin * 2.0).max(0.0)
    }

    /// Vertical distance from the top of one page to the top of the next.
    pub fn stride(&self) -> f64 {
        self.height + self.gap
    }

    /// 1-based page number visible at a vertical scroll offset, clamped to `1..=total_pages`.
    pub fn page_at_scroll_offset(&self, scroll_offset: f64, total_pages: usize) -> usize {
        let total_pages = total_pages.max(1);
        if scroll_offset <= 0.0 || self.stride() <= 0.0 {
            return 1;
        }
        let index = (scroll_offset / self.stride()).floor() as usize;
        (index + 1).min(total_pages)
    }

    /// Scroll offset that brings the top of `page_index` (0-based) into view.
    pub fn scroll_offset_for_page(&self, page_index: usize) -> f64 {
        page_index as f64 * self.stride()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Convert a point size to device units.
pub fn points_to_device(points: f64) -> f64 {
    // Multiply before dividing so whole point sizes stay exact.
    points * DEVICE_UNITS_PER_INCH / POINTS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_content_box() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.content_width(), 674.0);
        assert_eq!(geometry.content_height(), 1003.0);
    }

    #[test]
    fn test_page_at_scroll_offset() {
        let geometry = PageGeometry::A4;
        assert_eq!(geometry.page_at_scroll_offset(0.0, 3), 1);
        assert_eq!(geometry.page_at_scroll_offset(1146.0, 3), 1);
        assert_eq!(geometry.page_at_scroll_offset(1147.0, 3), 2);
        assert_eq!(geometry.page_at_scroll_offset(100_000.0, 3), 3);
        assert_eq!(geometry.page_at_scroll_offset(-5.0, 0), 1);
    }

    #[test]
    fn test_points_to_device() {
        assert_eq!(points_to_device(12.0), 16.0);
        assert!((points_to_device(10.0) - 10.0 * 96.0 / 72.0).abs() < 1e-9);
        assert_eq!(points_to_device(POINTS_PER_INCH), DEVICE_UNITS_PER_INCH);
    }
}
