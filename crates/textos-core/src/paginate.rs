//! Paginator: splits a document into fixed-size pages.
//!
//! Pages are built from whole source lines. Each line's height is estimated as
//! `max(1, ceil(width / content_width)) * line_height`, which approximates soft wrapping
//! without doing real layout. A line is never split across pages, so a single line taller
//! than the content box ends up alone on its own page.
//!
//! Joining the returned pages with `'\n'` always gives back the input text.

use crate::formatting::{FontSpec, FormattingSettings};
use crate::geometry::PageGeometry;
use crate::measure::{FallbackMeasurer, TextMeasurer, estimate_width};
use std::fmt;
use std::sync::Arc;

/// Splits text into pages using a width estimator and page geometry.
#[derive(Clone)]
pub struct Paginator {
    geometry: PageGeometry,
    measurer: Arc<dyn TextMeasurer>,
}

impl fmt::Debug for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

impl Paginator {
    /// Create a paginator that only uses the fixed-ratio width fallback.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            measurer: Arc::new(FallbackMeasurer),
        }
    }

    /// Replace the width measurer.
    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// The page geometry in use.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Estimated rendered width of one line.
    pub fn estimate_width(&self, line: &str, font: &FontSpec) -> f64 {
        estimate_width(self.measurer.as_ref(), line, font)
    }

    /// Number of visual lines a source line is expected to wrap into (at least 1).
    pub fn wrapped_line_count(&self, line: &str, font: &FontSpec) -> usize {
        let width = self.estimate_width(line, font);
        let rows = (width / self.geometry.content_width()).ceil();
        if rows.is_finite() && rows > 1.0 {
            rows as usize
        } else {
            1
        }
    }

    /// Split `text` into pages whose estimated height fits `content_height`.
    ///
    /// Never returns an empty list: empty text yields a single empty page.
    pub fn paginate(
        &self,
        text: &str,
        formatting: &FormattingSettings,
        content_height: f64,
    ) -> Vec<String> {
        let font = formatting.font_spec();
        let line_height = formatting.line_height_device();

        let mut pages: Vec<String> = Vec::new();
        let mut draft: Vec<&str> = Vec::new();
        let mut draft_height = 0.0_f64;

        for line in text.split('\n') {
            let height = self.wrapped_line_count(line, &font) as f64 * line_height;

            if draft_height + height > content_height && !draft.is_empty() {
                pages.push(draft.join("\n"));
                draft.clear();
                draft_height = 0.0;
            }

            draft.push(line);
            draft_height += height;
        }

        if !draft.is_empty() {
            pages.push(draft.join("\n"));
        }
        if pages.is_empty() {
            pages.push(String::new());
        }

        tracing::debug!(
            pages = pages.len(),
            chars = text.chars().count(),
            content_height,
            "paginated document"
        );
        pages
    }

    /// Paginate against the geometry's own content box.
    pub fn paginate_to_pages(&self, text: &str, formatting: &FormattingSettings) -> Vec<String> {
        self.paginate(text, formatting, self.geometry.content_height())
    }

    /// Estimated content height of a single page's text.
    ///
    /// Used in place of a measured height when the host has not reported one.
    pub fn estimate_page_height(&self, page_text: &str, formatting: &FormattingSettings) -> f64 {
        let font = formatting.font_spec();
        let line_height = formatting.line_height_device();
        page_text
            .split('\n')
            .map(|line| self.wrapped_line_count(line, &font) as f64 * line_height)
            .sum()
    }
}

/// Paginate with the default A4 geometry and the fixed-ratio width fallback.
pub fn paginate(text: &str, formatting: &FormattingSettings, content_height: f64) -> Vec<String> {
    Paginator::default().paginate(text, formatting, content_height)
}

/// Join pages back into the document text.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(page.as_ref());
    }
    out
}
