//! Paged editing surface.
//!
//! [`PagedEditor`] owns everything one page-view instance needs: the document text, the derived
//! pages, the caret, the reconcile state machine, the idle task queue and the subscribers.
//! No state is shared between instances.
//!
//! # Update cycle
//!
//! Updates flow in one direction:
//!
//! 1. the host calls an input method ([`edit_page`](PagedEditor::edit_page),
//!    [`handle_key`](PagedEditor::handle_key),
//!    [`set_document_text`](PagedEditor::set_document_text), ...),
//! 2. the surface rebuilds the document and re-paginates it,
//! 3. subscribers receive [`SurfaceEvent::PagesChanged`] and then [`SurfaceEvent::CaretMoved`],
//! 4. the host re-renders, measures its pages and reports heights with
//!    [`report_measured_page_height`](PagedEditor::report_measured_page_height),
//! 5. once per frame the host calls [`on_idle`](PagedEditor::on_idle), which runs deferred
//!    overflow checks and caret restores.
//!
//! # Example
//!
//! ```rust
//! use textos_core::{PagedEditor, SurfaceEvent};
//!
//! let mut editor = PagedEditor::default();
//! editor.subscribe(|event| {
//!     if let SurfaceEvent::PagesChanged { pages, .. } = event {
//!         println!("{} page(s)", pages.len());
//!     }
//! });
//!
//! editor.set_document_text("Hello\nWorld");
//! assert_eq!(editor.page_count(), 1);
//!
//! // Type on page 0: the page text changes and the caret ends up after the new character.
//! assert!(editor.edit_page(0, "Hello!\nWorld", 6));
//! assert_eq!(editor.document_text(), "Hello!\nWorld");
//! assert_eq!(editor.caret_offset(), 6);
//! ```

use crate::boundary::{
    BoundaryAction, BoundaryKey, LocalSelection, apply_local_edit, handle_boundary_key,
};
use crate::formatting::FormattingSettings;
use crate::geometry::PageGeometry;
use crate::measure::TextMeasurer;
use crate::offsets::{PagePosition, char_len, to_absolute, to_page_local};
use crate::paginate::{Paginator, join_pages};
use crate::reconcile::{OverflowReconciler, OverflowVerdict, ReconcileState};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Events emitted by a [`PagedEditor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent<'a> {
    /// Pages were rebuilt.
    PagesChanged {
        /// The new page list.
        pages: &'a [String],
        /// Layout version (incremented on every rebuild).
        version: u64,
    },
    /// The caret moved to a new page position.
    CaretMoved(PagePosition),
}

/// Subscriber callback type.
pub type SurfaceCallback = Box<dyn FnMut(&SurfaceEvent<'_>) + Send>;

/// Work deferred to the next idle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTask {
    /// Compare a page's height against the content box.
    CheckOverflow {
        /// Page to check.
        page_index: usize,
    },
    /// Put the caret back where the last reconciled edit left it.
    RestoreCaret,
}

/// Whether a key was consumed by page-boundary handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The surface handled the key; the host must not apply it to the page.
    Handled,
    /// The key does not cross a page boundary; apply the page's default behavior.
    PassThrough,
}

/// A paginated editing surface.
pub struct PagedEditor {
    paginator: Paginator,
    formatting: FormattingSettings,
    text: String,
    pages: Vec<String>,
    /// Absolute caret offset (characters).
    caret: usize,
    focused_page: usize,
    /// Set while a programmatic update is in flight; edits reported meanwhile are ignored.
    is_updating: bool,
    reconciler: OverflowReconciler,
    measured_heights: Vec<Option<f64>>,
    idle_queue: VecDeque<IdleTask>,
    callbacks: Vec<SurfaceCallback>,
    version: u64,
}

impl fmt::Debug for PagedEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedEditor")
            .field("pages", &self.pages.len())
            .field("caret", &self.caret)
            .field("state", &self.reconciler.state())
            .field("is_updating", &self.is_updating)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl Default for PagedEditor {
    fn default() -> Self {
        Self::new(PageGeometry::default(), FormattingSettings::default())
    }
}

impl PagedEditor {
    /// Create an empty surface (one empty page).
    pub fn new(geometry: PageGeometry, formatting: FormattingSettings) -> Self {
        Self::with_paginator(Paginator::new(geometry), formatting)
    }

    /// Create an empty surface around an existing paginator.
    pub fn with_paginator(paginator: Paginator, formatting: FormattingSettings) -> Self {
        let pages = paginator.paginate_to_pages("", &formatting);
        let measured_heights = vec![None; pages.len()];
        Self {
            paginator,
            formatting,
            text: String::new(),
            pages,
            caret: 0,
            focused_page: 0,
            is_updating: false,
            reconciler: OverflowReconciler::new(),
            measured_heights,
            idle_queue: VecDeque::new(),
            callbacks: Vec::new(),
            version: 0,
        }
    }

    /// Replace the width measurer and re-paginate.
    pub fn set_measurer(&mut self, measurer: Arc<dyn TextMeasurer>) {
        self.paginator = self.paginator.clone().with_measurer(measurer);
        self.relayout();
    }

    /// Subscribe to surface events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SurfaceEvent<'_>) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// The full document: always the lossless join of all pages.
    pub fn document_text(&self) -> &str {
        &self.text
    }

    /// Current pages.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of pages (at least 1).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Absolute caret offset.
    pub fn caret_offset(&self) -> usize {
        self.caret
    }

    /// Caret as a page position.
    pub fn caret(&self) -> PagePosition {
        to_page_local(&self.pages, self.caret)
    }

    /// 1-based number of the page holding focus.
    pub fn current_page(&self) -> usize {
        self.focused_page.min(self.pages.len().saturating_sub(1)) + 1
    }

    /// Formatting in use.
    pub fn formatting(&self) -> &FormattingSettings {
        &self.formatting
    }

    /// Page geometry in use.
    pub fn geometry(&self) -> &PageGeometry {
        self.paginator.geometry()
    }

    /// Reconcile state.
    pub fn state(&self) -> ReconcileState {
        self.reconciler.state()
    }

    /// Number of overflow reconciliations performed so far.
    pub fn reconcile_count(&self) -> u64 {
        self.reconciler.reconcile_count()
    }

    /// Layout version (incremented on every re-pagination).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a programmatic update is in flight.
    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    /// Number of idle tasks waiting for the next tick.
    pub fn pending_idle_tasks(&self) -> usize {
        self.idle_queue.len()
    }

    /// Scroll offset that brings the caret's page into view.
    pub fn scroll_offset_for_caret(&self) -> f64 {
        self.geometry().scroll_offset_for_page(self.caret().page_index)
    }

    /// Replace the whole document.
    ///
    /// Pending idle work is discarded; the caret is clamped to the new document.
    pub fn set_document_text(&mut self, content: &str) {
        if self.is_updating {
            tracing::trace!("document replacement ignored during update");
            return;
        }
        self.reconciler.reset();
        self.idle_queue.clear();
        self.text = content.to_string();
        self.caret = self.caret.min(char_len(&self.text));
        self.relayout();
        self.emit_caret();
    }

    /// Change font family, size (points) and line height. Returns `true` if anything changed.
    ///
    /// The caret keeps its absolute offset across the re-pagination.
    pub fn set_formatting(&mut self, font_family: &str, size_pt: u32, line_height: f64) -> bool {
        let mut formatting = self.formatting.clone();
        let changed = formatting.set_font_family(font_family)
            | formatting.set_font_size(size_pt)
            | formatting.set_line_height(line_height);
        if changed {
            self.apply_formatting(formatting);
        }
        changed
    }

    /// Replace all formatting settings. Returns `true` if anything changed.
    ///
    /// Color-only changes keep the current pages and version.
    pub fn set_formatting_settings(&mut self, formatting: FormattingSettings) -> bool {
        if formatting == self.formatting {
            return false;
        }
        if self.formatting.affects_layout(&formatting) {
            self.apply_formatting(formatting);
        } else {
            self.formatting = formatting;
        }
        true
    }

    fn apply_formatting(&mut self, formatting: FormattingSettings) {
        self.formatting = formatting;
        self.relayout();
        self.emit_caret();
    }

    /// Mark the start of a host-driven sync (e.g. pushing new page texts into widgets).
    ///
    /// Until [`end_host_sync`](Self::end_host_sync), page edits and idle ticks are ignored so
    /// that change notifications caused by the sync itself cannot loop back.
    pub fn begin_host_sync(&mut self) {
        self.is_updating = true;
    }

    /// End a host-driven sync started with [`begin_host_sync`](Self::begin_host_sync).
    pub fn end_host_sync(&mut self) {
        self.is_updating = false;
    }

    /// A page's text changed locally. `caret_local` is the caret offset in `new_text`.
    ///
    /// Returns `false` if the notification was suppressed (update in flight or unknown page).
    pub fn edit_page(&mut self, page_index: usize, new_text: &str, caret_local: usize) -> bool {
        if self.is_updating {
            tracing::trace!(page_index, "page edit ignored during update");
            return false;
        }
        if page_index >= self.pages.len() {
            return false;
        }
        if self.pages[page_index] == new_text {
            return false;
        }

        let edit = apply_local_edit(&self.pages, page_index, new_text, caret_local);
        self.commit_edit(edit.document, edit.caret);
        true
    }

    /// Handle a key on `page_index` with the given local selection.
    pub fn handle_key(
        &mut self,
        page_index: usize,
        selection: LocalSelection,
        key: BoundaryKey,
    ) -> KeyOutcome {
        if self.is_updating {
            return KeyOutcome::PassThrough;
        }
        match handle_boundary_key(&self.pages, page_index, selection, key) {
            Some(BoundaryAction::Merge { document, caret }) => {
                self.commit_edit(document, caret);
                KeyOutcome::Handled
            }
            Some(BoundaryAction::Navigate { target, caret }) => {
                self.caret = caret;
                self.focused_page = target.page_index;
                self.emit(SurfaceEvent::CaretMoved(target));
                KeyOutcome::Handled
            }
            None => KeyOutcome::PassThrough,
        }
    }

    /// Move the caret to a page position (e.g. the user clicked into a page).
    pub fn set_caret(&mut self, page_index: usize, local_offset: usize) {
        let page_index = page_index.min(self.pages.len().saturating_sub(1));
        self.caret = to_absolute(&self.pages, page_index, local_offset);
        self.focused_page = page_index;
        let local = self.caret - to_absolute(&self.pages, page_index, 0);
        self.emit(SurfaceEvent::CaretMoved(PagePosition::new(page_index, local)));
    }

    /// Record the host's measured content height for a page and schedule an overflow check.
    pub fn report_measured_page_height(&mut self, page_index: usize, height: f64) {
        let Some(slot) = self.measured_heights.get_mut(page_index) else {
            return;
        };
        *slot = Some(height);
        self.schedule(IdleTask::CheckOverflow { page_index });
    }

    /// Run the tasks queued before this tick. Returns how many ran.
    ///
    /// Tasks queued while running (and deferred checks) wait for the next tick.
    pub fn on_idle(&mut self) -> usize {
        if self.is_updating {
            return 0;
        }
        let tasks: Vec<IdleTask> = self.idle_queue.drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            match task {
                IdleTask::CheckOverflow { page_index } => self.check_page(page_index),
                IdleTask::RestoreCaret => self.restore_caret(),
            }
        }
        count
    }

    fn commit_edit(&mut self, document: String, caret: usize) {
        self.reconciler.mark_edited();
        self.text = document;
        self.caret = caret.min(char_len(&self.text));
        self.relayout();
        self.emit_caret();
        let page_index = self.caret().page_index;
        self.schedule(IdleTask::CheckOverflow { page_index });
    }

    fn check_page(&mut self, page_index: usize) {
        if page_index >= self.pages.len() {
            return;
        }
        // Only host-reported heights can overflow; unmeasured pages count as fitting.
        let measured = self.measured_heights[page_index].unwrap_or(0.0);
        let geometry = *self.paginator.geometry();

        match self.reconciler.evaluate(
            measured,
            geometry.content_height(),
            geometry.overflow_tolerance,
            self.caret,
        ) {
            OverflowVerdict::Fits => {}
            OverflowVerdict::Deferred => self.schedule(IdleTask::CheckOverflow { page_index }),
            OverflowVerdict::Overflow => {
                tracing::debug!(page_index, measured, "reconciling overflowing page");
                self.text = join_pages(&self.pages);
                self.relayout();
                self.schedule(IdleTask::RestoreCaret);
            }
        }
    }

    fn restore_caret(&mut self) {
        if let Some(caret) = self.reconciler.finish() {
            self.caret = caret.min(char_len(&self.text));
            self.emit_caret();
        }
    }

    fn schedule(&mut self, task: IdleTask) {
        if !self.idle_queue.contains(&task) {
            self.idle_queue.push_back(task);
        }
    }

    /// Re-paginate the current text and notify subscribers.
    fn relayout(&mut self) {
        self.is_updating = true;
        self.pages = self.paginator.paginate_to_pages(&self.text, &self.formatting);
        self.measured_heights = vec![None; self.pages.len()];
        self.focused_page = self.focused_page.min(self.pages.len() - 1);
        self.version += 1;

        let event = SurfaceEvent::PagesChanged {
            pages: &self.pages,
            version: self.version,
        };
        for callback in &mut self.callbacks {
            callback(&event);
        }
        self.is_updating = false;
    }

    fn emit_caret(&mut self) {
        let position = self.caret();
        self.focused_page = position.page_index;
        self.emit(SurfaceEvent::CaretMoved(position));
    }

    fn emit(&mut self, event: SurfaceEvent<'_>) {
        for callback in &mut self.callbacks {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_has_one_empty_page() {
        let editor = PagedEditor::default();
        assert_eq!(editor.pages(), [String::new()]);
        assert_eq!(editor.current_page(), 1);
        assert_eq!(editor.state(), ReconcileState::Clean);
    }

    #[test]
    fn test_host_sync_suppresses_edits() {
        let mut editor = PagedEditor::default();
        editor.set_document_text("abc");

        editor.begin_host_sync();
        assert!(!editor.edit_page(0, "abcd", 4));
        assert_eq!(editor.on_idle(), 0);
        editor.end_host_sync();

        assert_eq!(editor.document_text(), "abc");
        assert!(editor.edit_page(0, "abcd", 4));
        assert_eq!(editor.document_text(), "abcd");
    }

    #[test]
    fn test_unchanged_edit_is_ignored() {
        let mut editor = PagedEditor::default();
        editor.set_document_text("abc");
        let version = editor.version();
        assert!(!editor.edit_page(0, "abc", 1));
        assert_eq!(editor.version(), version);
    }

    #[test]
    fn test_set_caret_clamps() {
        let mut editor = PagedEditor::default();
        editor.set_document_text("abc");
        editor.set_caret(7, 99);
        assert_eq!(editor.caret(), PagePosition::new(0, 3));
        assert_eq!(editor.caret_offset(), 3);
    }
}
