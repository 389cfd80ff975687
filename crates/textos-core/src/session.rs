//! Editor session.
//!
//! [`EditorSession`] ties a [`Document`], a [`PagedEditor`], the find bar and the application
//! settings together. It owns the file workflow (new/open/save with unsaved-changes
//! confirmation), view and theme toggles, and builds the status bar snapshot.
//!
//! Every editing call is forwarded to the surface and the document is then synced from the
//! surface's lossless text, so the dirty flag and search matches always follow the pages.

use crate::boundary::{BoundaryKey, LocalSelection};
use crate::config::{AppSettings, ResolvedTheme, ViewMode};
use crate::document::{CharCountRule, Document, DocumentStore};
use crate::error::Result;
use crate::formatting::FormattingSettings;
use crate::geometry::PageGeometry;
use crate::measure::TextMeasurer;
use crate::offsets::PagePosition;
use crate::search::{SearchOptions, SearchState};
use crate::surface::{KeyOutcome, PagedEditor, SurfaceEvent};
use std::path::Path;
use std::sync::Arc;

/// Result of a file workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The step completed.
    Done,
    /// The user cancelled (no file chosen).
    Cancelled,
    /// The document has unsaved changes; repeat with `force` to discard them.
    NeedsConfirmation,
}

/// Everything the status bar shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Character count under the configured rule.
    pub char_count: usize,
    /// Rule used for `char_count`.
    pub char_count_rule: CharCountRule,
    /// 1-based current page.
    pub current_page: usize,
    /// Total pages.
    pub total_pages: usize,
    /// Search match count, `None` without a query.
    pub match_count: Option<usize>,
    /// Unsaved changes.
    pub is_dirty: bool,
    /// File name or `"Untitled"`.
    pub file_name: String,
    /// Active view.
    pub view_mode: ViewMode,
}

/// A document open in the editor.
#[derive(Debug)]
pub struct EditorSession<S: DocumentStore> {
    store: S,
    document: Document,
    surface: PagedEditor,
    settings: AppSettings,
    view_mode: ViewMode,
    search: SearchState,
}

impl<S: DocumentStore> EditorSession<S> {
    /// Start a session with an empty untitled document.
    pub fn new(store: S, settings: AppSettings) -> Self {
        let surface = PagedEditor::new(PageGeometry::default(), settings.formatting.clone());
        Self {
            store,
            document: Document::new(),
            surface,
            view_mode: settings.default_view,
            settings,
            search: SearchState::new(),
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The paginated surface.
    pub fn surface(&self) -> &PagedEditor {
        &self.surface
    }

    /// The document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the document store (e.g. to pick the next path).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Current settings.
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Find bar state.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Active view.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Whether the document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.document.is_dirty()
    }

    /// Replace the surface's width measurer.
    pub fn set_measurer(&mut self, measurer: Arc<dyn TextMeasurer>) {
        self.surface.set_measurer(measurer);
    }

    /// Subscribe to surface events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SurfaceEvent<'_>) + Send + 'static,
    {
        self.surface.subscribe(callback);
    }

    /// Start a new untitled document.
    pub fn new_file(&mut self, force: bool) -> SessionOutcome {
        if self.document.is_dirty() && !force {
            return SessionOutcome::NeedsConfirmation;
        }
        self.load_document(Document::new());
        SessionOutcome::Done
    }

    /// Open a document picked by the store.
    pub fn open(&mut self, force: bool) -> Result<SessionOutcome> {
        if self.document.is_dirty() && !force {
            return Ok(SessionOutcome::NeedsConfirmation);
        }
        let Some(file) = self.store.open()? else {
            return Ok(SessionOutcome::Cancelled);
        };
        self.settings.last_opened_file = Some(file.path.clone());
        tracing::info!(path = %file.path.display(), "document opened");
        self.load_document(Document::from_file(file));
        Ok(SessionOutcome::Done)
    }

    /// Save to the document's path, or ask the store for one.
    pub fn save(&mut self) -> Result<SessionOutcome> {
        let path = self.document.path().map(Path::to_path_buf);
        self.save_to(path.as_deref())
    }

    /// Always ask the store for a path.
    pub fn save_as(&mut self) -> Result<SessionOutcome> {
        self.save_to(None)
    }

    fn save_to(&mut self, path: Option<&Path>) -> Result<SessionOutcome> {
        let content = self.document.text_for_saving();
        let Some(saved) = self.store.save(&content, path)? else {
            return Ok(SessionOutcome::Cancelled);
        };
        tracing::info!(path = %saved.display(), "document saved");
        self.settings.last_opened_file = Some(saved.clone());
        self.document.mark_saved(saved);
        Ok(SessionOutcome::Done)
    }

    fn load_document(&mut self, document: Document) {
        self.surface.set_document_text(document.content());
        self.surface.set_caret(0, 0);
        self.document = document;
        self.refresh_search();
    }

    /// Forward a page edit. See [`PagedEditor::edit_page`].
    ///
    /// Edits are rejected in [`ViewMode::Preview`].
    pub fn edit_page(&mut self, page_index: usize, new_text: &str, caret_local: usize) -> bool {
        if !self.view_mode.is_editable() {
            tracing::trace!(page_index, "page edit ignored in preview");
            return false;
        }
        let applied = self.surface.edit_page(page_index, new_text, caret_local);
        if applied {
            self.sync_from_surface();
        }
        applied
    }

    /// Forward a boundary key. See [`PagedEditor::handle_key`].
    ///
    /// In [`ViewMode::Preview`] deletions are swallowed; navigation still works.
    pub fn handle_key(
        &mut self,
        page_index: usize,
        selection: LocalSelection,
        key: BoundaryKey,
    ) -> KeyOutcome {
        let deletes = matches!(key, BoundaryKey::Backspace | BoundaryKey::Delete);
        if deletes && !self.view_mode.is_editable() {
            return KeyOutcome::Handled;
        }
        let outcome = self.surface.handle_key(page_index, selection, key);
        if outcome == KeyOutcome::Handled {
            self.sync_from_surface();
        }
        outcome
    }

    /// Move the caret.
    pub fn set_caret(&mut self, page_index: usize, local_offset: usize) {
        self.surface.set_caret(page_index, local_offset);
    }

    /// Forward a measured page height.
    pub fn report_measured_page_height(&mut self, page_index: usize, height: f64) {
        self.surface.report_measured_page_height(page_index, height);
    }

    /// Run deferred surface work.
    pub fn on_idle(&mut self) -> usize {
        let ran = self.surface.on_idle();
        if ran > 0 {
            self.sync_from_surface();
        }
        ran
    }

    fn sync_from_surface(&mut self) {
        if self.document.set_content(self.surface.document_text()) {
            self.refresh_search();
        }
    }

    /// Change font family, size and line height.
    pub fn set_formatting(&mut self, font_family: &str, size_pt: u32, line_height: f64) -> bool {
        let changed = self.surface.set_formatting(font_family, size_pt, line_height);
        if changed {
            self.settings.formatting = self.surface.formatting().clone();
        }
        changed
    }

    /// Replace all formatting settings (colors included).
    pub fn set_formatting_settings(&mut self, formatting: FormattingSettings) -> bool {
        let changed = self.surface.set_formatting_settings(formatting);
        if changed {
            self.settings.formatting = self.surface.formatting().clone();
        }
        changed
    }

    /// Restore default formatting.
    pub fn reset_formatting(&mut self) -> bool {
        self.set_formatting_settings(FormattingSettings::default())
    }

    /// Cycle through page view, editor and preview.
    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    /// Flip the theme between light and dark.
    pub fn toggle_theme(&mut self, system_dark: bool) -> ResolvedTheme {
        self.settings.theme = self.settings.theme.toggled(system_dark);
        self.settings.theme.resolve(system_dark)
    }

    /// Change how the status bar counts characters.
    pub fn set_char_count_rule(&mut self, rule: CharCountRule) {
        self.settings.char_count_rule = rule;
    }

    /// Search the document. The first match at or after the caret becomes active and the caret
    /// moves to it. Returns the match count.
    pub fn find(&mut self, query: &str, options: SearchOptions) -> Result<usize> {
        let count = self.search.set_query(
            self.surface.document_text(),
            query,
            options,
            self.surface.caret_offset(),
        )?;
        self.reveal_active_match();
        Ok(count)
    }

    /// Activate the next match and move the caret to it.
    pub fn find_next(&mut self) -> Option<PagePosition> {
        self.search.next()?;
        self.reveal_active_match()
    }

    /// Activate the previous match and move the caret to it.
    pub fn find_prev(&mut self) -> Option<PagePosition> {
        self.search.prev()?;
        self.reveal_active_match()
    }

    /// Close the find bar.
    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    fn reveal_active_match(&mut self) -> Option<PagePosition> {
        let position = self.search.active_page_position(self.surface.pages())?;
        self.surface
            .set_caret(position.page_index, position.local_offset);
        Some(position)
    }

    fn refresh_search(&mut self) {
        if self.search.query().is_empty() {
            return;
        }
        if let Err(err) = self
            .search
            .refresh(self.surface.document_text(), self.surface.caret_offset())
        {
            tracing::warn!(error = %err, "search refresh failed");
            self.search.clear();
        }
    }

    /// Snapshot for the status bar.
    pub fn status(&self) -> StatusSnapshot {
        let rule = self.settings.char_count_rule;
        StatusSnapshot {
            char_count: self.document.char_count(rule),
            char_count_rule: rule,
            current_page: self.surface.current_page(),
            total_pages: self.surface.page_count(),
            match_count: self.search.match_count(),
            is_dirty: self.document.is_dirty(),
            file_name: self.document.display_name(),
            view_mode: self.view_mode,
        }
    }

    /// Persist the settings.
    pub fn save_settings(&self, path: &Path) -> Result<()> {
        self.settings.save(path)?;
        Ok(())
    }
}
