//! Textos TUI
//!
//! A terminal page-view editor built with crossterm and ratatui on top of `textos-core`.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p textos-tui -- <file_path>
//! ```
//!
//! The file is created on first save if it does not exist. Settings are read from
//! `$TEXTOS_CONFIG` (default `textos-settings.json`) and written back on exit.
//!
//! # Logging
//!
//! Set `TEXTOS_LOG=<file>` to write logs to a file (`RUST_LOG` filters them, default `debug`).
//! Nothing is logged to the terminal.
//!
//! # Shortcuts
//!
//! - Arrows: move the caret (crossing page boundaries)
//! - Home/End: line start/end
//! - PageUp/PageDown: previous/next page
//! - Backspace/Delete: delete (merging pages at a boundary)
//! - Enter: insert newline
//! - Ctrl+S: save
//! - Ctrl+Shift+S: save as (prompts for a path; needs a terminal that reports Shift with Ctrl)
//! - Ctrl+O: open (prompts for a path)
//! - Ctrl+N: new document
//! - Ctrl+X: quit
//! - Ctrl+F: find (Enter to search, Alt+C/W/R toggles case/word/regex)
//! - F3 / Shift+F3: next / previous match
//! - Ctrl+E: cycle page view / editor / preview
//! - Ctrl+T: toggle theme
//! - F5 / F6: font size down / up
//! - F7: cycle line height
//! - F8: reset formatting
//! - F9: toggle character count rule

use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    fs::File,
    io::{self, stdout},
    path::PathBuf,
    process,
    sync::{Arc, Mutex},
    time::Duration,
};
use textos_core::{
    AppSettings, BoundaryKey, CellWidthMeasurer, CharCountRule, EditorSession, FsDocumentStore,
    KeyOutcome, LocalSelection, PagePosition, ResolvedTheme, SearchOptions, SessionOutcome,
    TextosError, ViewMode,
    offsets::{
        char_len, char_to_byte, line_column, line_count, next_boundary, offset_for_line_column,
        prev_boundary,
    },
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

const LOG_PATH_ENV: &str = "TEXTOS_LOG";
const LINE_HEIGHTS: [f64; 4] = [1.0, 1.15, 1.5, 2.0];
const SHORTCUTS: &str = concat!(
    "Ctrl-S:Save  Ctrl-Shift-S:SaveAs  Ctrl-O:Open  Ctrl-N:New  Ctrl-X:Quit  Ctrl-F:Find  ",
    "F3/Shift-F3:Next/Prev  Ctrl-E:View  Ctrl-T:Theme  F5/F6:Size  F7:Spacing  F8:Reset  ",
    "F9:Count",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Find,
    OpenPath,
    SaveAsPath,
}

/// Action waiting for a y/n answer because the document is dirty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingConfirm {
    Quit,
    NewFile,
    Open,
}

struct App {
    session: EditorSession<FsDocumentStore>,
    settings_path: PathBuf,
    should_quit: bool,
    confirm: Option<PendingConfirm>,
    status_message: String,
    search_options: SearchOptions,
    input_mode: InputMode,
    input_buffer: String,
    /// Terminals do not report a dark-mode preference.
    system_dark: bool,
}

impl App {
    fn new(file_path: PathBuf, settings_path: PathBuf) -> io::Result<Self> {
        let settings = AppSettings::load_or_default(&settings_path);

        let mut store = FsDocumentStore::new().with_save_as_path(&file_path);
        if file_path.exists() {
            store.set_open_path(Some(file_path.clone()));
        }

        let mut session = EditorSession::new(store, settings);
        session.set_measurer(Arc::new(CellWidthMeasurer));
        if file_path.exists() {
            session.open(true).map_err(io::Error::other)?;
        }
        tracing::info!(
            path = %file_path.display(),
            pages = session.surface().page_count(),
            "editor started"
        );

        Ok(Self {
            session,
            settings_path,
            should_quit: false,
            confirm: None,
            status_message: String::new(),
            search_options: SearchOptions::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            system_dark: false,
        })
    }

    fn caret(&self) -> PagePosition {
        self.session.surface().caret()
    }

    fn current_page_text(&self) -> String {
        let caret = self.caret();
        self.session.surface().pages()[caret.page_index].clone()
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let Some(pending) = self.confirm {
            self.handle_confirm_key(pending, key);
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            return;
        }

        self.status_message.clear();
        match (key.modifiers, key.code) {
            (mods, KeyCode::Char('s' | 'S'))
                if mods.contains(KeyModifiers::CONTROL | KeyModifiers::SHIFT) =>
            {
                self.start_prompt(InputMode::SaveAsPath);
            }
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => self.save_file(),
            (KeyModifiers::CONTROL, KeyCode::Char('o')) => self.start_prompt(InputMode::OpenPath),
            (KeyModifiers::CONTROL, KeyCode::Char('x')) => {
                if self.session.has_unsaved_changes() {
                    self.confirm = Some(PendingConfirm::Quit);
                    self.status_message = "Document modified. Save before quitting? (y/n)".into();
                } else {
                    self.should_quit = true;
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('n')) => {
                if self.session.new_file(false) == SessionOutcome::NeedsConfirmation {
                    self.confirm = Some(PendingConfirm::NewFile);
                    self.status_message = "Discard unsaved changes? (y/n)".into();
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('f')) => self.start_prompt(InputMode::Find),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                let mode = self.session.toggle_view_mode();
                self.status_message = format!("View: {}", view_label(mode));
            }
            (KeyModifiers::CONTROL, KeyCode::Char('t')) => {
                let theme = self.session.toggle_theme(self.system_dark);
                self.status_message = format!("Theme: {theme:?}");
            }
            (KeyModifiers::SHIFT, KeyCode::F(3)) => self.find_prev(),
            (_, KeyCode::F(3)) => self.find_next(),
            (_, KeyCode::F(5)) => self.change_font_size(-1),
            (_, KeyCode::F(6)) => self.change_font_size(1),
            (_, KeyCode::F(7)) => self.cycle_line_height(),
            (_, KeyCode::F(8)) => {
                if self.session.reset_formatting() {
                    self.status_message = "Formatting reset".into();
                }
            }
            (_, KeyCode::F(9)) => {
                let rule = match self.session.settings().char_count_rule {
                    CharCountRule::WithSpaces => CharCountRule::WithoutSpaces,
                    CharCountRule::WithoutSpaces => CharCountRule::WithSpaces,
                };
                self.session.set_char_count_rule(rule);
            }

            (_, KeyCode::Left) => self.move_left(),
            (_, KeyCode::Right) => self.move_right(),
            (_, KeyCode::Up) => self.move_vertical(BoundaryKey::ArrowUp),
            (_, KeyCode::Down) => self.move_vertical(BoundaryKey::ArrowDown),
            (_, KeyCode::Home) => self.move_line_edge(false),
            (_, KeyCode::End) => self.move_line_edge(true),
            (_, KeyCode::PageUp) => {
                let page = self.caret().page_index.saturating_sub(1);
                self.session.set_caret(page, 0);
            }
            (_, KeyCode::PageDown) => {
                let page = self.caret().page_index + 1;
                self.session.set_caret(page, 0);
            }
            (_, KeyCode::Backspace) => self.backspace(),
            (_, KeyCode::Delete) => self.delete(),
            (_, KeyCode::Enter) => self.insert_text("\n"),
            (_, KeyCode::Tab) => self.insert_text("\t"),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                let mut buf = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buf));
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, pending: PendingConfirm, key: KeyEvent) {
        match (pending, key.code) {
            (PendingConfirm::Quit, KeyCode::Char('y' | 'Y')) => {
                self.confirm = None;
                self.save_file();
                if !self.session.has_unsaved_changes() {
                    self.should_quit = true;
                }
            }
            (PendingConfirm::Quit, KeyCode::Char('n' | 'N')) => self.should_quit = true,
            (PendingConfirm::NewFile, KeyCode::Char('y' | 'Y')) => {
                self.confirm = None;
                self.session.new_file(true);
                self.status_message = "New document".into();
            }
            (PendingConfirm::Open, KeyCode::Char('y' | 'Y')) => {
                self.confirm = None;
                self.open_file(true);
            }
            (_, KeyCode::Char('n' | 'N') | KeyCode::Esc) => {
                self.confirm = None;
                self.status_message.clear();
            }
            _ => {}
        }
    }

    fn start_prompt(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input_buffer = match mode {
            InputMode::Find => self.session.search().query().to_string(),
            InputMode::SaveAsPath => self
                .session
                .document()
                .path()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            InputMode::Normal | InputMode::OpenPath => String::new(),
        };
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let in_find = self.input_mode == InputMode::Find;
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                if in_find {
                    self.session.clear_search();
                }
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            (_, KeyCode::Enter) => self.submit_prompt(),
            (_, KeyCode::Backspace) => {
                self.input_buffer.pop();
            }
            (mods, KeyCode::Char('c' | 'C')) if in_find && mods.contains(KeyModifiers::ALT) => {
                self.search_options.case_sensitive = !self.search_options.case_sensitive;
            }
            (mods, KeyCode::Char('w' | 'W')) if in_find && mods.contains(KeyModifiers::ALT) => {
                self.search_options.whole_word = !self.search_options.whole_word;
            }
            (mods, KeyCode::Char('r' | 'R')) if in_find && mods.contains(KeyModifiers::ALT) => {
                self.search_options.regex = !self.search_options.regex;
            }
            (_, KeyCode::Char(c)) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn submit_prompt(&mut self) {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        let input = std::mem::take(&mut self.input_buffer);
        match mode {
            InputMode::Find => match self.session.find(&input, self.search_options) {
                Ok(0) => self.status_message = format!("Not found: {input}"),
                Ok(count) => self.status_message = format!("{count} match(es)"),
                Err(err) => self.status_message = format!("Search failed: {err}"),
            },
            InputMode::OpenPath if !input.trim().is_empty() => {
                let path = PathBuf::from(input.trim());
                self.session.store_mut().set_open_path(Some(path));
                self.open_file(false);
            }
            InputMode::SaveAsPath if !input.trim().is_empty() => {
                let path = PathBuf::from(input.trim());
                self.session.store_mut().set_save_as_path(Some(path));
                let result = self.session.save_as();
                self.report_save(result);
            }
            _ => {}
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if self.input_mode == InputMode::Normal {
            self.insert_text(&text.replace("\r\n", "\n"));
        } else {
            self.input_buffer.extend(text.chars().filter(|c| !c.is_control()));
        }
    }

    fn search_options_label(&self) -> String {
        let mut flags = Vec::new();
        if self.search_options.case_sensitive {
            flags.push("Case");
        }
        if self.search_options.whole_word {
            flags.push("Word");
        }
        if self.search_options.regex {
            flags.push("Regex");
        }
        if flags.is_empty() {
            "-".to_string()
        } else {
            flags.join(",")
        }
    }

    fn find_next(&mut self) {
        if self.session.find_next().is_none() {
            self.status_message = "No matches".into();
        }
    }

    fn find_prev(&mut self) {
        if self.session.find_prev().is_none() {
            self.status_message = "No matches".into();
        }
    }

    fn open_file(&mut self, force: bool) {
        match self.session.open(force) {
            Ok(SessionOutcome::Done) => {
                self.status_message =
                    format!("Opened: {}", self.session.document().display_name());
            }
            Ok(SessionOutcome::NeedsConfirmation) => {
                self.confirm = Some(PendingConfirm::Open);
                self.status_message = "Discard unsaved changes? (y/n)".into();
            }
            Ok(SessionOutcome::Cancelled) => self.status_message = "Open cancelled".into(),
            Err(err) => {
                tracing::error!(error = %err, "open failed");
                self.status_message = format!("Open failed: {err}");
            }
        }
    }

    fn save_file(&mut self) {
        let result = self.session.save();
        self.report_save(result);
    }

    fn report_save(&mut self, result: Result<SessionOutcome, TextosError>) {
        match result {
            Ok(SessionOutcome::Done) => {
                self.status_message = format!("Saved: {}", self.session.document().display_name());
            }
            Ok(_) => self.status_message = "Save cancelled".into(),
            Err(err) => {
                tracing::error!(error = %err, "save failed");
                self.status_message = format!("Save failed: {err}");
            }
        }
    }

    fn change_font_size(&mut self, delta: i32) {
        let formatting = self.session.surface().formatting().clone();
        let size = formatting.font_size().saturating_add_signed(delta).max(1);
        self.session
            .set_formatting(formatting.font_family(), size, formatting.line_height());
        self.status_message = format!("Font size: {size}pt");
    }

    fn cycle_line_height(&mut self) {
        let formatting = self.session.surface().formatting().clone();
        let next = LINE_HEIGHTS
            .iter()
            .copied()
            .find(|h| *h > formatting.line_height() + f64::EPSILON)
            .unwrap_or(LINE_HEIGHTS[0]);
        self.session
            .set_formatting(formatting.font_family(), formatting.font_size(), next);
        self.status_message = format!("Line height: {next}");
    }

    fn insert_text(&mut self, text: &str) {
        let caret = self.caret();
        let mut page = self.current_page_text();
        page.insert_str(char_to_byte(&page, caret.local_offset), text);
        self.session
            .edit_page(caret.page_index, &page, caret.local_offset + char_len(text));
    }

    fn remove_range(&mut self, page_index: usize, page: &str, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut new_text = page.to_string();
        new_text.replace_range(char_to_byte(page, start)..char_to_byte(page, end), "");
        self.session.edit_page(page_index, &new_text, start);
    }

    fn backspace(&mut self) {
        let caret = self.caret();
        if self.boundary_key(caret, BoundaryKey::Backspace) {
            return;
        }
        let page = self.current_page_text();
        let start = prev_boundary(&page, caret.local_offset);
        self.remove_range(caret.page_index, &page, start, caret.local_offset);
    }

    fn delete(&mut self) {
        let caret = self.caret();
        if self.boundary_key(caret, BoundaryKey::Delete) {
            return;
        }
        let page = self.current_page_text();
        let end = next_boundary(&page, caret.local_offset);
        self.remove_range(caret.page_index, &page, caret.local_offset, end);
    }

    fn boundary_key(&mut self, caret: PagePosition, key: BoundaryKey) -> bool {
        self.session
            .handle_key(caret.page_index, LocalSelection::caret(caret.local_offset), key)
            == KeyOutcome::Handled
    }

    fn move_left(&mut self) {
        let caret = self.caret();
        if self.boundary_key(caret, BoundaryKey::ArrowLeft) {
            return;
        }
        let page = self.current_page_text();
        self.session
            .set_caret(caret.page_index, prev_boundary(&page, caret.local_offset));
    }

    fn move_right(&mut self) {
        let caret = self.caret();
        if self.boundary_key(caret, BoundaryKey::ArrowRight) {
            return;
        }
        let page = self.current_page_text();
        self.session
            .set_caret(caret.page_index, next_boundary(&page, caret.local_offset));
    }

    fn move_vertical(&mut self, key: BoundaryKey) {
        let caret = self.caret();
        if self.boundary_key(caret, key) {
            return;
        }
        let page = self.current_page_text();
        let (line, column) = line_column(&page, caret.local_offset);
        let target = match key {
            BoundaryKey::ArrowUp if line > 0 => line - 1,
            BoundaryKey::ArrowDown if line + 1 < line_count(&page) => line + 1,
            _ => return,
        };
        self.session.set_caret(
            caret.page_index,
            offset_for_line_column(&page, target, column),
        );
    }

    fn move_line_edge(&mut self, end: bool) {
        let caret = self.caret();
        let page = self.current_page_text();
        let (line, _) = line_column(&page, caret.local_offset);
        let column = if end { usize::MAX } else { 0 };
        self.session
            .set_caret(caret.page_index, offset_for_line_column(&page, line, column));
    }

    fn on_idle(&mut self) {
        self.session.on_idle();
    }

    fn shutdown(&self) {
        if let Err(err) = self.session.save_settings(&self.settings_path) {
            tracing::warn!(error = %err, "failed to save settings");
        }
    }

    fn page_style(&self) -> Style {
        match self.session.settings().theme.resolve(self.system_dark) {
            ResolvedTheme::Light => {
                let formatting = self.session.surface().formatting();
                let fg = formatting.text_color();
                let bg = formatting.background_color();
                Style::default()
                    .fg(Color::Rgb(fg.r, fg.g, fg.b))
                    .bg(Color::Rgb(bg.r, bg.g, bg.b))
            }
            ResolvedTheme::Dark => Style::default().fg(Color::Gray).bg(Color::Black),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        match self.session.view_mode() {
            ViewMode::PageView => self.render_page(frame, chunks[0]),
            ViewMode::Editor => self.render_continuous(frame, chunks[0]),
            ViewMode::Preview => self.render_preview(frame, chunks[0]),
        }
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_page(&self, frame: &mut Frame, area: Rect) {
        let surface = self.session.surface();
        let caret = self.caret();
        let title = format!(
            " Page {} of {} ",
            caret.page_index + 1,
            surface.page_count()
        );
        let page = &surface.pages()[caret.page_index];
        self.render_text(frame, area, title, page, caret.local_offset);
    }

    fn render_continuous(&self, frame: &mut Frame, area: Rect) {
        let surface = self.session.surface();
        let title = format!(" {} ", self.session.document().display_name());
        self.render_text(frame, area, title, surface.document_text(), surface.caret_offset());
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let surface = self.session.surface();
        let title = format!(" Preview: {} ", self.session.document().display_name());
        self.render_text(frame, area, title, surface.document_text(), surface.caret_offset());
    }

    fn render_text(&self, frame: &mut Frame, area: Rect, title: String, text: &str, caret: usize) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(self.page_style());
        let inner = block.inner(area);

        let (line, column) = line_column(text, caret);
        let line_start = offset_for_line_column(text, line, 0);
        let prefix = &text[char_to_byte(text, line_start)..char_to_byte(text, line_start + column)];
        let caret_x = prefix.width();

        let height = inner.height.max(1) as usize;
        let width = inner.width.max(1) as usize;
        let scroll_y = line.saturating_sub(height - 1);
        let scroll_x = caret_x.saturating_sub(width - 1);

        let paragraph = Paragraph::new(text)
            .block(block)
            .scroll((clamp_u16(scroll_y), clamp_u16(scroll_x)));
        frame.render_widget(paragraph, area);

        let editable = self.session.view_mode().is_editable();
        if editable && self.input_mode == InputMode::Normal && self.confirm.is_none() {
            let x = inner.x + clamp_u16(caret_x - scroll_x);
            let y = inner.y + clamp_u16(line - scroll_y);
            frame.set_cursor_position((x, y));
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if self.input_mode == InputMode::Find {
            format!(
                "Find [{}] > {}  (Enter=Search, Esc=Cancel, Alt+C/W/R=Options)",
                self.search_options_label(),
                self.input_buffer
            )
        } else if self.input_mode == InputMode::OpenPath {
            format!("Open > {}  (Enter=Open, Esc=Cancel)", self.input_buffer)
        } else if self.input_mode == InputMode::SaveAsPath {
            format!("Save as > {}  (Enter=Save, Esc=Cancel)", self.input_buffer)
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let status = self.session.status();
            let formatting = self.session.surface().formatting();
            let rule = match status.char_count_rule {
                CharCountRule::WithSpaces => "with spaces",
                CharCountRule::WithoutSpaces => "without spaces",
            };
            let matches = status
                .match_count
                .map(|count| format!(" | Matches: {count}"))
                .unwrap_or_default();
            format!(
                "{}{} | Page {} / {} | Chars: {} ({}){} | {} {}pt x{} | {}",
                status.file_name,
                if status.is_dirty { " *" } else { "" },
                status.current_page,
                status.total_pages,
                status.char_count,
                rule,
                matches,
                formatting.font_family(),
                formatting.font_size(),
                formatting.line_height(),
                view_label(status.view_mode),
            )
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm.is_some() {
            "Y:Yes  N:No  Esc:Cancel"
        } else {
            SHORTCUTS
        };
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

fn view_label(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::PageView => "Page view",
        ViewMode::Editor => "Editor",
        ViewMode::Preview => "Preview",
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Log to the file named by `TEXTOS_LOG`, if any. The terminal is never written to.
fn init_logging() -> io::Result<()> {
    let Some(path) = env::var_os(LOG_PATH_ENV) else {
        return Ok(());
    };
    let file = File::create(path)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file_path>", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} notes.md", args[0]);
        process::exit(1);
    }

    init_logging()?;
    let file_path = PathBuf::from(&args[1]);
    let mut app = App::new(file_path, AppSettings::default_path())?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    // Without disambiguation most terminals report Ctrl+Shift+S as Ctrl+S.
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    app.shutdown();

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        app.on_idle();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        let file = dir.path().join("draft.txt");
        App::new(file, dir.path().join("settings.json")).unwrap()
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key_event(KeyEvent::new(code, modifiers));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_ctrl_o_opens_typed_path() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("other.txt");
        fs::write(&other, "opened\r\ntext").unwrap();
        let mut app = app_in(&dir);

        press(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(app.input_mode, InputMode::OpenPath);
        type_text(&mut app, &other.display().to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.document().content(), "opened\ntext");
        assert!(app.status_message.starts_with("Opened"));
    }

    #[test]
    fn test_open_over_unsaved_changes_asks_first() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("other.txt");
        fs::write(&other, "replacement").unwrap();
        let mut app = app_in(&dir);
        type_text(&mut app, "draft");
        assert!(app.session.has_unsaved_changes());

        press(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        type_text(&mut app, &other.display().to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.confirm, Some(PendingConfirm::Open));
        assert_eq!(app.session.document().content(), "draft");

        press(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
        assert_eq!(app.confirm, None);
        assert_eq!(app.session.document().content(), "replacement");
    }

    #[test]
    fn test_ctrl_shift_s_saves_to_typed_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("copy.txt");
        let mut app = app_in(&dir);
        type_text(&mut app, "hello");

        press(
            &mut app,
            KeyCode::Char('S'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert_eq!(app.input_mode, InputMode::SaveAsPath);
        type_text(&mut app, &target.display().to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
        assert!(!app.session.has_unsaved_changes());
        assert_eq!(app.session.document().path(), Some(target.as_path()));
    }

    #[test]
    fn test_paste_goes_to_page_or_prompt() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);

        app.handle_paste("one\r\ntwo");
        assert_eq!(app.session.document().content(), "one\ntwo");

        press(&mut app, KeyCode::Char('f'), KeyModifiers::CONTROL);
        app.handle_paste("two");
        assert_eq!(app.input_buffer, "two");
        assert_eq!(app.session.document().content(), "one\ntwo");
    }

    #[test]
    fn test_preview_is_read_only() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        type_text(&mut app, "ab");

        press(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(app.session.view_mode(), ViewMode::Preview);

        type_text(&mut app, "cd");
        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.session.document().content(), "ab");
    }
}
