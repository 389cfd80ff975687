//! Document model and storage.
//!
//! A [`Document`] is the current text plus the text as last saved; the dirty flag is derived by
//! comparing the two. Loading and saving go through a [`DocumentStore`], the seam where a
//! desktop shell plugs in its file dialogs. [`FsDocumentStore`] is a plain filesystem store.

use crate::line_ending::{LineEnding, normalize_to_lf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How the status bar counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharCountRule {
    /// Every character counts.
    #[default]
    WithSpaces,
    /// Whitespace (including newlines) is not counted.
    WithoutSpaces,
}

/// Count the characters of `text` under `rule`.
pub fn char_count(text: &str, rule: CharCountRule) -> usize {
    match rule {
        CharCountRule::WithSpaces => text.chars().count(),
        CharCountRule::WithoutSpaces => text.chars().filter(|ch| !ch.is_whitespace()).count(),
    }
}

/// A loaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    /// File content as read (not yet normalized).
    pub content: String,
    /// Where it was read from.
    pub path: PathBuf,
}

/// Errors produced by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8.
    #[error("{0} is not valid UTF-8 text")]
    InvalidUtf8(PathBuf),
}

/// Loading and saving documents.
///
/// `Ok(None)` means the user cancelled (no file chosen).
pub trait DocumentStore {
    /// Pick and read a file.
    fn open(&mut self) -> Result<Option<FileData>, StoreError>;

    /// Write `content` to `path`, or to a newly picked path when `path` is `None`.
    /// Returns the path written.
    fn save(&mut self, content: &str, path: Option<&Path>) -> Result<Option<PathBuf>, StoreError>;
}

/// A [`DocumentStore`] over the local filesystem with pre-chosen paths instead of dialogs.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentStore {
    open_path: Option<PathBuf>,
    save_as_path: Option<PathBuf>,
}

impl FsDocumentStore {
    /// A store with no paths chosen: `open` and save-as both cancel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the file `open` reads.
    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_path = Some(path.into());
        self
    }

    /// Choose the file a save without a path writes to.
    pub fn with_save_as_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_as_path = Some(path.into());
        self
    }

    /// Replace the file `open` reads.
    pub fn set_open_path(&mut self, path: Option<PathBuf>) {
        self.open_path = path;
    }

    /// Replace the save-as target.
    pub fn set_save_as_path(&mut self, path: Option<PathBuf>) {
        self.save_as_path = path;
    }
}

impl DocumentStore for FsDocumentStore {
    fn open(&mut self) -> Result<Option<FileData>, StoreError> {
        let Some(path) = self.open_path.clone() else {
            return Ok(None);
        };
        let bytes = fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(path.clone()))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "opened document");
        Ok(Some(FileData { content, path }))
    }

    fn save(&mut self, content: &str, path: Option<&Path>) -> Result<Option<PathBuf>, StoreError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(|| self.save_as_path.clone()) else {
            return Ok(None);
        };
        fs::write(&path, content).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "saved document");
        Ok(Some(path))
    }
}

/// The document being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    content: String,
    saved_content: String,
    path: Option<PathBuf>,
    line_ending: LineEnding,
}

impl Document {
    /// A new, empty, untitled document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document loaded from a file. CRLF is normalized to LF and remembered for saving.
    pub fn from_file(file: FileData) -> Self {
        let line_ending = LineEnding::detect_in_text(&file.content);
        let content = normalize_to_lf(&file.content);
        Self {
            saved_content: content.clone(),
            content,
            path: Some(file.path),
            line_ending,
        }
    }

    /// Current (LF-normalized) content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content. Returns `true` if it changed.
    pub fn set_content(&mut self, content: &str) -> bool {
        if self.content == content {
            return false;
        }
        self.content = content.to_string();
        true
    }

    /// Whether the content differs from what was last saved (or loaded).
    pub fn is_dirty(&self) -> bool {
        self.content != self.saved_content
    }

    /// File path, if the document has been saved or loaded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name for titles, `"Untitled"` when there is no path.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "Untitled".to_string(), |name| name.to_string_lossy().into_owned())
    }

    /// Line ending used when saving.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Override the line ending used when saving.
    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    /// Content converted to the preferred line ending.
    pub fn text_for_saving(&self) -> String {
        self.line_ending.apply_to_text(&self.content)
    }

    /// Record a successful save to `path`.
    pub fn mark_saved(&mut self, path: PathBuf) {
        self.saved_content = self.content.clone();
        self.path = Some(path);
    }

    /// Character count under `rule`.
    pub fn char_count(&self, rule: CharCountRule) -> usize {
        char_count(&self.content, rule)
    }
}
