//! Text search.
//!
//! Search runs over the whole document (not per page) and reports **character offsets**. It
//! supports:
//!
//! - plain substring search (escaped and compiled into a regex)
//! - regex search
//! - optional whole-word matching
//!
//! [`SearchState`] keeps the current query, its matches and the active match, and maps the
//! active match onto the page layout.

use crate::offsets::{PagePosition, to_page_local};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words.
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    /// Case-insensitive plain text, like the editor's find bar.
    fn default() -> Self {
        Self {
            case_sensitive: false,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl SearchMatch {
    /// Length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

fn build_regex(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .multi_line(true)
        .build()?)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Whether the byte range `start..end` is not glued to a word character on either side.
fn stands_alone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Find all occurrences of `query` in `text` (empty query → no matches).
///
/// Matches never overlap and empty regex matches are dropped.
pub fn find_all(
    text: &str,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let re = build_regex(query, options)?;
    let mut matches = Vec::new();
    // Matches arrive in order, so char offsets are counted incrementally.
    let mut scanned_bytes = 0;
    let mut scanned_chars = 0;
    for found in re.find_iter(text) {
        if found.is_empty() {
            continue;
        }
        let start = scanned_chars + text[scanned_bytes..found.start()].chars().count();
        let end = start + found.as_str().chars().count();
        scanned_bytes = found.end();
        scanned_chars = end;

        if options.whole_word && !stands_alone(text, found.start(), found.end()) {
            continue;
        }
        matches.push(SearchMatch { start, end });
    }
    Ok(matches)
}

/// Query, matches and active match of an editor's find bar.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    options: SearchOptions,
    matches: Vec<SearchMatch>,
    active: Option<usize>,
}

impl SearchState {
    /// Create an empty search state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// All matches of the current query.
    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    /// Number of matches, or `None` when no query is set.
    pub fn match_count(&self) -> Option<usize> {
        (!self.query.is_empty()).then_some(self.matches.len())
    }

    /// Index of the active match.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// The active match.
    pub fn active_match(&self) -> Option<SearchMatch> {
        self.active.and_then(|i| self.matches.get(i).copied())
    }

    /// Set a new query and search `text`. The first match at or after `caret` becomes active.
    pub fn set_query(
        &mut self,
        text: &str,
        query: &str,
        options: SearchOptions,
        caret: usize,
    ) -> Result<usize, SearchError> {
        let matches = find_all(text, query, options)?;
        self.query = query.to_string();
        self.options = options;
        self.matches = matches;
        self.active = self.first_from(caret);
        Ok(self.matches.len())
    }

    /// Re-run the current query after the document changed, keeping the active match near
    /// `caret`.
    pub fn refresh(&mut self, text: &str, caret: usize) -> Result<usize, SearchError> {
        let query = std::mem::take(&mut self.query);
        self.set_query(text, &query, self.options, caret)
    }

    /// Clear the query and all matches.
    pub fn clear(&mut self) {
        self.query.clear();
        self.matches.clear();
        self.active = None;
    }

    /// Activate the next match (wrapping around).
    pub fn next(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let next = self.active.map_or(0, |i| (i + 1) % self.matches.len());
        self.active = Some(next);
        self.active_match()
    }

    /// Activate the previous match (wrapping around).
    pub fn prev(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        let prev = self.active.map_or(len - 1, |i| (i + len - 1) % len);
        self.active = Some(prev);
        self.active_match()
    }

    /// Page position of the active match's start.
    pub fn active_page_position<S: AsRef<str>>(&self, pages: &[S]) -> Option<PagePosition> {
        self.active_match().map(|m| to_page_local(pages, m.start))
    }

    fn first_from(&self, caret: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        Some(
            self.matches
                .iter()
                .position(|m| m.start >= caret)
                .unwrap_or(0),
        )
    }
}
