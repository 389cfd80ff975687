//! Page-boundary editing.
//!
//! Each page is edited as an independent text box. This module turns the per-page events that
//! cross a page edge into document-wide results:
//!
//! - a local edit rebuilds the whole document and records the caret as an absolute offset,
//! - `Backspace` at the start of a page merges it into the previous page,
//! - `Delete` at the end of a page pulls the next page in,
//! - arrow keys on the first/last line of a page move the caret to the neighboring page.
//!
//! Whenever a selection spans more than a caret point, boundary keys are left to the page's
//! default single-page behavior.

use crate::offsets::{
    PagePosition, char_len, first_line_len, is_on_first_line, is_on_last_line, last_line_len,
    last_line_start, page_start, to_absolute,
};
use crate::paginate::join_pages;

/// Keys that may cross a page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKey {
    /// Delete the character before the caret.
    Backspace,
    /// Delete the character after the caret.
    Delete,
    /// Move up one line.
    ArrowUp,
    /// Move down one line.
    ArrowDown,
    /// Move left one character.
    ArrowLeft,
    /// Move right one character.
    ArrowRight,
}

/// A selection inside a single page, as local character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalSelection {
    /// Selection anchor.
    pub start: usize,
    /// Selection active end (the caret).
    pub end: usize,
}

impl LocalSelection {
    /// A collapsed selection (plain caret) at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// A selection between `start` and `end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Whether this selection is a plain caret.
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }
}

/// Result of a local (single page) edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEdit {
    /// The reassembled document.
    pub document: String,
    /// Absolute caret offset in the new document.
    pub caret: usize,
}

/// Result of a key that crossed a page boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryAction {
    /// Two pages were merged into one.
    Merge {
        /// The reassembled document.
        document: String,
        /// Absolute caret offset in the new document.
        caret: usize,
    },
    /// The caret moved to another page without editing text.
    Navigate {
        /// Destination page position.
        target: PagePosition,
        /// Absolute caret offset of `target`.
        caret: usize,
    },
}

/// Replace page `page_index` with `new_text` and rebuild the document.
///
/// `caret_local` is the caret offset in `new_text`; it is made absolute against the page start
/// of the layout *before* the edit. An out-of-range page index leaves the document unchanged and
/// clamps the caret.
pub fn apply_local_edit<S: AsRef<str>>(
    pages: &[S],
    page_index: usize,
    new_text: &str,
    caret_local: usize,
) -> LocalEdit {
    let start = page_start(pages, page_index);
    if page_index >= pages.len() {
        return LocalEdit {
            document: join_pages(pages),
            caret: start,
        };
    }

    let mut new_pages: Vec<&str> = pages.iter().map(|p| p.as_ref()).collect();
    new_pages[page_index] = new_text;

    LocalEdit {
        document: join_pages(&new_pages),
        caret: start + caret_local.min(char_len(new_text)),
    }
}

/// Handle a key pressed on page `page_index`.
///
/// Returns `None` when the key does not cross a page boundary (or a range is selected), in which
/// case the page's own editing behavior applies.
pub fn handle_boundary_key<S: AsRef<str>>(
    pages: &[S],
    page_index: usize,
    selection: LocalSelection,
    key: BoundaryKey,
) -> Option<BoundaryAction> {
    if !selection.is_caret() {
        return None;
    }
    let current = pages.get(page_index)?.as_ref();
    let pos = selection.end.min(char_len(current));
    let last_index = pages.len() - 1;

    match key {
        BoundaryKey::Backspace if pos == 0 && page_index > 0 => {
            let caret = page_start(pages, page_index) - 1;
            Some(BoundaryAction::Merge {
                document: merge_pages(pages, page_index - 1),
                caret,
            })
        }
        BoundaryKey::Delete if pos == char_len(current) && page_index < last_index => {
            let caret = page_start(pages, page_index) + pos;
            Some(BoundaryAction::Merge {
                document: merge_pages(pages, page_index),
                caret,
            })
        }
        BoundaryKey::ArrowUp if page_index > 0 && is_on_first_line(current, pos) => {
            let previous = pages[page_index - 1].as_ref();
            let local = last_line_start(previous) + pos.min(last_line_len(previous));
            Some(navigate(pages, page_index - 1, local))
        }
        BoundaryKey::ArrowDown if page_index < last_index && is_on_last_line(current, pos) => {
            let column = pos - last_line_start(current);
            let next = pages[page_index + 1].as_ref();
            Some(navigate(pages, page_index + 1, column.min(first_line_len(next))))
        }
        BoundaryKey::ArrowLeft if pos == 0 && page_index > 0 => {
            let previous = pages[page_index - 1].as_ref();
            Some(navigate(pages, page_index - 1, char_len(previous)))
        }
        BoundaryKey::ArrowRight if pos == char_len(current) && page_index < last_index => {
            Some(navigate(pages, page_index + 1, 0))
        }
        _ => None,
    }
}

/// Join pages `first` and `first + 1` without a separator and rebuild the document.
fn merge_pages<S: AsRef<str>>(pages: &[S], first: usize) -> String {
    let mut merged: Vec<String> = Vec::with_capacity(pages.len() - 1);
    for (index, page) in pages.iter().enumerate() {
        if index == first + 1 {
            if let Some(last) = merged.last_mut() {
                last.push_str(page.as_ref());
            }
            continue;
        }
        merged.push(page.as_ref().to_string());
    }
    join_pages(&merged)
}

fn navigate<S: AsRef<str>>(pages: &[S], page_index: usize, local_offset: usize) -> BoundaryAction {
    BoundaryAction::Navigate {
        target: PagePosition::new(page_index, local_offset),
        caret: to_absolute(pages, page_index, local_offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_edit_uses_old_page_start() {
        let pages = ["abc", "def"];
        let edit = apply_local_edit(&pages, 1, "dXef", 2);
        assert_eq!(edit.document, "abc\ndXef");
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn test_local_edit_out_of_range_page() {
        let pages = ["abc"];
        let edit = apply_local_edit(&pages, 4, "zzz", 1);
        assert_eq!(edit.document, "abc");
        assert_eq!(edit.caret, 3);
    }

    #[test]
    fn test_backspace_on_first_page_passes_through() {
        let pages = ["abc", "def"];
        let action =
            handle_boundary_key(&pages, 0, LocalSelection::caret(0), BoundaryKey::Backspace);
        assert_eq!(action, None);
    }

    #[test]
    fn test_delete_on_last_page_passes_through() {
        let pages = ["abc", "def"];
        let action = handle_boundary_key(&pages, 1, LocalSelection::caret(3), BoundaryKey::Delete);
        assert_eq!(action, None);
    }

    #[test]
    fn test_merge_keeps_other_pages() {
        let pages = ["a", "b", "c", "d"];
        let action =
            handle_boundary_key(&pages, 2, LocalSelection::caret(0), BoundaryKey::Backspace);
        assert_eq!(
            action,
            Some(BoundaryAction::Merge {
                document: "a\nbc\nd".to_string(),
                caret: 3,
            })
        );
    }

    #[test]
    fn test_selection_passes_through() {
        let pages = ["abc", "def"];
        let action = handle_boundary_key(
            &pages,
            1,
            LocalSelection::new(0, 2),
            BoundaryKey::Backspace,
        );
        assert_eq!(action, None);
    }

    #[test]
    fn test_arrow_up_only_from_first_line() {
        let pages = ["abc", "de\nfgh"];
        assert_eq!(
            handle_boundary_key(&pages, 1, LocalSelection::caret(4), BoundaryKey::ArrowUp),
            None
        );
        assert_eq!(
            handle_boundary_key(&pages, 1, LocalSelection::caret(1), BoundaryKey::ArrowUp),
            Some(BoundaryAction::Navigate {
                target: PagePosition::new(0, 1),
                caret: 1,
            })
        );
    }

    #[test]
    fn test_left_and_right_cross_at_page_edges() {
        let pages = ["ab\ncd", "ef"];
        assert_eq!(
            handle_boundary_key(&pages, 1, LocalSelection::caret(0), BoundaryKey::ArrowLeft),
            Some(BoundaryAction::Navigate {
                target: PagePosition::new(0, 5),
                caret: 5,
            })
        );
        assert_eq!(
            handle_boundary_key(&pages, 1, LocalSelection::caret(1), BoundaryKey::ArrowLeft),
            None
        );
        assert_eq!(
            handle_boundary_key(&pages, 0, LocalSelection::caret(5), BoundaryKey::ArrowRight),
            Some(BoundaryAction::Navigate {
                target: PagePosition::new(1, 0),
                caret: 6,
            })
        );
    }
}
