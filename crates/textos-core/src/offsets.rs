//! Offset mapping between the whole document and individual pages.
//!
//! All offsets are **character offsets** (Unicode scalar values). Every page boundary consumes
//! exactly one absolute offset, standing for the `'\n'` that joins two pages, so
//! `page_start(i) = sum(len(pages[..i]) + 1)`.
//!
//! Nothing here panics: out-of-range offsets and page indices clamp to the document end.

use unicode_segmentation::UnicodeSegmentation;

/// A caret location expressed as a page plus an offset into that page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PagePosition {
    /// Zero-based page index.
    pub page_index: usize,
    /// Character offset within the page.
    pub local_offset: usize,
}

impl PagePosition {
    /// Create a new page position.
    pub fn new(page_index: usize, local_offset: usize) -> Self {
        Self {
            page_index,
            local_offset,
        }
    }
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of character `char_offset`, clamped to the end of `text`.
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    let byte_offset = byte_offset.min(text.len());
    text.char_indices()
        .take_while(|(byte, _)| *byte < byte_offset)
        .count()
}

/// Total document length implied by `pages` (page lengths plus one separator per boundary).
pub fn document_len<S: AsRef<str>>(pages: &[S]) -> usize {
    let chars: usize = pages.iter().map(|p| char_len(p.as_ref())).sum();
    chars + pages.len().saturating_sub(1)
}

/// Absolute offset at which `page_index` starts. Indices past the end clamp to the document end.
pub fn page_start<S: AsRef<str>>(pages: &[S], page_index: usize) -> usize {
    if page_index >= pages.len() {
        return document_len(pages);
    }
    pages[..page_index]
        .iter()
        .map(|p| char_len(p.as_ref()) + 1)
        .sum()
}

/// Map an absolute offset to a page position.
///
/// An offset that sits exactly on a page boundary's separator maps to the end of the earlier
/// page. Offsets past the document end clamp to the end of the last page.
pub fn to_page_local<S: AsRef<str>>(pages: &[S], absolute_offset: usize) -> PagePosition {
    let mut remaining = absolute_offset;
    for (page_index, page) in pages.iter().enumerate() {
        let len = char_len(page.as_ref());
        if remaining <= len {
            return PagePosition::new(page_index, remaining);
        }
        remaining -= len + 1;
    }

    match pages.last() {
        Some(last) => PagePosition::new(pages.len() - 1, char_len(last.as_ref())),
        None => PagePosition::default(),
    }
}

/// Map a page position back to an absolute offset.
///
/// The local offset clamps to the page length; a page index past the end maps to the
/// document end.
pub fn to_absolute<S: AsRef<str>>(pages: &[S], page_index: usize, local_offset: usize) -> usize {
    let Some(page) = pages.get(page_index) else {
        return document_len(pages);
    };
    page_start(pages, page_index) + local_offset.min(char_len(page.as_ref()))
}

/// Zero-based `(line, column)` of `local_offset` within `text`, both counted in characters.
pub fn line_column(text: &str, local_offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut column = 0;
    for ch in text.chars().take(local_offset) {
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Local offset of `(line, column)` within `text`, with both clamped to what exists.
pub fn offset_for_line_column(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, segment) in text.split('\n').enumerate() {
        let len = char_len(segment);
        if index == line {
            return offset + column.min(len);
        }
        offset += len + 1;
    }
    // Past the last line: end of text.
    char_len(text)
}

/// Number of lines in `text` (`N` newlines make `N + 1` lines).
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Length of the first line of `text`.
pub fn first_line_len(text: &str) -> usize {
    text.split('\n').next().map_or(0, char_len)
}

/// Local offset at which the last line of `text` starts.
pub fn last_line_start(text: &str) -> usize {
    char_len(text) - last_line_len(text)
}

/// Length of the last line of `text`.
pub fn last_line_len(text: &str) -> usize {
    text.rsplit('\n').next().map_or(0, char_len)
}

/// Whether `local_offset` is on the first line of `text`.
pub fn is_on_first_line(text: &str, local_offset: usize) -> bool {
    !text.chars().take(local_offset).any(|ch| ch == '\n')
}

/// Whether `local_offset` is on the last line of `text`.
pub fn is_on_last_line(text: &str, local_offset: usize) -> bool {
    !text.chars().skip(local_offset).any(|ch| ch == '\n')
}

/// Previous grapheme-cluster boundary before `local_offset` (0 at the start).
pub fn prev_boundary(text: &str, local_offset: usize) -> usize {
    let byte = char_to_byte(text, local_offset);
    let prev = text[..byte]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(start, _)| start);
    byte_to_char(text, prev)
}

/// Next grapheme-cluster boundary after `local_offset` (the text length at the end).
pub fn next_boundary(text: &str, local_offset: usize) -> usize {
    let byte = char_to_byte(text, local_offset);
    match text[byte..].graphemes(true).next() {
        Some(grapheme) => byte_to_char(text, byte + grapheme.len()),
        None => char_len(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_start_and_document_len() {
        let pages = ["abc", "de", ""];
        assert_eq!(page_start(&pages, 0), 0);
        assert_eq!(page_start(&pages, 1), 4);
        assert_eq!(page_start(&pages, 2), 7);
        assert_eq!(document_len(&pages), 7);
        assert_eq!(page_start(&pages, 9), 7);
    }

    #[test]
    fn test_to_page_local_boundaries() {
        let pages = ["abc", "def"];
        assert_eq!(to_page_local(&pages, 0), PagePosition::new(0, 0));
        assert_eq!(to_page_local(&pages, 3), PagePosition::new(0, 3));
        assert_eq!(to_page_local(&pages, 4), PagePosition::new(1, 0));
        assert_eq!(to_page_local(&pages, 7), PagePosition::new(1, 3));
        assert_eq!(to_page_local(&pages, 99), PagePosition::new(1, 3));
    }

    #[test]
    fn test_empty_page_list() {
        let pages: [&str; 0] = [];
        assert_eq!(to_page_local(&pages, 5), PagePosition::default());
        assert_eq!(to_absolute(&pages, 0, 3), 0);
    }

    #[test]
    fn test_to_absolute_clamps() {
        let pages = ["abc", "def"];
        assert_eq!(to_absolute(&pages, 1, 2), 6);
        assert_eq!(to_absolute(&pages, 0, 10), 3);
        assert_eq!(to_absolute(&pages, 5, 0), 7);
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let pages = ["héllo", "wörld"];
        assert_eq!(page_start(&pages, 1), 6);
        assert_eq!(to_page_local(&pages, 8), PagePosition::new(1, 2));
    }

    #[test]
    fn test_line_helpers() {
        let text = "ab\ncdef\nxyz";
        assert_eq!(line_column(text, 0), (0, 0));
        assert_eq!(line_column(text, 5), (1, 2));
        assert_eq!(line_column(text, 11), (2, 3));
        assert_eq!(offset_for_line_column(text, 1, 99), 7);
        assert_eq!(offset_for_line_column(text, 9, 0), 11);
        assert_eq!(first_line_len(text), 2);
        assert_eq!(last_line_len(text), 3);
        assert_eq!(last_line_start(text), 8);
        assert_eq!(line_count(text), 3);
        assert!(is_on_first_line(text, 2));
        assert!(!is_on_first_line(text, 3));
        assert!(is_on_last_line(text, 8));
        assert!(!is_on_last_line(text, 7));
    }

    #[test]
    fn test_grapheme_boundaries() {
        // "e" + combining acute accent is one grapheme of two chars.
        let text = "ae\u{301}b";
        assert_eq!(next_boundary(text, 1), 3);
        assert_eq!(prev_boundary(text, 3), 1);
        assert_eq!(prev_boundary(text, 0), 0);
        assert_eq!(next_boundary(text, 4), 4);
    }
}
