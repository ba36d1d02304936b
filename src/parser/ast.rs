//! Line structure for LOCString files
//!
//! Pure data representation of a single `id<TAB>message` line.
//! No validation logic or LSP concerns.

use crate::parser::utf16_len;

/// The structural shape of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// A zero-length line
    Empty,
    /// Non-empty text without any tab character
    Untabbed(&'a str),
    /// Text split on its first tab
    Entry(Entry<'a>),
}

/// An `id<TAB>message` pair, split on the first tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Text before the first tab (may be empty)
    pub id: &'a str,
    /// Text after the first tab (may itself contain tabs)
    pub message: &'a str,
    /// Byte offset of the first tab within the line
    pub tab_offset: usize,
}

impl<'a> Entry<'a> {
    /// Column of the delimiting tab, in UTF-16 code units
    pub fn tab_column(&self) -> u32 {
        utf16_len(self.id)
    }
}

impl<'a> ParsedLine<'a> {
    pub fn id(&self) -> Option<&'a str> {
        match self {
            ParsedLine::Entry(entry) => Some(entry.id),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&'a str> {
        match self {
            ParsedLine::Entry(entry) => Some(entry.message),
            _ => None,
        }
    }

    pub fn tab_offset(&self) -> Option<usize> {
        match self {
            ParsedLine::Entry(entry) => Some(entry.tab_offset),
            _ => None,
        }
    }
}

/// A line of a document together with its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Zero-based line number
    pub index: usize,
    /// Raw text without the line terminator
    pub text: &'a str,
    pub parsed: ParsedLine<'a>,
}

impl<'a> Line<'a> {
    pub fn new(index: usize, text: &'a str) -> Self {
        Self {
            index,
            text,
            parsed: text_to_parsed_line(text),
        }
    }

    /// Line number as used in diagnostic spans
    pub fn number(&self) -> u32 {
        self.index as u32
    }

    /// Length of the line in UTF-16 code units
    pub fn width(&self) -> u32 {
        utf16_len(self.text)
    }
}

/// Split a line's text on its first tab character.
pub fn text_to_parsed_line(text: &str) -> ParsedLine<'_> {
    if text.is_empty() {
        return ParsedLine::Empty;
    }

    match text.find('\t') {
        Some(tab_offset) => ParsedLine::Entry(Entry {
            id: &text[..tab_offset],
            message: &text[tab_offset + 1..],
            tab_offset,
        }),
        None => ParsedLine::Untabbed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(text_to_parsed_line(""), ParsedLine::Empty);
    }

    #[test]
    fn test_untabbed_text() {
        assert_eq!(
            text_to_parsed_line("12 hello"),
            ParsedLine::Untabbed("12 hello")
        );
        // Whitespace-only text is not empty
        assert_eq!(text_to_parsed_line("   "), ParsedLine::Untabbed("   "));
    }

    #[test]
    fn test_splits_on_first_tab_only() {
        let parsed = text_to_parsed_line("3\tone\ttwo");
        assert_eq!(parsed.id(), Some("3"));
        assert_eq!(parsed.message(), Some("one\ttwo"));
        assert_eq!(parsed.tab_offset(), Some(1));
    }

    #[test]
    fn test_leading_tab_gives_empty_id() {
        let parsed = text_to_parsed_line("\tHi");
        assert_eq!(parsed.id(), Some(""));
        assert_eq!(parsed.message(), Some("Hi"));
    }

    #[test]
    fn test_tab_column_counts_utf16_units() {
        let line = Line::new(0, "é😀\tx");
        if let ParsedLine::Entry(entry) = line.parsed {
            assert_eq!(entry.tab_offset, 6);
            assert_eq!(entry.tab_column(), 3);
        } else {
            panic!("Expected entry");
        }
        assert_eq!(line.width(), 5);
    }
}
