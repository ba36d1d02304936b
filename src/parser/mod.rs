//! LOCString Parser
//!
//! Line splitting and structural parsing of `.ucs` files.
//! Columns are measured in UTF-16 code units, the default LSP encoding.

pub mod ast;
pub mod lexer;

pub use ast::{Entry, Line, ParsedLine};
pub use lexer::is_integer;

/// Parse a single line of a LOCString file
pub fn parse_line(index: usize, text: &str) -> Line<'_> {
    Line::new(index, text)
}

/// Split document text into lines on `\n` or `\r\n`.
///
/// A trailing terminator yields a final empty line, and empty text yields a
/// single empty line, so the result is never empty.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Convert a UTF-16 column into a byte offset within `text`.
///
/// Returns `None` when the column lies past the end of the text or inside a
/// surrogate pair.
pub fn utf16_to_byte_offset(text: &str, column: u32) -> Option<usize> {
    let mut units = 0u32;
    for (offset, ch) in text.char_indices() {
        if units == column {
            return Some(offset);
        }
        if units > column {
            return None;
        }
        units += ch.len_utf16() as u32;
    }

    (units == column).then_some(text.len())
}
