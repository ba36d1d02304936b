use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::parser::{utf16_len, utf16_to_byte_offset};

/// Language id editors use for LOCString files
pub const LANGUAGE_ID: &str = "ucs";

/// State for each open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Full document text
    pub content: String,
    /// Document version (from LSP)
    pub version: i32,
    pub language_id: String,
    /// Byte offset of every line start
    line_starts: Vec<usize>,
}

impl DocumentState {
    pub fn new(content: String, version: i32, language_id: impl Into<String>) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            content,
            version,
            language_id: language_id.into(),
            line_starts,
        }
    }

    /// Number of lines, counting a trailing empty line
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a line without its terminator
    pub fn line(&self, index: usize) -> Option<&str> {
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.content.len());

        let text = &self.content[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Apply an incremental or full text change
    pub fn apply_change(&mut self, change: &TextDocumentContentChangeEvent, version: i32) {
        self.version = version;

        match change.range {
            Some(range) => {
                let start = self.position_to_offset(range.start);
                let end = self.position_to_offset(range.end).max(start);
                self.content.replace_range(start..end, &change.text);
            }
            None => {
                self.content = change.text.clone();
            }
        }

        self.line_starts = compute_line_starts(&self.content);
    }

    /// Convert an LSP position (UTF-16 columns) to a byte offset, clamping
    /// positions past the end of a line or the document.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.content.len();
        };
        let line_text = self.line(line).unwrap_or("");

        let mut column = position.character.min(utf16_len(line_text));
        loop {
            if let Some(offset) = utf16_to_byte_offset(line_text, column) {
                return line_start + offset;
            }
            // Inside a surrogate pair; column 0 always resolves
            column -= 1;
        }
    }

    /// Whether this document should be validated
    pub fn is_ucs(&self, uri: &Url) -> bool {
        self.language_id == LANGUAGE_ID || uri.path().ends_with(".ucs")
    }
}

/// Compute line start positions for a text
fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Friendly name of a document: its path relative to the workspace folder
/// that contains it, or the full path otherwise.
pub fn relative_file_name(uri: &Url, workspace_folders: &[Url]) -> String {
    let path = uri.path();

    for folder in workspace_folders {
        let folder_path = folder.path().trim_end_matches('/');
        if let Some(rest) = path.strip_prefix(folder_path) {
            if rest.starts_with('/') {
                return rest.trim_start_matches('/').to_string();
            }
        }
    }

    uri.to_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Range;

    fn change(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range::new(
                Position::new(start.0, start.1),
                Position::new(end.0, end.1),
            )),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_lines() {
        let doc = DocumentState::new("1\ta\r\n2\tb\n".to_string(), 1, "ucs");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(0), Some("1\ta"));
        assert_eq!(doc.line(1), Some("2\tb"));
        assert_eq!(doc.line(2), Some(""));
        assert_eq!(doc.line(3), None);
    }

    #[test]
    fn test_incremental_insert() {
        let mut doc = DocumentState::new("12\nx".to_string(), 1, "ucs");
        doc.apply_change(&change((0, 2), (0, 2), "    "), 2);
        assert_eq!(doc.content, "12    \nx");
        assert_eq!(doc.version, 2);

        doc.apply_change(&change((0, 2), (0, 6), "\t"), 3);
        assert_eq!(doc.content, "12\t\nx");
        assert_eq!(doc.line(1), Some("x"));
    }

    #[test]
    fn test_full_replacement() {
        let mut doc = DocumentState::new("old".to_string(), 1, "ucs");
        let full = TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "1\tnew\n".to_string(),
        };
        doc.apply_change(&full, 5);
        assert_eq!(doc.content, "1\tnew\n");
        assert_eq!(doc.line_count(), 2);
    }

    #[test]
    fn test_position_to_offset_utf16() {
        let doc = DocumentState::new("a😀b\nc".to_string(), 1, "ucs");
        assert_eq!(doc.position_to_offset(Position::new(0, 1)), 1);
        assert_eq!(doc.position_to_offset(Position::new(0, 3)), 5);
        // Inside the surrogate pair
        assert_eq!(doc.position_to_offset(Position::new(0, 2)), 1);
        // Past the end of the line
        assert_eq!(doc.position_to_offset(Position::new(0, 40)), 6);
        assert_eq!(doc.position_to_offset(Position::new(1, 0)), 7);
        assert_eq!(doc.position_to_offset(Position::new(9, 0)), 8);
    }

    #[test]
    fn test_is_ucs() {
        let uri = Url::parse("file:///work/strings.ucs").unwrap();
        assert!(DocumentState::new(String::new(), 1, "plaintext").is_ucs(&uri));

        let other = Url::parse("file:///work/readme.txt").unwrap();
        assert!(DocumentState::new(String::new(), 1, LANGUAGE_ID).is_ucs(&other));
        assert!(!DocumentState::new(String::new(), 1, "plaintext").is_ucs(&other));
    }

    #[test]
    fn test_relative_file_name() {
        let folders = vec![Url::parse("file:///work/game").unwrap()];
        let uri = Url::parse("file:///work/game/loc/english.ucs").unwrap();
        assert_eq!(relative_file_name(&uri, &folders), "loc/english.ucs");

        let sibling = Url::parse("file:///work/gameplay/english.ucs").unwrap();
        assert_ne!(relative_file_name(&sibling, &folders), "play/english.ucs");

        let outside = Url::parse("file:///elsewhere/english.ucs").unwrap();
        assert!(relative_file_name(&outside, &folders).ends_with("english.ucs"));
    }
}
