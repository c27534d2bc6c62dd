//! Paragraph-based document splitter.

use mnemo_core::document::DocumentSplitter;

/// Ceiling on segment size before a paragraph is re-chunked at word
/// boundaries. Keeps one wall-of-text paragraph from turning into a single
/// enormous knowledge entry.
const DEFAULT_MAX_CHARS: usize = 1200;

/// Splits a document on blank lines, one segment per paragraph.
///
/// Paragraphs above the size ceiling are re-chunked at word boundaries so
/// every emitted segment stays independently searchable. A single word
/// longer than the ceiling is emitted whole.
pub struct ParagraphSplitter {
    max_chars: usize,
}

impl ParagraphSplitter {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    fn chunk_words(&self, paragraph: &str, out: &mut Vec<String>) {
        let mut current = String::new();
        let mut count = 0usize;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if count > 0 && count + 1 + word_len > self.max_chars {
                out.push(std::mem::take(&mut current));
                count = 0;
            }
            if count > 0 {
                current.push(' ');
                count += 1;
            }
            current.push_str(word);
            count += word_len;
        }
        if count > 0 {
            out.push(current);
        }
    }
}

impl Default for ParagraphSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl DocumentSplitter for ParagraphSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut segments = Vec::new();
        for paragraph in paragraphs(text) {
            if paragraph.chars().count() <= self.max_chars {
                segments.push(paragraph);
            } else {
                self.chunk_words(&paragraph, &mut segments);
            }
        }
        segments
    }
}

/// Group lines into paragraphs separated by blank (or whitespace-only)
/// lines. Line breaks inside a paragraph are preserved; the store sanitizes
/// them away at write time.
fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
