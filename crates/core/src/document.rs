//! Document parsing and splitting seams for ingestion.
//!
//! The parser and splitter are external collaborators. The pipeline only
//! relies on two contracts: byte stream → text, and text → ordered
//! segments.

use crate::error::IngestError;

/// A positioned piece of one parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSegment {
    /// Trimmed segment text.
    pub text: String,

    /// 1-based position within the document.
    pub index: usize,

    /// Total segments the document produced before filtering.
    pub total: usize,

    /// Source file name the segment came from.
    pub source: String,
}

impl DocumentSegment {
    /// The stored form: a metadata header naming source and position,
    /// followed by the text.
    pub fn with_header(&self) -> String {
        format!(
            "[Document: {} | Section {} of {}]\n{}",
            self.source, self.index, self.total, self.text
        )
    }
}

/// Byte stream to logical document text.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> std::result::Result<String, IngestError>;
}

/// Document text to an ordered sequence of segments.
pub trait DocumentSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}
