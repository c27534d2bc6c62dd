//! # mnemo Ingest
//!
//! Knowledge ingestion: a periodic directory scan that parses source
//! documents, splits them into paragraph segments, filters out fragments
//! too short to be worth retrieving, and commits the rest to the
//! knowledge base with a source header.
//!
//! Processed documents are renamed to the `.processed` marker extension
//! whether or not they parsed, so a malformed file can never stall the
//! scan. The rename is the only durable ingestion record; it is not
//! atomic with the entry writes.

pub mod parser;
pub mod pipeline;
pub mod splitter;

pub use parser::PlainTextParser;
pub use pipeline::{FileReport, IngestPipeline, MIN_SEGMENT_CHARS, ScanReport};
pub use splitter::ParagraphSplitter;
