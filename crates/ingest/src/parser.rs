//! Plain text document parser.

use mnemo_core::document::DocumentParser;
use mnemo_core::error::IngestError;

/// Parses UTF-8 text files. Rejects documents that decode to nothing but
/// whitespace so the pipeline can mark them processed without splitting.
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, bytes: &[u8]) -> std::result::Result<String, IngestError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IngestError::Parse(format!("invalid UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Err(IngestError::EmptyDocument);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utf8_text() {
        let text = PlainTextParser.parse("shipping takes three days".as_bytes());
        assert_eq!(text.unwrap(), "shipping takes three days");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = PlainTextParser.parse(&[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(IngestError::Parse(_))));
    }

    #[test]
    fn rejects_blank_documents() {
        let result = PlainTextParser.parse(b"  \n\t \r\n ");
        assert!(matches!(result, Err(IngestError::EmptyDocument)));
    }
}
