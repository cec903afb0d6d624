//! Turn an uploaded file into the positioned fragment stream the assembler expects.

use tally_core::{Error, Result};
use tracing::debug;

use crate::types::TextFragment;

/// Extract page text from PDF bytes.
///
/// `pdf-extract` hands back plain text with layout already flattened, so each
/// text line becomes one fragment on its own `y` row.
pub fn fragments_from_pdf(bytes: &[u8]) -> Result<Vec<TextFragment>> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| Error::decode(format!("failed to extract text from PDF: {e}")))?;

    let fragments: Vec<TextFragment> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, l)| TextFragment::new(l, i as f64))
        .collect();

    debug!(fragments = fragments.len(), "decoded pdf text");
    Ok(fragments)
}

/// Parse an externally decoded `[{ "text": .., "y": .. }]` stream.
pub fn fragments_from_json(json: &str) -> Result<Vec<TextFragment>> {
    serde_json::from_str(json).map_err(|e| Error::decode(format!("invalid fragment stream: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fragments_with_and_without_y() {
        let frags = fragments_from_json(r#"[{"text":"a","y":1.5},{"text":"b"}]"#).unwrap();
        assert_eq!(frags[0], TextFragment::new("a", 1.5));
        assert_eq!(frags[1], TextFragment::unpositioned("b"));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(fragments_from_json("{not json"), Err(Error::Decode(_))));
        assert!(matches!(fragments_from_pdf(b"not a pdf"), Err(Error::Decode(_))));
    }
}
