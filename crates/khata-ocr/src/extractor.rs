//! # Text Extraction Boundary
//!
//! Real OCR lives behind [`TextExtractor`]; the pipeline only ever sees
//! the raw text it returns. Deployments plug in an engine, tests plug
//! in canned text.

use std::collections::HashMap;

/// Turns an opaque image reference into raw receipt text.
///
/// Implementations may return an empty string when nothing can be read;
/// the pipeline treats that as a receipt with no extractable fields.
pub trait TextExtractor: Send + Sync {
    /// Extract raw text for the given image reference.
    fn extract_text(&self, image_ref: &str) -> String;
}

/// Extractor that reads nothing. The default when no engine is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

impl TextExtractor for NoopExtractor {
    fn extract_text(&self, _image_ref: &str) -> String {
        String::new()
    }
}

/// Extractor backed by a fixed `image_ref -> text` table.
///
/// Used in tests and demos to drive the pipeline deterministically.
#[derive(Debug, Clone, Default)]
pub struct FixtureExtractor {
    texts: HashMap<String, String>,
}

impl FixtureExtractor {
    /// Build an extractor from `(image_ref, text)` pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            texts: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TextExtractor for FixtureExtractor {
    fn extract_text(&self, image_ref: &str) -> String {
        self.texts.get(image_ref).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_extractor_returns_canned_text() {
        let extractor = FixtureExtractor::new([("r1.jpg", "Total 45.00")]);
        assert_eq!(extractor.extract_text("r1.jpg"), "Total 45.00");
        assert_eq!(extractor.extract_text("unknown.jpg"), "");
    }
}
