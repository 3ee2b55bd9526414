use std::path::Path;

use super::types::{PageExtraction, PdfExtractor};
use super::ExtractionError;

/// Join page texts in page order with nothing inserted between them.
pub fn flatten_pages(pages: &[PageExtraction]) -> String {
    let mut ordered: Vec<&PageExtraction> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_number);
    ordered.into_iter().map(|p| p.text.as_str()).collect()
}

/// Read the instruction document at `path` and flatten it to plain text.
///
/// Pages without a text layer contribute nothing. A missing or unparseable
/// file is an error; callers treat it as fatal.
pub fn load_instruction_text(
    path: &Path,
    extractor: &dyn PdfExtractor,
) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractionError::DocumentNotFound(path.to_path_buf())
        } else {
            ExtractionError::Io(e)
        }
    })?;

    let pages = extractor.extract_text(&bytes)?;
    let empty_pages = pages.iter().filter(|p| p.text.trim().is_empty()).count();
    let text = flatten_pages(&pages);

    tracing::info!(
        pages = pages.len(),
        empty_pages,
        chars = text.len(),
        "Loaded instruction document"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::pdf::test_pdf::make_test_pdf;
    use crate::pipeline::extraction::PdfTextExtractor;

    /// Returns fixed pages regardless of input bytes.
    struct FixedPages(Vec<&'static str>);

    impl PdfExtractor for FixedPages {
        fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .map(|(i, text)| PageExtraction {
                    page_number: i + 1,
                    text: text.to_string(),
                })
                .collect())
        }
    }

    fn page(page_number: usize, text: &str) -> PageExtraction {
        PageExtraction {
            page_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn flatten_concatenates_without_separators() {
        let pages = vec![page(1, "Discharge "), page(2, "planning"), page(3, " guide")];
        assert_eq!(flatten_pages(&pages), "Discharge planning guide");
    }

    #[test]
    fn flatten_orders_by_page_number() {
        let pages = vec![page(2, "B"), page(1, "A"), page(3, "C")];
        assert_eq!(flatten_pages(&pages), "ABC");
    }

    #[test]
    fn empty_page_contributes_nothing() {
        let pages = vec![page(1, "first"), page(2, ""), page(3, "third")];
        assert_eq!(flatten_pages(&pages), "firstthird");
    }

    #[test]
    fn load_matches_page_concatenation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.pdf");
        std::fs::write(&path, b"%PDF-stub").unwrap();

        let extractor = FixedPages(vec!["Page one text.", "", "Page three text."]);
        let text = load_instruction_text(&path, &extractor).unwrap();
        assert_eq!(text, "Page one text.Page three text.");
    }

    #[test]
    fn load_real_pdf_equals_flattened_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.pdf");
        let bytes = make_test_pdf(&["Summary", "Medications", "FollowUp"]);
        std::fs::write(&path, &bytes).unwrap();

        let extractor = PdfTextExtractor;
        let pages = extractor.extract_text(&bytes).unwrap();
        let text = load_instruction_text(&path, &extractor).unwrap();

        let expected: String = pages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(text, expected);
        assert!(text.contains("Medications"));
    }

    #[test]
    fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_instruction_text(&dir.path().join("absent.pdf"), &PdfTextExtractor);
        assert!(matches!(result, Err(ExtractionError::DocumentNotFound(_))));
    }

    #[test]
    fn unreadable_document_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.pdf");
        std::fs::write(&path, b"plain text, not a pdf").unwrap();

        let result = load_instruction_text(&path, &PdfTextExtractor);
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }
}
