use super::types::{PageExtraction, PdfExtractor};
use super::ExtractionError;

/// PDF text extractor using the pdf-extract crate.
/// Reads the embedded text layer only; scanned pages yield empty text.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

        let pages = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageExtraction {
                page_number: i + 1,
                text,
            })
            .collect();

        Ok(pages)
    }
}


#[cfg(test)]
mod tests {
    use super::test_pdf::make_test_pdf;
    use super::*;

    #[test]
    fn extract_text_from_digital_pdf() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["Transitions of Care"]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert!(
            pages[0].text.contains("Transitions") || pages[0].text.contains("Care"),
            "unexpected page text: {:?}",
            pages[0].text
        );
    }

    #[test]
    fn pages_come_back_in_order() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["Alpha", "Bravo", "Charlie"]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();

        let numbers: Vec<_> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(pages[0].text.contains("Alpha"));
        assert!(pages[2].text.contains("Charlie"));
    }

    #[test]
    fn one_entry_per_page() {
        let extractor = PdfTextExtractor;
        let pdf_bytes = make_test_pdf(&["one", "two"]);
        let pages = extractor.extract_text(&pdf_bytes).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let extractor = PdfTextExtractor;
        let result = extractor.extract_text(b"not a pdf");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }
}
