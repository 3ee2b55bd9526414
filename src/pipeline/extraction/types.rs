use super::ExtractionError;

/// Text pulled from one page of a paginated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    /// 1-based.
    pub page_number: usize,
    /// May be empty for pages with no text layer.
    pub text: String,
}

/// PDF text extraction abstraction
pub trait PdfExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<Vec<PageExtraction>, ExtractionError>;
}
