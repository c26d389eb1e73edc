//! PDF Extraction Module
//!
//! Extracts per-page text from the source document for indexing.

use std::path::Path;

use lopdf::Document;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to load PDF: {0}")]
    LoadError(String),

    #[error("Failed to extract text: {0}")]
    ExtractionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Extract the full text of a PDF, page by page.
///
/// Returns `(page_number, text)` pairs in page order. Any load or extraction
/// error is propagated; first-run indexing treats it as fatal.
pub fn extract_text_with_pages(path: &Path) -> Result<Vec<(u32, String)>> {
    let doc = Document::load(path).map_err(|e| PdfError::LoadError(e.to_string()))?;

    let mut pages = Vec::new();
    for (page_num, _page_id) in doc.get_pages() {
        let text = doc
            .extract_text(&[page_num])
            .map_err(|e| PdfError::ExtractionError(e.to_string()))?;
        pages.push((page_num, text));
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;

    /// Creates a minimal valid PDF for testing
    fn create_minimal_pdf() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();

        let pdf_content = b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>
endobj
4 0 obj
<< /Length 44 >>
stream
BT /F1 12 Tf 100 700 Td (Hello World) Tj ET
endstream
endobj
5 0 obj
<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>
endobj
xref
0 6
0000000000 65535 f
0000000009 00000 n
0000000058 00000 n
0000000115 00000 n
0000000266 00000 n
0000000359 00000 n
trailer
<< /Size 6 /Root 1 0 R >>
startxref
435
%%EOF";

        file.write_all(pdf_content).unwrap();
        file.flush().unwrap();
        file
    }

    fn create_malformed_pdf() -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(b"This is not a valid PDF file").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_extract_from_minimal_pdf() {
        let pdf_file = create_minimal_pdf();
        let result = extract_text_with_pages(pdf_file.path());

        // Minimal hand-written PDFs may or may not extract cleanly depending
        // on lopdf's tolerance; the contract is no panic and page numbering
        // starting at 1 when extraction succeeds.
        if let Ok(pages) = result {
            assert!(!pages.is_empty());
            for (page_num, _text) in &pages {
                assert!(*page_num >= 1);
            }
        }
    }

    #[test]
    fn test_nonexistent_file_errors() {
        let path = PathBuf::from("/nonexistent/path/to/file.pdf");
        let result = extract_text_with_pages(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_pdf_errors() {
        let malformed = create_malformed_pdf();
        let result = extract_text_with_pages(malformed.path());

        assert!(result.is_err());
        match result.unwrap_err() {
            PdfError::LoadError(_) => (),
            e => panic!("Expected LoadError, got {:?}", e),
        }
    }

    #[test]
    fn test_error_display() {
        let error = PdfError::LoadError("test error".to_string());
        assert!(format!("{}", error).contains("test error"));
    }
}
