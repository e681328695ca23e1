// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PDF page text extraction via lopdf

use lopdf::Document;
use tracing::warn;

use super::DocumentFormat;
use crate::error::{PipelineError, PipelineResult};

/// Text of every page, in page order.
///
/// A page whose content cannot be decoded contributes an empty string; only a
/// document that cannot be loaded at all is an error.
pub(crate) fn extract_pages(bytes: &[u8]) -> PipelineResult<Vec<String>> {
    let document =
        Document::load_mem(bytes).map_err(|e| PipelineError::decode(DocumentFormat::Pdf, e))?;

    let pages = document
        .get_pages()
        .into_keys()
        .map(|page_number| match document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(err) => {
                warn!(page = page_number, error = %err, "Page yielded no extractable text");
                String::new()
            }
        })
        .collect();

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::fixtures::pdf_with_pages;

    #[test]
    fn test_one_entry_per_page() {
        let bytes = pdf_with_pages(&[Some("First"), Some("Second")]);
        let pages = extract_pages(&bytes).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("First"));
        assert!(pages[1].contains("Second"));
    }

    #[test]
    fn test_blank_page_is_empty_not_error() {
        let bytes = pdf_with_pages(&[None]);
        let pages = extract_pages(&bytes).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].trim().is_empty());
    }

    #[test]
    fn test_invalid_pdf() {
        let err = extract_pages(b"%PDF-1.4 garbage").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Decode {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
    }
}
