// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Format normalizer: turns a supported document into one flat text string

mod docx;
mod pdf;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Separator placed between paragraphs (DOCX) and after every page (PDF)
pub const SEPARATOR: &str = "\n";

/// Document formats the normalizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    WordProcessor,
    Pdf,
}

impl DocumentFormat {
    /// Infer the format from a file name extension (`.txt`, `.docx`, `.pdf`).
    ///
    /// Matching is ASCII case-insensitive. Anything else is `UnsupportedFormat`.
    pub fn from_file_name(file_name: &str) -> PipelineResult<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentFormat::PlainText),
            "docx" => Ok(DocumentFormat::WordProcessor),
            "pdf" => Ok(DocumentFormat::Pdf),
            _ => Err(PipelineError::UnsupportedFormat(file_name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "txt",
            DocumentFormat::WordProcessor => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw document bytes plus their declared format. Lives for one request.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub bytes: &'a [u8],
    pub format: DocumentFormat,
}

impl<'a> Document<'a> {
    pub fn new(bytes: &'a [u8], format: DocumentFormat) -> Self {
        Self { bytes, format }
    }

    pub fn from_file_name(file_name: &str, bytes: &'a [u8]) -> PipelineResult<Self> {
        Ok(Self::new(bytes, DocumentFormat::from_file_name(file_name)?))
    }
}

/// Extract the document's text.
///
/// - plain text: the bytes decoded as UTF-8, verbatim
/// - word processor: paragraph texts joined with `\n`
/// - pdf: every page's text followed by `\n`, last page included
pub fn normalize(document: &Document<'_>) -> PipelineResult<String> {
    let text = match document.format {
        DocumentFormat::PlainText => std::str::from_utf8(document.bytes)
            .map(str::to_owned)
            .map_err(|e| PipelineError::decode(DocumentFormat::PlainText, e))?,
        DocumentFormat::WordProcessor => docx::extract_paragraphs(document.bytes)?.join(SEPARATOR),
        DocumentFormat::Pdf => pdf::extract_pages(document.bytes)?
            .into_iter()
            .fold(String::new(), |mut text, page| {
                text.push_str(&page);
                text.push_str(SEPARATOR);
                text
            }),
    };

    debug!(
        format = %document.format,
        input_bytes = document.bytes.len(),
        text_bytes = text.len(),
        "Normalized document"
    );

    Ok(text)
}
