// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// DOCX paragraph extraction (word/document.xml inside the OOXML zip)

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::DocumentFormat;
use crate::error::{PipelineError, PipelineResult};

const DOCUMENT_PART: &str = "word/document.xml";

fn decode_error(reason: impl ToString) -> PipelineError {
    PipelineError::decode(DocumentFormat::WordProcessor, reason)
}

/// Ordered paragraph texts of the main document part
pub(crate) fn extract_paragraphs(bytes: &[u8]) -> PipelineResult<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(decode_error)?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| decode_error(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(decode_error)?;

    parse_paragraphs(&xml)
}

/// Paragraph being collected, with the number of `<w:r>` runs currently open
#[derive(Default)]
struct OpenParagraph {
    text: String,
    runs: usize,
}

/// Walk the WordprocessingML and collect the text of every `<w:p>`.
///
/// Only `<w:t>` runs count as text, so deleted revisions (`<w:delText>`) and
/// field codes stay out. Tabs and breaks count only inside a run; the
/// `<w:tab/>` stops of `<w:pPr><w:tabs>` are layout. Nested paragraphs (text
/// boxes) are emitted before the paragraph that contains them, and the
/// `mc:Fallback` copy of alternate content is skipped.
fn parse_paragraphs(xml: &str) -> PipelineResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(decode_error)?;

        if fallback_depth > 0 {
            match event {
                Event::Start(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth += 1,
                Event::End(e) if e.name().as_ref() == b"mc:Fallback" => fallback_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(OpenParagraph::default()),
                b"w:r" => {
                    if let Some(paragraph) = open.last_mut() {
                        paragraph.runs += 1;
                    }
                }
                b"w:t" => in_text = true,
                b"mc:Fallback" => fallback_depth = 1,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push_in_run(&mut open, "\t"),
                b"w:br" | b"w:cr" => push_in_run(&mut open, "\n"),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(decode_error)?;
                if let Some(paragraph) = open.last_mut() {
                    paragraph.text.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => {
                    if let Some(paragraph) = open.last_mut() {
                        paragraph.runs = paragraph.runs.saturating_sub(1);
                    }
                }
                b"w:p" => {
                    if let Some(paragraph) = open.pop() {
                        paragraphs.push(paragraph.text);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_in_run(open: &mut [OpenParagraph], text: &str) {
    if let Some(paragraph) = open.last_mut().filter(|p| p.runs > 0) {
        paragraph.text.push_str(text);
    }
}
