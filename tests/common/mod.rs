// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use pii_masker::config::AppConfig;
use pii_masker::pii_filter::{DetectionConfig, EntityKind};
use pii_masker::pipeline::Pipeline;
use pii_masker::store::{FsArtifactStore, MemoryArtifactStore};

/// Pipeline over an in-memory store, detecting only `kinds`
pub fn memory_pipeline(kinds: &[EntityKind]) -> Pipeline {
    let config = AppConfig {
        detection: DetectionConfig::for_entities(kinds),
        ..Default::default()
    };
    Pipeline::from_config_with_store(&config, Arc::new(MemoryArtifactStore::new())).unwrap()
}

/// Pipeline over a directory store rooted in `dir`
pub fn fs_pipeline(dir: &std::path::Path, config: AppConfig) -> Pipeline {
    let store = FsArtifactStore::new(dir).unwrap();
    Pipeline::from_config_with_store(&config, Arc::new(store)).unwrap()
}

pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}</w:body></w:document>"
        ),
        body
    );

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

/// One page per entry, each showing its text with a standard font
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
