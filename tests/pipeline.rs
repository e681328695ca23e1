// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// End-to-end pipeline scenarios

mod common;

use pii_masker::config::AppConfig;
use pii_masker::pii_filter::{
    suggest_edits, CollisionPolicy, CustomPattern, EditMapping, EntityKind, MaskMode, MaskingConfig,
    ReplacementAction,
};
use pii_masker::{ErrorKind, PipelineError};

use common::{docx_with_paragraphs, fs_pipeline, memory_pipeline, pdf_with_pages};

fn edits(pairs: &[(&str, &str)]) -> EditMapping {
    pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

#[test]
fn test_plain_text_person_and_email() {
    let pipeline = memory_pipeline(&[EntityKind::Person, EntityKind::EmailAddress]);
    let outcome = pipeline
        .run_detect("contact.txt", b"Contact John Smith at john@example.com")
        .unwrap();

    assert_eq!(
        serde_json::to_value(&outcome.pii_list).unwrap(),
        serde_json::json!({"John Smith": "PERSON", "john@example.com": "EMAIL_ADDRESS"})
    );
}

#[test]
fn test_csv_is_unsupported() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let err = pipeline.run_detect("customers.csv", b"a,b,c").unwrap_err();

    assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn test_mask_without_prior_detect_is_not_found() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let err = pipeline
        .run_mask("never_uploaded.txt", &edits(&[("a", "b")]))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_empty_document_yields_empty_mapping() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let outcome = pipeline.run_detect("empty.txt", b"").unwrap();

    assert!(outcome.pii_list.is_empty());
    assert!(pipeline.retrieve(outcome.reference.as_str()).unwrap().is_empty());
}

#[test]
fn test_sequential_mask_compounds() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let detected = pipeline.run_detect("ab.txt", b"A B").unwrap();

    let masked = pipeline
        .run_mask(detected.reference.as_str(), &edits(&[("A", "B"), ("B", "C")]))
        .unwrap();
    assert_eq!(masked.masked_text, "C C");
}

#[test]
fn test_single_pass_mask_does_not_compound() {
    let pipeline = memory_pipeline(&EntityKind::ALL).with_mask_mode(MaskMode::SinglePass);
    let detected = pipeline.run_detect("ab.txt", b"A B").unwrap();

    let masked = pipeline
        .run_mask(detected.reference.as_str(), &edits(&[("A", "B"), ("B", "C")]))
        .unwrap();
    assert_eq!(masked.masked_text, "B C");
}

#[test]
fn test_docx_review_and_mask() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let bytes = docx_with_paragraphs(&[
        "Dear John Smith,",
        "Your SSN 123-45-6789 is on file.",
        "Reach us at help@bank.example.com.",
    ]);

    let detected = pipeline.run_detect("Letter.DOCX", &bytes).unwrap();
    assert_eq!(detected.pii_list.get("John Smith"), Some(&EntityKind::Person));
    assert_eq!(detected.pii_list.get("123-45-6789"), Some(&EntityKind::Ssn));
    assert_eq!(
        detected.pii_list.get("help@bank.example.com"),
        Some(&EntityKind::EmailAddress)
    );

    let reviewed = suggest_edits(
        &detected.pii_list,
        ReplacementAction::Mask,
        &MaskingConfig::default(),
    );
    let masked = pipeline
        .run_mask(detected.reference.as_str(), &reviewed)
        .unwrap();

    assert_eq!(
        masked.masked_text,
        "Dear [Masked],\nYour SSN [Masked] is on file.\nReach us at [Masked]."
    );
    assert!(masked.reference.as_str().ends_with("_Letter_masked.txt"));
}

#[test]
fn test_pdf_pages_detected() {
    let pipeline = memory_pipeline(&[EntityKind::EmailAddress, EntityKind::Ssn]);
    let bytes = pdf_with_pages(&["Contact alice@example.org", "SSN 987-65-4321"]);

    let detected = pipeline.run_detect("scan.pdf", &bytes).unwrap();
    assert_eq!(
        detected.pii_list.get("alice@example.org"),
        Some(&EntityKind::EmailAddress)
    );
    assert_eq!(detected.pii_list.get("987-65-4321"), Some(&EntityKind::Ssn));
}

#[test]
fn test_corrupt_pdf_is_decode_error() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let err = pipeline.run_detect("broken.pdf", b"%PDF-1.7 nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);
}

#[test]
fn test_invalid_utf8_text_is_decode_error() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let err = pipeline.run_detect("latin1.txt", &[0x63, 0x61, 0x66, 0xe9]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);
}

#[test]
fn test_collision_policy_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.detection.entities = vec![EntityKind::EmailAddress, EntityKind::Id];
    config.detection.custom_patterns = vec![CustomPattern {
        kind: EntityKind::Id,
        pattern: r"\buser\d+@example\.com\b".to_string(),
        description: "Account login".to_string(),
        case_insensitive: false,
        enabled: true,
    }];
    config.storage.unique_names = false;

    // Built-in email pattern reports first, the custom login pattern second
    let last = fs_pipeline(dir.path(), config.clone())
        .run_detect("login.txt", b"Login user42@example.com")
        .unwrap();
    assert_eq!(last.pii_list.get("user42@example.com"), Some(&EntityKind::Id));
    assert_eq!(last.reference.as_str(), "login.txt");

    config.detection.collision_policy = CollisionPolicy::FirstWriteWins;
    let first = fs_pipeline(dir.path(), config)
        .run_detect("login.txt", b"Login user42@example.com")
        .unwrap();
    assert_eq!(
        first.pii_list.get("user42@example.com"),
        Some(&EntityKind::EmailAddress)
    );
    assert_eq!(first.pii_list.len(), 1);
}

#[test]
fn test_fs_store_layout_and_download() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = fs_pipeline(dir.path(), AppConfig::default());

    let detected = pipeline
        .run_detect("memo.txt", b"Call 555-123-4567 today")
        .unwrap();
    let reference = detected.reference.as_str();
    assert!(dir.path().join("artifacts").join(reference).exists());
    assert!(dir
        .path()
        .join("normalized")
        .join(format!("{reference}.txt"))
        .exists());

    let masked = pipeline
        .run_mask(reference, &edits(&[("555-123-4567", "[PHONE]")]))
        .unwrap();
    assert_eq!(
        pipeline.retrieve(masked.reference.as_str()).unwrap(),
        b"Call [PHONE] today"
    );
}

#[test]
fn test_same_file_name_twice_gets_distinct_references() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    let first = pipeline.run_detect("cv.txt", b"first").unwrap();
    let second = pipeline.run_detect("cv.txt", b"second").unwrap();

    assert_ne!(first.reference, second.reference);
    assert_eq!(pipeline.retrieve(first.reference.as_str()).unwrap(), b"first");
    assert_eq!(pipeline.retrieve(second.reference.as_str()).unwrap(), b"second");
}

#[test]
fn test_traversal_reference_rejected() {
    let pipeline = memory_pipeline(&EntityKind::ALL);
    for reference in ["../secret.txt", "/etc/passwd", "a/../../b.txt"] {
        assert_eq!(
            pipeline.retrieve(reference).unwrap_err().kind(),
            ErrorKind::InvalidReference
        );
    }
}
