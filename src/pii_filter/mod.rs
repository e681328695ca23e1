// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII detection, reconciliation and masking
//
// - RegexSet prefilter over a per-kind pattern table
// - Insertion-ordered literal mappings
// - Copy-on-write masking that borrows the input when nothing changes

pub mod config;
pub mod detector;
pub mod mapping;
pub mod masking;
pub mod patterns;
pub mod recognizer;
pub mod reconcile;

pub use config::{
    CollisionPolicy, CustomPattern, DetectionConfig, EntityKind, MaskMode, MaskingConfig,
    ReplacementAction, ENTITY_CATALOG_VERSION,
};
pub use detector::EntityDetector;
pub use mapping::{EditMapping, InsertionMap, PiiMapping};
pub use masking::{apply_mask, replacement_for, suggest_edits};
pub use recognizer::{DetectionSpan, EngineError, Recognizer, RegexRecognizer};
pub use reconcile::reconcile;
