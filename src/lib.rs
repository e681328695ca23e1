// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Document PII detection, operator review and masking
//
// Upload flow: normalize -> detect -> reconcile -> persist.
// Mask flow: load normalized text -> apply operator edits -> persist.

//! # pii_masker
//!
//! Finds personally identifiable information in `.txt`, `.docx` and `.pdf`
//! documents, hands a literal → kind list to an operator for review, and
//! writes a masked plain-text copy using the operator's edits.
//!
//! ```rust,no_run
//! use pii_masker::pipeline::Pipeline;
//! use pii_masker::config::AppConfig;
//! use pii_masker::pii_filter::{suggest_edits, MaskingConfig, ReplacementAction};
//!
//! let pipeline = Pipeline::from_config(&AppConfig::default())?;
//!
//! let detected = pipeline.run_detect("note.txt", b"Contact John Smith at john@example.com")?;
//! let edits = suggest_edits(&detected.pii_list, ReplacementAction::Mask, &MaskingConfig::default());
//! let masked = pipeline.run_mask(detected.reference.as_str(), &edits)?;
//!
//! assert_eq!(masked.masked_text, "Contact [Masked] at [Masked]");
//! # Ok::<(), pii_masker::error::PipelineError>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod pii_filter;
pub mod pipeline;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "python")]
mod python;

pub use error::{ErrorDescriptor, ErrorKind, PipelineError, PipelineResult};
pub use pipeline::{DetectOutcome, MaskOutcome, Pipeline};
