// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Recognizer engines: the seam between the detector adapter and whatever
// finds entity spans in text

use serde::Serialize;
use thiserror::Error;

use super::config::{DetectionConfig, EntityKind};
use super::patterns::{compile_patterns, CompiledPatterns};
use crate::error::{PipelineError, PipelineResult};

/// A detected region of the normalized text (byte offsets, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DetectionSpan {
    pub start: usize,
    pub end: usize,
    pub kind: EntityKind,
}

/// Failure raised inside a recognizer engine
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Entity recognition engine.
///
/// Engines are loaded once and shared read-only between requests, so they
/// must be `Send + Sync` and hold no per-call state.
pub trait Recognizer: Send + Sync {
    /// Find spans of the requested kinds. Order and overlap are unconstrained.
    fn analyze(&self, text: &str, kinds: &[EntityKind]) -> Result<Vec<DetectionSpan>, EngineError>;

    fn name(&self) -> &str;
}

/// Pattern-table recognizer backed by a `RegexSet` prefilter
#[derive(Debug, Clone)]
pub struct RegexRecognizer {
    patterns: CompiledPatterns,
}

impl RegexRecognizer {
    pub fn new(config: &DetectionConfig) -> PipelineResult<Self> {
        let patterns = compile_patterns(config).map_err(PipelineError::Config)?;
        Ok(Self { patterns })
    }

    /// Check if a literal is allow-listed
    fn is_allowed(&self, literal: &str) -> bool {
        self.patterns
            .allow_list
            .iter()
            .any(|pattern| pattern.is_match(literal))
    }
}

impl Recognizer for RegexRecognizer {
    fn analyze(&self, text: &str, kinds: &[EntityKind]) -> Result<Vec<DetectionSpan>, EngineError> {
        let mut spans = Vec::new();

        // RegexSet tells us which patterns can match at all
        let matches = self.patterns.regex_set.matches(text);

        for pattern_idx in matches.iter() {
            let pattern = &self.patterns.patterns[pattern_idx];
            if !kinds.contains(&pattern.kind) {
                continue;
            }

            for capture in pattern.regex.captures_iter(text) {
                // Labelled patterns report only the value group
                let Some(mat) = capture.get(1).or_else(|| capture.get(0)) else {
                    continue;
                };
                if mat.is_empty() {
                    continue;
                }

                let literal = mat.as_str();
                if let Some(validate) = pattern.validator {
                    if !validate(literal) {
                        continue;
                    }
                }
                if self.is_allowed(literal) {
                    continue;
                }

                spans.push(DetectionSpan {
                    start: mat.start(),
                    end: mat.end(),
                    kind: pattern.kind,
                });
            }
        }

        Ok(spans)
    }

    fn name(&self) -> &str {
        "regex"
    }
}
