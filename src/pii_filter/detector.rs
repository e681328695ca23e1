// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entity detector adapter: runs the shared recognizer over normalized text
// and checks every span it returns

use std::sync::Arc;
use tracing::{debug, warn};

use super::config::{DetectionConfig, EntityKind};
use super::recognizer::{DetectionSpan, RegexRecognizer, Recognizer};
use crate::error::{PipelineError, PipelineResult};

/// Detector bound to one recognizer and the configured entity kinds
#[derive(Clone)]
pub struct EntityDetector {
    recognizer: Arc<dyn Recognizer>,
    kinds: Vec<EntityKind>,
}

impl std::fmt::Debug for EntityDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDetector")
            .field("recognizer", &self.recognizer.name())
            .field("kinds", &self.kinds)
            .finish()
    }
}

impl EntityDetector {
    pub fn new(recognizer: Arc<dyn Recognizer>, kinds: Vec<EntityKind>) -> Self {
        Self { recognizer, kinds }
    }

    /// Detector over the built-in regex recognizer
    pub fn from_config(config: &DetectionConfig) -> PipelineResult<Self> {
        let recognizer = RegexRecognizer::new(config)?;
        Ok(Self::new(Arc::new(recognizer), config.entities.clone()))
    }

    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    /// Detect every configured kind
    pub fn detect(&self, text: &str) -> PipelineResult<Vec<DetectionSpan>> {
        self.detect_kinds(text, &self.kinds)
    }

    /// Detect a subset of the configured kinds; kinds outside the configured
    /// set are ignored
    pub fn detect_kinds(
        &self,
        text: &str,
        requested: &[EntityKind],
    ) -> PipelineResult<Vec<DetectionSpan>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let kinds: Vec<EntityKind> = self
            .kinds
            .iter()
            .copied()
            .filter(|kind| requested.contains(kind))
            .collect();
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let spans = self
            .recognizer
            .analyze(text, &kinds)
            .map_err(|e| PipelineError::DetectionEngine(e.to_string()))?;

        for span in &spans {
            if !span_is_valid(text, span) {
                warn!(
                    engine = self.recognizer.name(),
                    start = span.start,
                    end = span.end,
                    text_len = text.len(),
                    "Recognizer returned an out-of-range span"
                );
                return Err(PipelineError::DetectionEngine(format!(
                    "span {}..{} is not a valid range of a {}-byte text",
                    span.start,
                    span.end,
                    text.len()
                )));
            }
        }

        debug!(
            engine = self.recognizer.name(),
            kinds = kinds.len(),
            spans = spans.len(),
            "Detection finished"
        );
        Ok(spans)
    }
}

fn span_is_valid(text: &str, span: &DetectionSpan) -> bool {
    span.start < span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
}
