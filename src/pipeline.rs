// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Pipeline coordinator: Normalizer -> Detector -> Reconciler on upload,
// Mask Applier on request, plus artifact retrieval

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::document::{normalize, Document, DocumentFormat};
use crate::error::{PipelineError, PipelineResult};
use crate::pii_filter::config::{CollisionPolicy, DetectionConfig, EntityKind, MaskMode};
use crate::pii_filter::detector::EntityDetector;
use crate::pii_filter::mapping::{EditMapping, PiiMapping};
use crate::pii_filter::masking::apply_mask;
use crate::pii_filter::reconcile::reconcile;
use crate::store::{ArtifactName, ArtifactStore, FsArtifactStore, Namespace};

/// Result of the detect phase
#[derive(Debug, Clone, Serialize)]
pub struct DetectOutcome {
    pub pii_list: PiiMapping,
    pub reference: ArtifactName,
}

/// Result of the mask phase
#[derive(Debug, Clone, Serialize)]
pub struct MaskOutcome {
    pub reference: ArtifactName,
    pub masked_text: String,
}

/// Stateless coordinator over a shared detector and artifact store.
///
/// Cloning is cheap; every clone shares the same recognizer and store.
#[derive(Clone)]
pub struct Pipeline {
    detector: EntityDetector,
    store: Arc<dyn ArtifactStore>,
    collision_policy: CollisionPolicy,
    mask_mode: MaskMode,
    unique_names: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("detector", &self.detector)
            .field("collision_policy", &self.collision_policy)
            .field("mask_mode", &self.mask_mode)
            .field("unique_names", &self.unique_names)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(detector: EntityDetector, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            detector,
            store,
            collision_policy: CollisionPolicy::default(),
            mask_mode: MaskMode::default(),
            unique_names: true,
        }
    }

    /// Pipeline over the regex recognizer and a directory store, as configured
    pub fn from_config(config: &AppConfig) -> PipelineResult<Self> {
        let store = FsArtifactStore::new(&config.storage.root)?;
        info!(root = %store.root().display(), "Artifact store opened");
        Self::from_config_with_store(config, Arc::new(store))
    }

    /// Pipeline as configured, over a caller-provided store
    pub fn from_config_with_store(
        config: &AppConfig,
        store: Arc<dyn ArtifactStore>,
    ) -> PipelineResult<Self> {
        let detector = EntityDetector::from_config(&config.detection)?;

        info!(
            kinds = config.detection.entities.len(),
            custom_patterns = config.detection.custom_patterns.len(),
            collision_policy = ?config.detection.collision_policy,
            mode = ?config.masking.mode,
            "Pipeline ready"
        );

        Ok(Self::new(detector, store)
            .with_collision_policy(config.detection.collision_policy)
            .with_mask_mode(config.masking.mode)
            .with_unique_names(config.storage.unique_names))
    }

    /// Pipeline with default detection settings over the given store
    pub fn with_store(store: Arc<dyn ArtifactStore>) -> PipelineResult<Self> {
        let detector = EntityDetector::from_config(&DetectionConfig::default())?;
        Ok(Self::new(detector, store))
    }

    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    pub fn with_mask_mode(mut self, mode: MaskMode) -> Self {
        self.mask_mode = mode;
        self
    }

    pub fn with_unique_names(mut self, unique: bool) -> Self {
        self.unique_names = unique;
        self
    }

    pub fn detector(&self) -> &EntityDetector {
        &self.detector
    }

    /// Detect every configured kind in an uploaded document
    pub fn run_detect(&self, file_name: &str, bytes: &[u8]) -> PipelineResult<DetectOutcome> {
        self.run_detect_with(file_name, bytes, None)
    }

    /// Detect, optionally restricted to `kinds`.
    ///
    /// The original bytes and the normalized text are persisted only after
    /// every stage succeeded.
    #[instrument(skip(self, bytes, kinds), fields(size = bytes.len()))]
    pub fn run_detect_with(
        &self,
        file_name: &str,
        bytes: &[u8],
        kinds: Option<&[EntityKind]>,
    ) -> PipelineResult<DetectOutcome> {
        let document = Document::from_file_name(file_name, bytes)?;
        let reference = ArtifactName::for_upload(file_name, self.unique_names)?;

        let text = normalize(&document)?;
        let spans = match kinds {
            Some(kinds) => self.detector.detect_kinds(&text, kinds)?,
            None => self.detector.detect(&text)?,
        };
        let pii_list = reconcile(&text, &spans, self.collision_policy);

        self.store.put(Namespace::Artifact, &reference, bytes)?;
        self.store
            .put(Namespace::NormalizedText, &reference, text.as_bytes())?;

        info!(
            reference = %reference,
            format = %document.format,
            spans = spans.len(),
            literals = pii_list.len(),
            "Document analyzed"
        );

        Ok(DetectOutcome {
            pii_list,
            reference,
        })
    }

    /// Apply an edit mapping to the text of a previously analyzed document
    /// and persist it as `<stem>_masked.txt`
    #[instrument(skip(self, edits), fields(edits = edits.len()))]
    pub fn run_mask(&self, reference: &str, edits: &EditMapping) -> PipelineResult<MaskOutcome> {
        let name = ArtifactName::parse(reference)?;
        let text = self.load_text(&name)?;

        let masked_text = apply_mask(&text, edits, self.mask_mode)?.into_owned();
        let masked_name = name.masked();
        self.store
            .put(Namespace::Artifact, &masked_name, masked_text.as_bytes())?;

        info!(reference = %name, masked = %masked_name, "Mask applied");

        Ok(MaskOutcome {
            reference: masked_name,
            masked_text,
        })
    }

    /// Raw bytes of a persisted artifact
    pub fn retrieve(&self, reference: &str) -> PipelineResult<Vec<u8>> {
        let name = ArtifactName::parse(reference)?;
        self.store
            .get(Namespace::Artifact, &name)?
            .ok_or_else(|| PipelineError::NotFound(name.to_string()))
    }

    /// Cached normalized text, or a fresh normalization of the stored original
    fn load_text(&self, name: &ArtifactName) -> PipelineResult<String> {
        if let Some(cached) = self.store.get(Namespace::NormalizedText, name)? {
            match String::from_utf8(cached) {
                Ok(text) => return Ok(text),
                Err(_) => warn!(reference = %name, "Cached text is not UTF-8, re-normalizing"),
            }
        }

        let original = self
            .store
            .get(Namespace::Artifact, name)?
            .ok_or_else(|| PipelineError::NotFound(name.to_string()))?;
        let format = DocumentFormat::from_file_name(name.as_str())?;
        debug!(reference = %name, %format, "Normalized text not cached");

        normalize(&Document::new(&original, format))
    }
}
