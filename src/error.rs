// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error taxonomy shared by every pipeline stage

use serde::{Deserialize, Serialize};

use crate::document::DocumentFormat;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors produced by the detect / mask pipeline.
///
/// Every variant is terminal for the request that raised it. Nothing is
/// retried and no partial result is returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {format} document: {reason}")]
    Decode {
        format: DocumentFormat,
        reason: String,
    },

    #[error("Detection engine error: {0}")]
    DetectionEngine(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid reference: {0:?}")]
    InvalidReference(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mask error: {0}")]
    Mask(String),
}

/// Stable, machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedFormat,
    DecodeError,
    DetectionEngineError,
    NotFound,
    InvalidReference,
    StorageError,
    ConfigError,
    MaskError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorKind::DecodeError => "DECODE_ERROR",
            ErrorKind::DetectionEngineError => "DETECTION_ENGINE_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidReference => "INVALID_REFERENCE",
            ErrorKind::StorageError => "STORAGE_ERROR",
            ErrorKind::ConfigError => "CONFIG_ERROR",
            ErrorKind::MaskError => "MASK_ERROR",
        }
    }
}

/// Structured error handed back to callers: kind + human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub(crate) fn decode(format: DocumentFormat, reason: impl ToString) -> Self {
        PipelineError::Decode {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            PipelineError::Decode { .. } => ErrorKind::DecodeError,
            PipelineError::DetectionEngine(_) => ErrorKind::DetectionEngineError,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::InvalidReference(_) => ErrorKind::InvalidReference,
            PipelineError::Storage(_) => ErrorKind::StorageError,
            PipelineError::Config(_) => ErrorKind::ConfigError,
            PipelineError::Mask(_) => ErrorKind::MaskError,
        }
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
