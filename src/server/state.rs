// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Shared application state

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::PipelineResult;
use crate::pipeline::Pipeline;

/// Shared across all requests; the pipeline holds the recognizer loaded at
/// startup
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Pipeline,
}

impl AppState {
    pub fn new(config: AppConfig, pipeline: Pipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Build the pipeline described by `config`
    pub fn from_config(config: AppConfig) -> PipelineResult<Self> {
        let pipeline = Pipeline::from_config(&config)?;
        Ok(Self::new(config, pipeline))
    }
}
