// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Application configuration: detection, masking, storage and server sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pii_filter::config::{DetectionConfig, MaskingConfig};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub masking: MaskingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Where artifacts are persisted
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding originals, cached text and masked outputs
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Prefix upload names with a random token
    #[serde(default = "default_true")]
    pub unique_names: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            unique_names: default_true(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum upload size in MB
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Enable CORS (any origin)
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level / `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_addr, self.port).parse()
    }

    /// Get max upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(feature = "server")]
impl AppConfig {
    /// Load configuration from an optional `pii-masker.{toml,yaml,json}` file,
    /// overridden by `PII_MASKER__SECTION__KEY` environment variables
    pub fn load() -> anyhow::Result<Self> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("pii-masker").required(false))
            .add_source(
                ::config::Environment::with_prefix("PII_MASKER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("detection.entities")
                    .with_list_parse_key("detection.allow_list")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_mb() -> usize {
    25
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
