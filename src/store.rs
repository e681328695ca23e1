// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Artifact store: persisted originals, cached normalized text, masked output

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};

const MAX_NAME_LEN: usize = 200;
const MASKED_SUFFIX: &str = "_masked.txt";

/// Logical artifact name.
///
/// Only ASCII letters, digits, `.`, `_` and `-` are allowed; the name may
/// not start with a dot or contain `..`. A valid name can never address
/// anything outside the store directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Validate a caller-supplied reference
    pub fn parse(reference: &str) -> PipelineResult<Self> {
        let valid = !reference.is_empty()
            && reference.len() <= MAX_NAME_LEN
            && !reference.starts_with('.')
            && !reference.contains("..")
            && reference
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

        if valid {
            Ok(Self(reference.to_string()))
        } else {
            Err(PipelineError::InvalidReference(reference.to_string()))
        }
    }

    /// Name for a freshly uploaded file.
    ///
    /// Directory components are dropped and disallowed characters become
    /// `_`. With `unique` set, an 8-hex random token is prefixed so two
    /// uploads of the same file name never collide.
    pub fn for_upload(file_name: &str, unique: bool) -> PipelineResult<Self> {
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name);
        let mut sanitized: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        while sanitized.contains("..") {
            sanitized = sanitized.replace("..", ".");
        }
        let sanitized = sanitized.trim_start_matches('.');

        let name = if unique {
            let token = Uuid::new_v4().simple().to_string();
            format!("{}_{}", &token[..8], sanitized)
        } else {
            sanitized.to_string()
        };

        // Keep the tail so the extension survives truncation
        let name = if name.len() > MAX_NAME_LEN {
            name[name.len() - MAX_NAME_LEN..].trim_start_matches('.').to_string()
        } else {
            name
        };

        Self::parse(&name).map_err(|_| PipelineError::InvalidReference(file_name.to_string()))
    }

    /// Name of the masked output derived from this reference: `<stem>_masked.txt`
    pub fn masked(&self) -> Self {
        let stem = match self.0.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => self.0.as_str(),
        };
        let keep = MAX_NAME_LEN.saturating_sub(MASKED_SUFFIX.len()).min(stem.len());
        Self(format!("{}{}", &stem[..keep], MASKED_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ArtifactName> for String {
    fn from(name: ArtifactName) -> Self {
        name.0
    }
}

/// What a stored blob is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Uploaded originals and masked outputs; what `retrieve` serves
    Artifact,
    /// Normalized text cached next to an original
    NormalizedText,
}

/// Blob storage keyed by namespace and artifact name
pub trait ArtifactStore: Send + Sync {
    fn put(&self, namespace: Namespace, name: &ArtifactName, bytes: &[u8]) -> io::Result<()>;

    /// `Ok(None)` when nothing is stored under the name
    fn get(&self, namespace: Namespace, name: &ArtifactName) -> io::Result<Option<Vec<u8>>>;
}

/// Directory-backed store.
///
/// Layout: `<root>/artifacts/<name>` and `<root>/normalized/<name>.txt`.
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("artifacts"))?;
        fs::create_dir_all(root.join("normalized"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, namespace: Namespace, name: &ArtifactName) -> PathBuf {
        match namespace {
            Namespace::Artifact => self.root.join("artifacts").join(name.as_str()),
            Namespace::NormalizedText => self
                .root
                .join("normalized")
                .join(format!("{}.txt", name.as_str())),
        }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, namespace: Namespace, name: &ArtifactName, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(namespace, name);
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::other("artifact path has no parent"))?;
        let tmp = dir.join(format!(".{}.{}.tmp", name.as_str(), Uuid::new_v4().simple()));

        let result = (|| {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();

        match result {
            Ok(()) => debug!(name = %name, ?namespace, bytes = bytes.len(), "Stored artifact"),
            Err(_) => {
                let _ = fs::remove_file(&tmp);
            }
        }
        result
    }

    fn get(&self, namespace: Namespace, name: &ArtifactName) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(namespace, name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// In-process store, used by tests and the Python binding's ephemeral mode
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RwLock<HashMap<(Namespace, ArtifactName), Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put(&self, namespace: Namespace, name: &ArtifactName, bytes: &[u8]) -> io::Result<()> {
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((namespace, name.clone()), bytes.to_vec());
        Ok(())
    }

    fn get(&self, namespace: Namespace, name: &ArtifactName) -> io::Result<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace, name.clone()))
            .cloned())
    }
}
