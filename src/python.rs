// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings: the pipeline as a Python class

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::pii_filter::config::{CustomPattern, EntityKind, MaskingConfig, ReplacementAction};
use crate::pii_filter::mapping::{EditMapping, PiiMapping};
use crate::pii_filter::masking::suggest_edits;
use crate::pipeline::Pipeline;
use crate::store::{ArtifactStore, MemoryArtifactStore};

create_exception!(pii_masker, PiiMaskerError, PyException);
create_exception!(pii_masker, UnsupportedFormatError, PiiMaskerError);
create_exception!(pii_masker, DecodeError, PiiMaskerError);
create_exception!(pii_masker, DetectionEngineError, PiiMaskerError);
create_exception!(pii_masker, NotFoundError, PiiMaskerError);
create_exception!(pii_masker, InvalidReferenceError, PiiMaskerError);

impl From<PipelineError> for PyErr {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::UnsupportedFormat(_) => UnsupportedFormatError::new_err(message),
            PipelineError::Decode { .. } => DecodeError::new_err(message),
            PipelineError::DetectionEngine(_) => DetectionEngineError::new_err(message),
            PipelineError::NotFound(_) => NotFoundError::new_err(message),
            PipelineError::InvalidReference(_) => InvalidReferenceError::new_err(message),
            PipelineError::Storage(_) | PipelineError::Config(_) | PipelineError::Mask(_) => {
                PiiMaskerError::new_err(message)
            }
        }
    }
}

fn parse_value<T: std::str::FromStr<Err = String>>(label: &str) -> PyResult<T> {
    label.parse().map_err(PyValueError::new_err)
}

/// Build the application config from a Python dict.
///
/// Keys: `entities`, `collision_policy`, `allow_list`, `custom_patterns`,
/// `mask_mode`, `default_action`, `mask_text`, `storage_root`,
/// `unique_names`. Without `storage_root` artifacts live in memory.
fn config_from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<(AppConfig, bool)> {
    let mut config = AppConfig::default();
    let mut on_disk = false;

    if let Some(value) = dict.get_item("entities")? {
        let labels: Vec<String> = value.extract()?;
        config.detection.entities = labels
            .iter()
            .map(|label| parse_value::<EntityKind>(label))
            .collect::<PyResult<_>>()?;
    }

    if let Some(value) = dict.get_item("collision_policy")? {
        let policy: String = value.extract()?;
        config.detection.collision_policy = parse_value(&policy)?;
    }

    if let Some(value) = dict.get_item("allow_list")? {
        config.detection.allow_list = value.extract()?;
    }

    if let Some(value) = dict.get_item("custom_patterns")? {
        let py_list = value.downcast::<PyList>()?;
        for item in py_list.iter() {
            let py_dict = item.downcast::<PyDict>()?;
            let kind: String = py_dict
                .get_item("kind")?
                .ok_or_else(|| PyValueError::new_err("Missing 'kind' field"))?
                .extract()?;
            let pattern: String = py_dict
                .get_item("pattern")?
                .ok_or_else(|| PyValueError::new_err("Missing 'pattern' field"))?
                .extract()?;
            let description: String = match py_dict.get_item("description")? {
                Some(val) => val.extract()?,
                None => String::new(),
            };
            let case_insensitive: bool = match py_dict.get_item("case_insensitive")? {
                Some(val) => val.extract()?,
                None => false,
            };
            let enabled: bool = match py_dict.get_item("enabled")? {
                Some(val) => val.extract()?,
                None => true,
            };

            config.detection.custom_patterns.push(CustomPattern {
                kind: parse_value(&kind)?,
                pattern,
                description,
                case_insensitive,
                enabled,
            });
        }
    }

    if let Some(value) = dict.get_item("mask_mode")? {
        let mode: String = value.extract()?;
        config.masking.mode = parse_value(&mode)?;
    }

    if let Some(value) = dict.get_item("default_action")? {
        let action: String = value.extract()?;
        config.masking.default_action = parse_value(&action)?;
    }

    if let Some(value) = dict.get_item("mask_text")? {
        config.masking.mask_text = value.extract()?;
    }

    if let Some(value) = dict.get_item("storage_root")? {
        let root: String = value.extract()?;
        config.storage.root = root.into();
        on_disk = true;
    }

    if let Some(value) = dict.get_item("unique_names")? {
        config.storage.unique_names = value.extract()?;
    }

    Ok((config, on_disk))
}

/// Detect / review / mask pipeline exposed to Python
///
/// # Example (Python)
/// ```python
/// from pii_masker import PiiMaskerRust
///
/// masker = PiiMaskerRust({"storage_root": "uploads"})
/// pii, ref = masker.detect("note.txt", b"Contact John Smith at john@example.com")
/// edits = masker.suggest(pii, "mask")
/// masked_ref = masker.mask(ref, edits)
/// print(masker.download(masked_ref))  # b"Contact [Masked] at [Masked]"
/// ```
#[pyclass]
pub struct PiiMaskerRust {
    pipeline: Pipeline,
    masking: MaskingConfig,
}

#[pymethods]
impl PiiMaskerRust {
    #[new]
    #[pyo3(signature = (config=None))]
    pub fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let (config, on_disk) = match config {
            Some(dict) => config_from_py_dict(dict)?,
            None => (AppConfig::default(), false),
        };

        let pipeline = if on_disk {
            Pipeline::from_config(&config)?
        } else {
            let store: Arc<dyn ArtifactStore> = Arc::new(MemoryArtifactStore::new());
            Pipeline::from_config_with_store(&config, store)?
        };

        Ok(Self {
            pipeline,
            masking: config.masking,
        })
    }

    /// Analyze a document; returns `(pii_list, reference)`
    pub fn detect(
        &self,
        py: Python<'_>,
        file_name: &str,
        data: &[u8],
    ) -> PyResult<(Py<PyDict>, String)> {
        let outcome = py.detach(|| self.pipeline.run_detect(file_name, data))?;

        let py_dict = PyDict::new(py);
        for (literal, kind) in outcome.pii_list.iter() {
            py_dict.set_item(literal, kind.as_str())?;
        }
        Ok((py_dict.unbind(), outcome.reference.to_string()))
    }

    /// Apply `{original: replacement}` edits; returns the masked reference
    pub fn mask(
        &self,
        py: Python<'_>,
        reference: &str,
        edits: &Bound<'_, PyDict>,
    ) -> PyResult<String> {
        let mut mapping = EditMapping::new();
        for (key, value) in edits.iter() {
            mapping.insert(key.extract::<String>()?, value.extract::<String>()?);
        }

        let outcome = py.detach(|| self.pipeline.run_mask(reference, &mapping))?;
        Ok(outcome.reference.to_string())
    }

    /// Raw bytes of a stored artifact
    pub fn download(&self, py: Python<'_>, reference: &str) -> PyResult<Py<PyBytes>> {
        let bytes = py.detach(|| self.pipeline.retrieve(reference))?;
        Ok(PyBytes::new(py, &bytes).unbind())
    }

    /// Propose `{literal: replacement}` edits for a PII list
    #[pyo3(signature = (pii_list, action=None))]
    pub fn suggest(
        &self,
        py: Python<'_>,
        pii_list: &Bound<'_, PyDict>,
        action: Option<&str>,
    ) -> PyResult<Py<PyDict>> {
        let mut mapping = PiiMapping::new();
        for (key, value) in pii_list.iter() {
            let kind: String = value.extract()?;
            mapping.insert(key.extract::<String>()?, parse_value::<EntityKind>(&kind)?);
        }

        let action = match action {
            Some(label) => parse_value::<ReplacementAction>(label)?,
            None => self.masking.default_action,
        };

        let py_dict = PyDict::new(py);
        for (literal, replacement) in suggest_edits(&mapping, action, &self.masking).iter() {
            py_dict.set_item(literal, replacement)?;
        }
        Ok(py_dict.unbind())
    }
}

/// Python module: pii_masker
#[pymodule]
fn pii_masker(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PiiMaskerRust>()?;

    let py = m.py();
    m.add("PiiMaskerError", py.get_type::<PiiMaskerError>())?;
    m.add("UnsupportedFormatError", py.get_type::<UnsupportedFormatError>())?;
    m.add("DecodeError", py.get_type::<DecodeError>())?;
    m.add("DetectionEngineError", py.get_type::<DetectionEngineError>())?;
    m.add("NotFoundError", py.get_type::<NotFoundError>())?;
    m.add("InvalidReferenceError", py.get_type::<InvalidReferenceError>())?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("ENTITY_CATALOG_VERSION", crate::pii_filter::ENTITY_CATALOG_VERSION)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::document::DocumentFormat;
    use crate::pii_filter::config::{CollisionPolicy, MaskMode};

    fn with_python<F: for<'py> FnOnce(Python<'py>) -> PyResult<()>>(f: F) {
        Python::initialize();
        Python::attach(|py| f(py)).unwrap();
    }

    #[test]
    fn test_config_from_dict() {
        with_python(|py| {
            let custom = PyDict::new(py);
            custom.set_item("kind", "ID")?;
            custom.set_item("pattern", r"\bEMP-\d{5}\b")?;
            custom.set_item("description", "Employee badge")?;

            let dict = PyDict::new(py);
            dict.set_item("entities", vec!["PERSON", "email_address"])?;
            dict.set_item("collision_policy", "first_write_wins")?;
            dict.set_item("allow_list", vec![r"support@example\.com"])?;
            dict.set_item("custom_patterns", PyList::new(py, [custom])?)?;
            dict.set_item("mask_mode", "single_pass")?;
            dict.set_item("default_action", "partial")?;
            dict.set_item("mask_text", "<hidden>")?;
            dict.set_item("storage_root", "/tmp/pii-masker")?;
            dict.set_item("unique_names", false)?;

            let (config, on_disk) = config_from_py_dict(&dict)?;
            assert!(on_disk);
            assert_eq!(
                config.detection.entities,
                vec![EntityKind::Person, EntityKind::EmailAddress]
            );
            assert_eq!(config.detection.collision_policy, CollisionPolicy::FirstWriteWins);
            assert_eq!(config.detection.allow_list, vec![r"support@example\.com"]);
            assert_eq!(config.detection.custom_patterns.len(), 1);
            let pattern = &config.detection.custom_patterns[0];
            assert_eq!(pattern.kind, EntityKind::Id);
            assert_eq!(pattern.description, "Employee badge");
            assert!(pattern.enabled);
            assert!(!pattern.case_insensitive);
            assert_eq!(config.masking.mode, MaskMode::SinglePass);
            assert_eq!(config.masking.default_action, ReplacementAction::Partial);
            assert_eq!(config.masking.mask_text, "<hidden>");
            assert_eq!(config.storage.root, PathBuf::from("/tmp/pii-masker"));
            assert!(!config.storage.unique_names);
            Ok(())
        });
    }

    #[test]
    fn test_empty_dict_keeps_defaults_in_memory() {
        with_python(|py| {
            let (config, on_disk) = config_from_py_dict(&PyDict::new(py))?;
            assert!(!on_disk);
            assert_eq!(config.detection.entities.len(), EntityKind::ALL.len());
            assert_eq!(config.masking.mode, MaskMode::Sequential);
            Ok(())
        });
    }

    #[test]
    fn test_bad_config_values_raise_value_error() {
        with_python(|py| {
            let cases: [(&str, &str); 4] = [
                ("collision_policy", "newest_wins"),
                ("mask_mode", "sometimes"),
                ("default_action", "shred"),
                ("entities", "PET_NAME"),
            ];
            for (key, value) in cases {
                let dict = PyDict::new(py);
                if key == "entities" {
                    dict.set_item(key, vec![value])?;
                } else {
                    dict.set_item(key, value)?;
                }
                let err = config_from_py_dict(&dict).unwrap_err();
                assert!(err.is_instance_of::<PyValueError>(py), "{key}");
            }

            let custom = PyDict::new(py);
            custom.set_item("kind", "ID")?;
            let dict = PyDict::new(py);
            dict.set_item("custom_patterns", PyList::new(py, [custom])?)?;
            let err = config_from_py_dict(&dict).unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            Ok(())
        });
    }

    #[test]
    fn test_pipeline_errors_map_to_exception_classes() {
        with_python(|py| {
            let unsupported: PyErr = PipelineError::UnsupportedFormat("a.csv".into()).into();
            assert!(unsupported.is_instance_of::<UnsupportedFormatError>(py));

            let decode: PyErr = PipelineError::decode(DocumentFormat::Pdf, "bad xref").into();
            assert!(decode.is_instance_of::<DecodeError>(py));

            let engine: PyErr = PipelineError::DetectionEngine("offline".into()).into();
            assert!(engine.is_instance_of::<DetectionEngineError>(py));

            let missing: PyErr = PipelineError::NotFound("x.txt".into()).into();
            assert!(missing.is_instance_of::<NotFoundError>(py));

            let invalid: PyErr = PipelineError::InvalidReference("../x".into()).into();
            assert!(invalid.is_instance_of::<InvalidReferenceError>(py));

            let config: PyErr = PipelineError::Config("bad pattern".into()).into();
            assert!(config.is_instance_of::<PiiMaskerError>(py));
            assert!(!config.is_instance_of::<NotFoundError>(py));

            for err in [unsupported, decode, engine, missing, invalid] {
                assert!(err.is_instance_of::<PiiMaskerError>(py));
            }
            Ok(())
        });
    }

    #[test]
    fn test_detect_mask_download_round_trip() {
        with_python(|py| {
            let masker = PiiMaskerRust::new(None)?;

            let (pii, reference) =
                masker.detect(py, "note.txt", b"Contact John Smith at john@example.com")?;
            let pii = pii.bind(py);
            let kind: String = pii
                .get_item("John Smith")?
                .expect("person detected")
                .extract()?;
            assert_eq!(kind, "PERSON");
            assert!(pii.get_item("john@example.com")?.is_some());
            assert!(reference.ends_with("_note.txt"));

            let edits = masker.suggest(py, pii, Some("mask"))?;
            let masked_reference = masker.mask(py, &reference, edits.bind(py))?;
            assert!(masked_reference.ends_with("_note_masked.txt"));

            let masked = masker.download(py, &masked_reference)?;
            assert_eq!(masked.bind(py).as_bytes(), b"Contact [Masked] at [Masked]");

            let original = masker.download(py, &reference)?;
            assert_eq!(
                original.bind(py).as_bytes(),
                b"Contact John Smith at john@example.com"
            );
            Ok(())
        });
    }

    #[test]
    fn test_suggest_uses_configured_default_action() {
        with_python(|py| {
            let config = PyDict::new(py);
            config.set_item("default_action", "mask")?;
            config.set_item("mask_text", "[X]")?;
            let masker = PiiMaskerRust::new(Some(&config))?;

            let pii = PyDict::new(py);
            pii.set_item("123-45-6789", "SSN")?;
            let edits = masker.suggest(py, &pii, None)?;
            let replacement: String = edits
                .bind(py)
                .get_item("123-45-6789")?
                .expect("edit proposed")
                .extract()?;
            assert_eq!(replacement, "[X]");
            Ok(())
        });
    }

    #[test]
    fn test_class_methods_raise_typed_exceptions() {
        with_python(|py| {
            let masker = PiiMaskerRust::new(None)?;

            let err = masker.detect(py, "table.csv", b"a,b").unwrap_err();
            assert!(err.is_instance_of::<UnsupportedFormatError>(py));

            let err = masker.detect(py, "letter.docx", b"not a zip").unwrap_err();
            assert!(err.is_instance_of::<DecodeError>(py));

            let err = masker.download(py, "ghost.txt").unwrap_err();
            assert!(err.is_instance_of::<NotFoundError>(py));

            let err = masker
                .mask(py, "../etc/passwd", &PyDict::new(py))
                .unwrap_err();
            assert!(err.is_instance_of::<InvalidReferenceError>(py));
            Ok(())
        });
    }
}
