use crate::error::AppError;
use crate::models::fruit_types::FruitClass;
use crate::services::classifier::{inference, Classifier};
use ndarray::Array4;
use ort::session::Session;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub type OnnxSession = Session;

#[derive(serde::Deserialize)]
struct ManifestFile {
    id2label: BTreeMap<String, String>,
}

/// Output index to class label, as recorded when the model was exported.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelManifest {
    labels: Vec<FruitClass>,
}

impl LabelManifest {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError {
            message: format!("Failed to read label manifest {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// Parses `{"id2label": {"0": "Kupa", ...}}`. Indices must be exactly
    /// `0..n`, and every fruit class must appear once.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let manifest: ManifestFile = serde_json::from_str(content).map_err(|e| AppError {
            message: format!("Failed to parse label manifest: {}", e),
        })?;

        let mut entries = Vec::with_capacity(manifest.id2label.len());
        for (key, label) in &manifest.id2label {
            let idx = key.parse::<usize>().map_err(|_| AppError {
                message: format!("Label manifest index '{}' is not a number", key),
            })?;
            let class = FruitClass::from_label(label).ok_or_else(|| AppError {
                message: format!("Label manifest names unknown class '{}'", label),
            })?;
            entries.push((idx, class));
        }
        entries.sort_by_key(|(idx, _)| *idx);

        let mut seen = HashSet::new();
        for (position, (idx, class)) in entries.iter().enumerate() {
            if *idx != position {
                return Err(format!("Label manifest is missing index {}", position).into());
            }
            if !seen.insert(*class) {
                return Err(format!("Label manifest lists {} more than once", class).into());
            }
        }

        if let Some(missing) = FruitClass::ALL.iter().find(|c| !seen.contains(c)) {
            return Err(format!("Label manifest does not include {}", missing).into());
        }

        Ok(Self {
            labels: entries.into_iter().map(|(_, class)| class).collect(),
        })
    }

    pub fn labels(&self) -> &[FruitClass] {
        &self.labels
    }
}

impl Default for LabelManifest {
    fn default() -> Self {
        Self {
            labels: FruitClass::ALL.to_vec(),
        }
    }
}

/// Owns the ONNX Runtime session. Loaded once at startup, never reloaded.
pub struct ModelManager {
    model_path: PathBuf,
    session: Mutex<OnnxSession>,
}

impl ModelManager {
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, AppError> {
        if !model_path.is_file() {
            return Err(format!("Model not found at {}", model_path.display()).into());
        }

        let _ = ort::init().with_name("fruit-lens").commit();

        let session = Session::builder()
            .map_err(|e| AppError { message: format!("Failed to create session builder: {}", e) })?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| AppError { message: format!("Failed to set optimization level: {}", e) })?
            .with_intra_threads(intra_threads)
            .map_err(|e| AppError { message: format!("Failed to set intra threads: {}", e) })?
            .with_execution_providers([
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])
            .map_err(|e| AppError { message: format!("Failed to register CPU execution provider: {}", e) })?
            .commit_from_file(model_path)
            .map_err(|e| AppError {
                message: format!("Failed to load ONNX model: {}", e),
            })?;

        Ok(Self {
            model_path: model_path.to_path_buf(),
            session: Mutex::new(session),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for ModelManager {
    fn classify(&self, input: Array4<f32>) -> Result<Vec<f32>, AppError> {
        let mut session = self.session.lock().map_err(|_| AppError {
            message: "Model session lock poisoned".to_string(),
        })?;
        inference::run_inference_with_model(&mut session, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_in_index_order() {
        let manifest =
            LabelManifest::from_json(r#"{"id2label": {"2": "Namnam", "0": "Kupa", "1": "Matoa"}}"#)
                .unwrap();
        assert_eq!(manifest.labels(), &FruitClass::ALL);
    }

    #[test]
    fn manifest_allows_other_orders() {
        let manifest =
            LabelManifest::from_json(r#"{"id2label": {"0": "matoa", "1": "Namnam", "2": "Kupa"}}"#)
                .unwrap();
        assert_eq!(
            manifest.labels(),
            &[FruitClass::Matoa, FruitClass::Namnam, FruitClass::Kupa]
        );
    }

    #[test]
    fn manifest_rejects_gaps() {
        let err = LabelManifest::from_json(r#"{"id2label": {"0": "Kupa", "1": "Matoa", "3": "Namnam"}}"#)
            .unwrap_err();
        assert!(err.message.contains("missing index 2"));
    }

    #[test]
    fn manifest_rejects_duplicates_and_unknowns() {
        assert!(LabelManifest::from_json(r#"{"id2label": {"0": "Kupa", "1": "Kupa", "2": "Namnam"}}"#).is_err());
        assert!(LabelManifest::from_json(r#"{"id2label": {"0": "Kupa", "1": "Matoa", "2": "Durian"}}"#).is_err());
        assert!(LabelManifest::from_json(r#"{"id2label": {"0": "Kupa", "1": "Matoa"}}"#).is_err());
        assert!(LabelManifest::from_json(r#"{"labels": []}"#).is_err());
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ModelManager::load(&tmp.path().join("absent.onnx"), 1).err().unwrap();
        assert!(err.message.starts_with("Model not found at"));
    }
}
