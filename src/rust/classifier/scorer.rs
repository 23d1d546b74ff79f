use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use ndarray::{Array2, ArrayView1};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};

use super::error::{ArtifactError, ClassifierError};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// The trained numeric model of one language, seen only through its inputs and outputs.
///
/// Takes a bag-of-words vector with one entry per vocabulary token and returns one
/// relative confidence per class, in class order. Implementations hold read-only
/// weights and must tolerate concurrent calls.
pub trait IntentScorer: Send + Sync + fmt::Debug {
    fn score(&self, features: ArrayView1<'_, f32>) -> Result<Vec<f32>, ClassifierError>;

    /// `(input_size, output_size)` when the scorer knows them. Used to reject
    /// artifacts that were trained against a different vocabulary or class list.
    fn dimensions(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Materializes a weights artifact into a scorer.
pub trait ScorerLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
        input_size: usize,
        output_size: usize,
    ) -> Result<Arc<dyn IntentScorer>, ArtifactError>;
}

/// Loads weights exported to ONNX.
#[derive(Debug, Clone, Default)]
pub struct OnnxLoader {
    runtime_config: RuntimeConfig,
}

impl OnnxLoader {
    pub fn new(runtime_config: RuntimeConfig) -> Self {
        Self { runtime_config }
    }
}

impl ScorerLoader for OnnxLoader {
    fn load(
        &self,
        path: &Path,
        input_size: usize,
        output_size: usize,
    ) -> Result<Arc<dyn IntentScorer>, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "weights file not found"),
            });
        }

        let session = create_session_builder(&self.runtime_config)?.commit_from_file(path)?;
        let input_name = OnnxScorer::validate_model(&session, input_size, output_size)?;

        let scorer = OnnxScorer {
            path: path.to_path_buf(),
            session: Arc::new(session),
            input_name,
            input_size,
            output_size,
        };
        info!("Model structure validated successfully: {:?}", scorer.path());
        Ok(Arc::new(scorer))
    }
}

/// A feed-forward intent model running on ONNX Runtime.
///
/// The model takes a `[1, input_size]` float tensor and produces a
/// `[1, output_size]` float tensor on its first output.
#[derive(Debug)]
pub struct OnnxScorer {
    path: PathBuf,
    session: Arc<Session>,
    input_name: String,
    input_size: usize,
    output_size: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxScorer>();
    }
};

impl OnnxScorer {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the declared tensor types and shapes of the model against the
    /// vocabulary and class counts. Returns the name of the input to feed.
    ///
    /// Only `float32` tensors are accepted on either side. Dynamic dimensions
    /// (`-1`) are accepted; fixed ones must match exactly.
    fn validate_model(
        session: &Session,
        input_size: usize,
        output_size: usize,
    ) -> Result<String, ArtifactError> {
        let input = session.inputs.first().ok_or_else(|| {
            ArtifactError::Model("Model must have at least 1 input for the feature vector".to_string())
        })?;
        let output = session.outputs.first().ok_or_else(|| {
            ArtifactError::Model("Model must have at least 1 output for class scores".to_string())
        })?;

        Self::check_tensor("input", &input.input_type, input_size)?;
        Self::check_tensor("output", &output.output_type, output_size)?;

        Ok(input.name.clone())
    }

    fn check_tensor(role: &str, value_type: &ValueType, expected: usize) -> Result<(), ArtifactError> {
        match value_type {
            ValueType::Tensor { ty, dimensions, .. } => {
                if *ty != TensorElementType::Float32 {
                    return Err(ArtifactError::Model(format!(
                        "Model {} must be a float32 tensor, found {:?}",
                        role, ty
                    )));
                }
                match dimensions.last() {
                    Some(&dim) if dim < 0 || dim as usize == expected => Ok(()),
                    Some(&dim) => Err(ArtifactError::ShapeMismatch(format!(
                        "model {} has {} features, artifacts expect {}",
                        role, dim, expected
                    ))),
                    None => Err(ArtifactError::ShapeMismatch(format!(
                        "model {} is a scalar, expected a vector of {}",
                        role, expected
                    ))),
                }
            }
            other => Err(ArtifactError::Model(format!(
                "Model {} must be a tensor, found {:?}",
                role, other
            ))),
        }
    }
}

impl IntentScorer for OnnxScorer {
    fn score(&self, features: ArrayView1<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
        if features.len() != self.input_size {
            return Err(ClassifierError::Classification(format!(
                "Feature vector has {} entries, model expects {}",
                features.len(),
                self.input_size
            )));
        }

        let input_array = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| ClassifierError::Classification(format!("Failed to create input array: {}", e)))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(input_array)
                .map_err(|e| ClassifierError::Classification(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::Classification(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Classification(format!("Failed to extract output tensor: {}", e)))?;

        let scores: Vec<f32> = output_tensor.iter().copied().collect();
        if scores.len() != self.output_size {
            return Err(ClassifierError::Classification(format!(
                "Model produced {} scores, expected {}",
                scores.len(),
                self.output_size
            )));
        }
        Ok(scores)
    }

    fn dimensions(&self) -> Option<(usize, usize)> {
        Some((self.input_size, self.output_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxLoader::default().load(&dir.path().join("missing.onnx"), 2, 2);
        assert!(matches!(result, Err(ArtifactError::Io { .. })));
    }

    #[test]
    fn test_corrupt_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english_model.onnx");
        fs::write(&path, "corrupted data").unwrap();
        let result = OnnxLoader::default().load(&path, 2, 2);
        assert!(result.is_err());
    }
}
