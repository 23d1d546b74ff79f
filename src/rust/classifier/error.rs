use ort::Error as OrtError;
use std::io;
use std::path::PathBuf;

/// Errors surfaced to callers of the classification pipeline at request time.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// No model is registered for the requested language, either because it was
    /// never configured or because its artifacts failed to load.
    #[error("Model not available for language: {0}")]
    ModelUnavailable(String),
    /// The input text could not be tokenized
    #[error("Normalization error: {0}")]
    Normalization(String),
    /// Scoring failed or produced output that does not line up with the model's classes
    #[error("Classification error: {0}")]
    Classification(String),
}

/// Errors raised while loading a language's artifacts at startup.
///
/// None of these are fatal to the process: the registry records the failure and
/// leaves the language absent.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed artifact {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Artifact {path:?} declares disallowed type '{kind}' (schema v{schema_version})")]
    Disallowed {
        path: PathBuf,
        kind: String,
        schema_version: u32,
    },
    #[error("Artifact {path:?} declares language '{found}', expected '{expected}'")]
    LanguageMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("Duplicate entry '{entry}' in {artifact}")]
    DuplicateEntry { artifact: String, entry: String },
    #[error("Invalid {artifact}: {reason}")]
    Invalid { artifact: String, reason: String },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Manifest required but not found: {path:?}")]
    MissingManifest { path: PathBuf },
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Build error: {0}")]
    Build(String),
}

impl From<OrtError> for ArtifactError {
    fn from(err: OrtError) -> Self {
        ArtifactError::Model(err.to_string())
    }
}
