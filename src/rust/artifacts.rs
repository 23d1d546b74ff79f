use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::classifier::{ArtifactError, Vocabulary};
use crate::corpus::{IntentCorpus, IntentDocument};

/// `(kind, schema_version)` pairs that may be materialized from disk.
/// Anything else is rejected before its payload is deserialized.
pub const ALLOWED_ARTIFACTS: &[(&str, u32)] = &[
    ("vocabulary", 1),
    ("classes", 1),
    ("manifest", 1),
];

/// Common header of every typed artifact. Parsed on its own before the payload.
#[derive(Debug, Deserialize)]
struct ArtifactHeader {
    kind: String,
    schema_version: u32,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenListArtifact {
    #[allow(dead_code)]
    kind: String,
    #[allow(dead_code)]
    schema_version: u32,
    #[allow(dead_code)]
    #[serde(default)]
    language: Option<String>,
    entries: Vec<String>,
}

/// Ties one language's vocabulary, classes and weights together so that files from
/// different training runs cannot be mixed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactManifest {
    pub kind: String,
    pub schema_version: u32,
    #[serde(default)]
    pub language: Option<String>,
    pub vocabulary_size: usize,
    pub class_count: usize,
    pub checksums: ManifestChecksums,
}

/// Hex-encoded SHA-256 digests
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestChecksums {
    pub vocabulary: String,
    pub classes: String,
    pub weights: String,
}

/// Read-only view of the directory holding every language's artifacts.
///
/// ```text
/// <root>/models/words_<lang>.json
/// <root>/models/classes_<lang>.json
/// <root>/models/<lang>_model.onnx
/// <root>/models/manifest_<lang>.json   (optional)
/// <root>/intents/intents_<lang>.json
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Creates a store over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::default_root())
    }

    /// Returns the default artifacts directory path
    pub fn default_root() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("VERNACULAR_ARTIFACTS") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("vernacular");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("vernacular");
        }

        // 4. Relative to the working directory
        PathBuf::from("artifacts")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vocabulary_path(&self, language: &str) -> PathBuf {
        self.root.join("models").join(format!("words_{}.json", language))
    }

    pub fn classes_path(&self, language: &str) -> PathBuf {
        self.root.join("models").join(format!("classes_{}.json", language))
    }

    pub fn weights_path(&self, language: &str) -> PathBuf {
        self.root.join("models").join(format!("{}_model.onnx", language))
    }

    pub fn manifest_path(&self, language: &str) -> PathBuf {
        self.root.join("models").join(format!("manifest_{}.json", language))
    }

    pub fn corpus_path(&self, language: &str) -> PathBuf {
        self.root.join("intents").join(format!("intents_{}.json", language))
    }

    pub fn load_vocabulary(&self, language: &str) -> Result<Vocabulary, ArtifactError> {
        let path = self.vocabulary_path(language);
        let artifact: TokenListArtifact = read_typed_artifact(&path, "vocabulary", language)?;
        Vocabulary::new(artifact.entries)
    }

    pub fn load_classes(&self, language: &str) -> Result<Vec<String>, ArtifactError> {
        let path = self.classes_path(language);
        let artifact: TokenListArtifact = read_typed_artifact(&path, "classes", language)?;
        let mut seen = HashSet::with_capacity(artifact.entries.len());
        for entry in &artifact.entries {
            if !seen.insert(entry.as_str()) {
                return Err(ArtifactError::DuplicateEntry {
                    artifact: "classes".into(),
                    entry: entry.clone(),
                });
            }
        }
        Ok(artifact.entries)
    }

    /// Loads the manifest if one exists. A missing manifest is not an error.
    pub fn load_manifest(&self, language: &str) -> Result<Option<ArtifactManifest>, ArtifactError> {
        let path = self.manifest_path(language);
        if !path.exists() {
            return Ok(None);
        }
        read_typed_artifact(&path, "manifest", language).map(Some)
    }

    pub fn load_corpus(&self, language: &str) -> Result<IntentCorpus, ArtifactError> {
        let path = self.corpus_path(language);
        let bytes = read_bytes(&path)?;
        let document: IntentDocument = serde_json::from_slice(&bytes)
            .map_err(|source| ArtifactError::Malformed { path: path.clone(), source })?;
        IntentCorpus::from_document(document)
    }

    /// Checks every file the manifest covers against its recorded digest.
    pub fn verify_manifest(&self, language: &str, manifest: &ArtifactManifest) -> Result<(), ArtifactError> {
        let files = [
            ("vocabulary", self.vocabulary_path(language), &manifest.checksums.vocabulary),
            ("classes", self.classes_path(language), &manifest.checksums.classes),
            ("weights", self.weights_path(language), &manifest.checksums.weights),
        ];
        for (file_type, path, expected) in files {
            let actual = Self::file_digest(&path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ArtifactError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
            debug!("{} file verified: {:?}", file_type, path);
        }
        info!("[{}] Artifact checksums verified", language);
        Ok(())
    }

    /// Hex-encoded SHA-256 of a file's contents
    pub fn file_digest(path: &Path) -> Result<String, ArtifactError> {
        let bytes = read_bytes(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a typed artifact, refusing to materialize anything whose declared type is
/// not on [`ALLOWED_ARTIFACTS`] or not the kind expected at `path`.
fn read_typed_artifact<T: DeserializeOwned>(
    path: &Path,
    expected_kind: &str,
    language: &str,
) -> Result<T, ArtifactError> {
    let bytes = read_bytes(path)?;
    let header: ArtifactHeader = serde_json::from_slice(&bytes)
        .map_err(|source| ArtifactError::Malformed { path: path.to_path_buf(), source })?;

    let allowed = ALLOWED_ARTIFACTS
        .iter()
        .any(|&(kind, version)| kind == header.kind && version == header.schema_version);
    if !allowed || header.kind != expected_kind {
        return Err(ArtifactError::Disallowed {
            path: path.to_path_buf(),
            kind: header.kind,
            schema_version: header.schema_version,
        });
    }

    if let Some(declared) = header.language {
        if declared != language {
            return Err(ArtifactError::LanguageMismatch {
                path: path.to_path_buf(),
                expected: language.to_string(),
                found: declared,
            });
        }
    }

    serde_json::from_slice(&bytes)
        .map_err(|source| ArtifactError::Malformed { path: path.to_path_buf(), source })
}
