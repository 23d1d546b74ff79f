use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::task::JoinSet;

use crate::artifacts::ArtifactStore;
use crate::classifier::{ArtifactError, LanguageModel, OnnxLoader, ScorerLoader};
use crate::corpus::IntentCorpus;
use crate::runtime::RuntimeConfig;

/// Languages the chatbot ships models for
pub const SUPPORTED_LANGUAGES: [&str; 6] = ["english", "hindi", "bengali", "telugu", "assamese", "gujarati"];

/// Where to find artifacts and which languages to load from them.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub artifacts_dir: PathBuf,
    pub languages: Vec<String>,
    pub runtime: RuntimeConfig,
    /// Reject languages without `manifest_<lang>.json` instead of loading unchecked artifacts
    pub require_manifest: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: ArtifactStore::default_root(),
            languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            runtime: RuntimeConfig::default(),
            require_manifest: true,
        }
    }
}

impl RegistryConfig {
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_runtime_config(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_require_manifest(mut self, require_manifest: bool) -> Self {
        self.require_manifest = require_manifest;
        self
    }

    /// Configured languages in order, each once
    fn unique_languages(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.languages
            .iter()
            .filter(|l| seen.insert(l.as_str()))
            .cloned()
            .collect()
    }
}

/// Load outcome for one configured language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStatus {
    pub language: String,
    pub model_loaded: bool,
    pub corpus_loaded: bool,
    pub errors: Vec<String>,
}

/// Per-language models and response corpora, built once at startup and read-only
/// afterwards.
///
/// A language whose artifacts fail to load is simply absent; the failure is logged
/// and kept for [`status`](Self::status).
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, LanguageModel>,
    corpora: HashMap<String, IntentCorpus>,
    failures: BTreeMap<String, Vec<String>>,
    configured: Vec<String>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ModelRegistry>();
    }
};

struct LanguageLoad {
    language: String,
    model: Result<LanguageModel, ArtifactError>,
    corpus: Result<IntentCorpus, ArtifactError>,
}

impl ModelRegistry {
    /// Creates a RegistryBuilder for in-memory construction
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Loads every configured language with ONNX weights.
    pub fn load(config: &RegistryConfig) -> Self {
        let loader = OnnxLoader::new(config.runtime.clone());
        Self::load_with(config, &loader)
    }

    /// Loads every configured language, materializing weights with `loader`.
    /// Never fails as a whole: broken languages are left out.
    pub fn load_with(config: &RegistryConfig, loader: &dyn ScorerLoader) -> Self {
        let store = ArtifactStore::new(&config.artifacts_dir);
        let languages = config.unique_languages();
        info!("Preloading models for {} languages from {:?}", languages.len(), store.root());

        let mut registry = Self {
            configured: languages.clone(),
            ..Self::default()
        };
        for language in languages {
            registry.absorb(load_language(&store, &language, loader, config.require_manifest));
        }
        registry.log_summary();
        registry
    }

    /// Same as [`load`](Self::load), with each language loaded on its own blocking task.
    pub async fn load_concurrent(config: RegistryConfig) -> Self {
        let loader = Arc::new(OnnxLoader::new(config.runtime.clone()));
        Self::load_concurrent_with(config, loader).await
    }

    /// Same as [`load_with`](Self::load_with), with each language loaded on its own
    /// blocking task. A task that panics counts as a failure for its language.
    pub async fn load_concurrent_with(config: RegistryConfig, loader: Arc<dyn ScorerLoader>) -> Self {
        let store = Arc::new(ArtifactStore::new(&config.artifacts_dir));
        let languages = config.unique_languages();
        info!("Preloading models for {} languages from {:?}", languages.len(), store.root());

        let require_manifest = config.require_manifest;
        let mut tasks = JoinSet::new();
        for language in &languages {
            let store = Arc::clone(&store);
            let loader = Arc::clone(&loader);
            let language = language.clone();
            tasks.spawn_blocking(move || load_language(&store, &language, loader.as_ref(), require_manifest));
        }

        let mut registry = Self {
            configured: languages.clone(),
            ..Self::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(load) => registry.absorb(load),
                Err(e) => error!("Model loading task failed: {}", e),
            }
        }

        for language in &languages {
            let seen = registry.models.contains_key(language)
                || registry.corpora.contains_key(language)
                || registry.failures.contains_key(language);
            if !seen {
                registry
                    .failures
                    .entry(language.clone())
                    .or_default()
                    .push("loader task did not complete".to_string());
            }
        }

        registry.log_summary();
        registry
    }

    fn absorb(&mut self, load: LanguageLoad) {
        let LanguageLoad { language, model, corpus } = load;
        match model {
            Ok(model) => {
                info!(
                    "Successfully loaded model for language: {} ({} tokens, {} classes)",
                    language,
                    model.vocabulary().len(),
                    model.classes().len()
                );
                self.models.insert(language.clone(), model);
            }
            Err(e) => {
                error!("Failed to load model for language {}: {}", language, e);
                self.failures.entry(language.clone()).or_default().push(e.to_string());
            }
        }
        match corpus {
            Ok(corpus) => {
                info!("Loaded {} intents for language: {}", corpus.len(), language);
                self.corpora.insert(language.clone(), corpus);
            }
            Err(e) => {
                error!("Failed to load intents for language {}: {}", language, e);
                self.failures.entry(language.clone()).or_default().push(e.to_string());
            }
        }

        if let (Some(model), Some(corpus)) = (self.models.get(&language), self.corpora.get(&language)) {
            let uncovered = corpus.uncovered(model.classes());
            if !uncovered.is_empty() {
                debug!("[{}] Classes without responses, will answer with fallback: {:?}", language, uncovered);
            }
        }
    }

    fn log_summary(&self) {
        info!(
            "Model registry ready: {} of {} languages available",
            self.models.len(),
            self.configured.len()
        );
        for language in self.failures.keys() {
            warn!("Language unavailable or degraded: {}", language);
        }
    }

    pub fn lookup(&self, language: &str) -> Option<&LanguageModel> {
        self.models.get(language)
    }

    pub fn corpus(&self, language: &str) -> Option<&IntentCorpus> {
        self.corpora.get(language)
    }

    /// Languages with a loaded model, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.models.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Load errors recorded for `language`, empty if it loaded cleanly
    pub fn failures(&self, language: &str) -> &[String] {
        self.failures.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One entry per configured language, in configuration order
    pub fn status(&self) -> Vec<LanguageStatus> {
        self.configured
            .iter()
            .map(|language| LanguageStatus {
                language: language.clone(),
                model_loaded: self.models.contains_key(language),
                corpus_loaded: self.corpora.contains_key(language),
                errors: self.failures(language).to_vec(),
            })
            .collect()
    }
}

/// Loads one language's model and corpus independently of each other.
fn load_language(
    store: &ArtifactStore,
    language: &str,
    loader: &dyn ScorerLoader,
    require_manifest: bool,
) -> LanguageLoad {
    LanguageLoad {
        language: language.to_string(),
        model: load_model(store, language, loader, require_manifest),
        corpus: store.load_corpus(language),
    }
}

fn load_model(
    store: &ArtifactStore,
    language: &str,
    loader: &dyn ScorerLoader,
    require_manifest: bool,
) -> Result<LanguageModel, ArtifactError> {
    let manifest = store.load_manifest(language)?;
    match &manifest {
        Some(manifest) => store.verify_manifest(language, manifest)?,
        None if require_manifest => {
            return Err(ArtifactError::MissingManifest {
                path: store.manifest_path(language),
            })
        }
        None => warn!("[{}] No manifest found, artifact versions will not be cross-checked", language),
    }

    let vocabulary = store.load_vocabulary(language)?;
    let classes = store.load_classes(language)?;

    if let Some(manifest) = &manifest {
        if manifest.vocabulary_size != vocabulary.len() || manifest.class_count != classes.len() {
            return Err(ArtifactError::ShapeMismatch(format!(
                "manifest declares {} tokens and {} classes, artifacts hold {} and {}",
                manifest.vocabulary_size,
                manifest.class_count,
                vocabulary.len(),
                classes.len()
            )));
        }
    }

    let weights_path = store.weights_path(language);
    let scorer = loader.load(&weights_path, vocabulary.len(), classes.len())?;

    LanguageModel::builder(language)
        .with_loaded_vocabulary(vocabulary)?
        .with_classes(classes)?
        .with_scorer(scorer)
        .with_weights_path(weights_path)
        .build()
}

/// In-memory construction of a [`ModelRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    models: HashMap<String, LanguageModel>,
    corpora: HashMap<String, IntentCorpus>,
}

impl RegistryBuilder {
    /// Registers `model` under its own language code, replacing any earlier one
    pub fn add_model(mut self, model: LanguageModel) -> Self {
        self.models.insert(model.language().to_string(), model);
        self
    }

    pub fn add_corpus(mut self, language: impl Into<String>, corpus: IntentCorpus) -> Self {
        self.corpora.insert(language.into(), corpus);
        self
    }

    pub fn build(self) -> ModelRegistry {
        let mut configured: Vec<String> = self
            .models
            .keys()
            .chain(self.corpora.keys())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        configured.sort_unstable();

        ModelRegistry {
            models: self.models,
            corpora: self.corpora,
            failures: BTreeMap::new(),
            configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.languages.len(), SUPPORTED_LANGUAGES.len());
        assert_eq!(config.languages[0], "english");
        assert!(config.require_manifest);
    }

    #[test]
    fn test_unique_languages() {
        let config = RegistryConfig::default().with_languages(["hindi", "english", "hindi"]);
        assert_eq!(config.unique_languages(), vec!["hindi", "english"]);
    }

    #[test]
    fn test_empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig::default()
            .with_artifacts_dir(dir.path())
            .with_languages(["english", "hindi"]);
        let registry = ModelRegistry::load(&config);

        assert!(registry.languages().is_empty());
        assert!(registry.lookup("english").is_none());
        assert!(registry.corpus("hindi").is_none());

        let status = registry.status();
        assert_eq!(status.len(), 2);
        assert!(status.iter().all(|s| !s.model_loaded && !s.corpus_loaded && !s.errors.is_empty()));
    }
}
