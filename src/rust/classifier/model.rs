use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use super::builder::LanguageModelBuilder;
use super::error::ClassifierError;
use super::normalizer::Normalizer;
use super::ranker::{rank, ClassificationResult};
use super::scorer::IntentScorer;
use super::vectorizer::Vocabulary;
use super::ModelInfo;

/// Everything needed to classify text in one language: the vocabulary that fixes
/// feature indices, the classes that fix score indices, and the trained scorer.
///
/// # Thread Safety
///
/// All fields are immutable and shared through `Arc`, so a `LanguageModel` can be
/// cloned cheaply and used from any number of threads at once.
#[derive(Debug, Clone)]
pub struct LanguageModel {
    pub(crate) language: String,
    pub(crate) normalizer: Normalizer,
    pub(crate) vocabulary: Arc<Vocabulary>,
    pub(crate) classes: Arc<Vec<String>>,
    pub(crate) scorer: Arc<dyn IntentScorer>,
    pub(crate) weights_path: Option<PathBuf>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<LanguageModel>();
    }
};

impl LanguageModel {
    /// Creates a LanguageModelBuilder for fluent construction
    pub fn builder(language: impl Into<String>) -> LanguageModelBuilder {
        LanguageModelBuilder::new(language)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Returns information about the model's current state
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            language: self.language.clone(),
            vocabulary_size: self.vocabulary.len(),
            num_classes: self.classes.len(),
            class_labels: self.classes.as_ref().clone(),
            weights_path: self.weights_path.clone(),
        }
    }

    /// Raw per-class scores for `text`, in class order.
    pub fn score(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let tokens = self.normalizer.normalize(text)?;
        let features = self.vocabulary.vectorize(&tokens);
        debug!(
            "[{}] {} tokens, {} known",
            self.language,
            tokens.len(),
            features.iter().filter(|&&bit| bit > 0.0).count()
        );
        self.scorer.score(features.view())
    }

    /// Normalizes, vectorizes and scores `text`, then ranks the classes whose score
    /// strictly exceeds `threshold`.
    ///
    /// # Errors
    /// - `Normalization` if the text cannot be tokenized
    /// - `Classification` if the scorer fails or returns the wrong number of scores
    pub fn predict(&self, text: &str, threshold: f32) -> Result<Vec<ClassificationResult>, ClassifierError> {
        let scores = self.score(text)?;
        rank(&scores, &self.classes, threshold)
    }
}
