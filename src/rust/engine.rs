use std::sync::Arc;

use log::debug;
use rand::Rng;

use crate::classifier::{ClassificationResult, ClassifierError, DEFAULT_THRESHOLD};
use crate::corpus::{select_response, FALLBACK_RESPONSE};
use crate::registry::ModelRegistry;

/// Entry point for the transport layer: classifies messages and picks replies
/// against an injected [`ModelRegistry`].
///
/// The engine holds no mutable state. Randomness for reply selection is supplied per
/// call, so each caller keeps its own generator.
#[derive(Debug, Clone)]
pub struct IntentEngine {
    registry: Arc<ModelRegistry>,
    threshold: f32,
}

impl IntentEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Overrides the confidence threshold (default 0.25)
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Ranks the plausible intents of `message` in `language`.
    ///
    /// `language` must already be lowercased and validated by the caller.
    ///
    /// # Errors
    /// - `ModelUnavailable` if no model is loaded for `language`
    /// - `Normalization` if `message` cannot be tokenized
    /// - `Classification` if scoring fails
    pub fn classify(&self, message: &str, language: &str) -> Result<Vec<ClassificationResult>, ClassifierError> {
        let model = self
            .registry
            .lookup(language)
            .ok_or_else(|| ClassifierError::ModelUnavailable(language.to_string()))?;
        let results = model.predict(message, self.threshold)?;
        debug!("[{}] Predicted intents: {:?}", language, results);
        Ok(results)
    }

    /// Picks a reply for already-ranked `results`. Never fails: a missing corpus, an
    /// empty result list or an unknown tag all yield the fallback string.
    pub fn respond<R: Rng + ?Sized>(&self, results: &[ClassificationResult], language: &str, rng: &mut R) -> String {
        match self.registry.corpus(language) {
            Some(corpus) => select_response(results, corpus, rng),
            None => {
                debug!("[{}] Corpus missing, answering with fallback", language);
                FALLBACK_RESPONSE.to_string()
            }
        }
    }

    /// Classifies `message` and replies to it in one step.
    pub fn reply<R: Rng + ?Sized>(&self, message: &str, language: &str, rng: &mut R) -> Result<String, ClassifierError> {
        let results = self.classify(message, language)?;
        Ok(self.respond(&results, language, rng))
    }
}
