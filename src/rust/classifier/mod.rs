use std::path::PathBuf;

mod builder;
mod error;
mod model;
mod normalizer;
mod ranker;
mod scorer;
mod vectorizer;

pub use builder::LanguageModelBuilder;
pub use error::{ArtifactError, ClassifierError};
pub use model::LanguageModel;
pub use normalizer::{EnglishLemmatizer, IdentityLemmatizer, Lemmatizer, Normalizer};
pub use ranker::{rank, ClassificationResult, DEFAULT_THRESHOLD};
pub use scorer::{IntentScorer, OnnxLoader, OnnxScorer, ScorerLoader};
pub use vectorizer::Vocabulary;

/// Summary of a loaded language model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub language: String,
    pub vocabulary_size: usize,
    pub num_classes: usize,
    pub class_labels: Vec<String>,
    pub weights_path: Option<PathBuf>,
}
