//! A thread-safe, multi-language intent classifier that answers short messages
//! with canned responses.
//!
//! Each supported language has its own vocabulary, class list, trained model and
//! response corpus. Messages are normalized, turned into a bag-of-words vector,
//! scored by the language's model, and the best-ranked intent picks a reply.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use ndarray::ArrayView1;
//! use rand::SeedableRng;
//! use vernacular::{ClassifierError, IntentCorpus, IntentEngine, IntentScorer, LanguageModel, ModelRegistry};
//!
//! #[derive(Debug)]
//! struct Keyword;
//!
//! impl IntentScorer for Keyword {
//!     fn score(&self, features: ArrayView1<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
//!         Ok(vec![features[0] * 0.9, features[1] * 0.9])
//!     }
//! }
//!
//! let model = LanguageModel::builder("english")
//!     .with_vocabulary(vec!["hi", "bye"])?
//!     .with_classes(vec!["greeting", "farewell"])?
//!     .with_scorer(Arc::new(Keyword))
//!     .build()?;
//!
//! let registry = ModelRegistry::builder()
//!     .add_model(model)
//!     .add_corpus("english", IntentCorpus::from_pairs(vec![("greeting", vec!["Hello!"])])?)
//!     .build();
//!
//! let engine = IntentEngine::new(Arc::new(registry));
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let results = engine.classify("Hi there", "english")?;
//! assert_eq!(results[0].intent, "greeting");
//! assert_eq!(engine.respond(&results, "english", &mut rng), "Hello!");
//! # Ok(())
//! # }
//! ```
//!
//! # Loading From Disk
//!
//! ```no_run
//! use std::sync::Arc;
//! use vernacular::{IntentEngine, ModelRegistry, RegistryConfig};
//!
//! let config = RegistryConfig::default().with_artifacts_dir("/srv/chatbot");
//! let registry = ModelRegistry::load(&config);
//! let engine = IntentEngine::new(Arc::new(registry));
//! ```

pub mod artifacts;
pub mod classifier;
pub mod corpus;
pub mod engine;
pub mod registry;
mod runtime;

pub use artifacts::{ArtifactManifest, ArtifactStore, ManifestChecksums, ALLOWED_ARTIFACTS};
pub use classifier::{
    rank, ArtifactError, ClassificationResult, ClassifierError, EnglishLemmatizer, IdentityLemmatizer,
    IntentScorer, LanguageModel, LanguageModelBuilder, Lemmatizer, ModelInfo, Normalizer, OnnxLoader,
    OnnxScorer, ScorerLoader, Vocabulary, DEFAULT_THRESHOLD,
};
pub use corpus::{select_response, IntentCorpus, IntentDocument, IntentEntry, FALLBACK_RESPONSE};
pub use engine::IntentEngine;
pub use registry::{LanguageStatus, ModelRegistry, RegistryBuilder, RegistryConfig, SUPPORTED_LANGUAGES};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
