use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ArtifactError;
use super::model::LanguageModel;
use super::normalizer::Normalizer;
use super::scorer::IntentScorer;
use super::vectorizer::Vocabulary;

/// A builder for constructing a LanguageModel with a fluent interface.
///
/// The builder enforces the index contract between the artifacts: the scorer's
/// declared input and output sizes must match the vocabulary and class counts.
#[derive(Debug)]
pub struct LanguageModelBuilder {
    language: String,
    normalizer: Option<Normalizer>,
    vocabulary: Option<Vocabulary>,
    classes: Option<Vec<String>>,
    scorer: Option<Arc<dyn IntentScorer>>,
    weights_path: Option<PathBuf>,
}

impl LanguageModelBuilder {
    /// Creates a new empty builder for `language`
    ///
    /// # Example
    /// ```
    /// use vernacular::LanguageModelBuilder;
    ///
    /// let builder = LanguageModelBuilder::new("english");
    /// ```
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            normalizer: None,
            vocabulary: None,
            classes: None,
            scorer: None,
            weights_path: None,
        }
    }

    /// Overrides the normalizer picked by [`Normalizer::for_language`]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Sets the vocabulary from an ordered token list
    ///
    /// # Returns
    /// * `Result<Self, ArtifactError>` - The builder instance if successful, or an error if:
    ///   - A vocabulary is already set
    ///   - The list is empty, holds an empty token, or repeats a token
    pub fn with_vocabulary(self, tokens: Vec<impl Into<String>>) -> Result<Self, ArtifactError> {
        let vocabulary = Vocabulary::new(tokens.into_iter().map(Into::into).collect())?;
        self.with_loaded_vocabulary(vocabulary)
    }

    pub fn with_loaded_vocabulary(mut self, vocabulary: Vocabulary) -> Result<Self, ArtifactError> {
        if self.vocabulary.is_some() {
            return Err(ArtifactError::Build("Vocabulary already set".to_string()));
        }
        self.vocabulary = Some(vocabulary);
        Ok(self)
    }

    /// Sets the ordered class labels
    ///
    /// # Returns
    /// * `Result<Self, ArtifactError>` - The builder instance if successful, or an error if:
    ///   - Classes are already set
    ///   - The list is empty, holds an empty label, or repeats a label
    pub fn with_classes(mut self, classes: Vec<impl Into<String>>) -> Result<Self, ArtifactError> {
        if self.classes.is_some() {
            return Err(ArtifactError::Build("Classes already set".to_string()));
        }
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        Self::validate_classes(&classes)?;
        self.classes = Some(classes);
        Ok(self)
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn IntentScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Records where the scorer's weights came from, for [`LanguageModel::info`]
    pub fn with_weights_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.weights_path = Some(path.into());
        self
    }

    fn validate_classes(classes: &[String]) -> Result<(), ArtifactError> {
        if classes.is_empty() {
            return Err(ArtifactError::Invalid {
                artifact: "classes".into(),
                reason: "at least one class is required".into(),
            });
        }
        let mut seen = HashSet::with_capacity(classes.len());
        for (i, label) in classes.iter().enumerate() {
            if label.is_empty() {
                return Err(ArtifactError::Invalid {
                    artifact: "classes".into(),
                    reason: format!("class {} has an empty label", i + 1),
                });
            }
            if !seen.insert(label.as_str()) {
                return Err(ArtifactError::DuplicateEntry {
                    artifact: "classes".into(),
                    entry: label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Builds and returns the final LanguageModel
    ///
    /// # Returns
    /// * `Result<LanguageModel, ArtifactError>` - The model if successful, or an error if:
    ///   - The language code is empty
    ///   - Vocabulary, classes or scorer are missing
    ///   - The scorer declares dimensions that disagree with the vocabulary or classes
    pub fn build(self) -> Result<LanguageModel, ArtifactError> {
        if self.language.is_empty() {
            return Err(ArtifactError::Build("Language code cannot be empty".to_string()));
        }
        let vocabulary = self.vocabulary
            .ok_or_else(|| ArtifactError::Build("Vocabulary must be set".to_string()))?;
        let classes = self.classes
            .ok_or_else(|| ArtifactError::Build("Classes must be set".to_string()))?;
        let scorer = self.scorer
            .ok_or_else(|| ArtifactError::Build("Scorer must be set".to_string()))?;

        if let Some((input_size, output_size)) = scorer.dimensions() {
            if input_size != vocabulary.len() {
                return Err(ArtifactError::ShapeMismatch(format!(
                    "[{}] scorer expects {} features, vocabulary has {} tokens",
                    self.language, input_size, vocabulary.len()
                )));
            }
            if output_size != classes.len() {
                return Err(ArtifactError::ShapeMismatch(format!(
                    "[{}] scorer produces {} scores, there are {} classes",
                    self.language, output_size, classes.len()
                )));
            }
        }

        // Lemmas are only accepted when the vocabulary knows them
        let vocabulary = Arc::new(vocabulary);
        let normalizer = self.normalizer
            .unwrap_or_else(|| Normalizer::for_language(&self.language))
            .with_lexicon(Arc::clone(&vocabulary));

        Ok(LanguageModel {
            language: self.language,
            normalizer,
            vocabulary,
            classes: Arc::new(classes),
            scorer,
            weights_path: self.weights_path,
        })
    }
}
