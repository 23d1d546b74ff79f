use std::collections::HashMap;

use ndarray::Array1;

use super::error::ArtifactError;

/// Ordered set of normalized tokens. The position of each entry is the index of its
/// feature in every bag-of-words vector built against this vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary, preserving the given order.
    ///
    /// # Errors
    /// - `Invalid` if the list is empty or contains an empty token
    /// - `DuplicateEntry` if a token appears twice
    pub fn new(entries: Vec<String>) -> Result<Self, ArtifactError> {
        if entries.is_empty() {
            return Err(ArtifactError::Invalid {
                artifact: "vocabulary".into(),
                reason: "vocabulary must contain at least one token".into(),
            });
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, token) in entries.iter().enumerate() {
            if token.is_empty() {
                return Err(ArtifactError::Invalid {
                    artifact: "vocabulary".into(),
                    reason: format!("token {} is empty", i + 1),
                });
            }
            if index.insert(token.clone(), i).is_some() {
                return Err(ArtifactError::DuplicateEntry {
                    artifact: "vocabulary".into(),
                    entry: token.clone(),
                });
            }
        }

        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Bag-of-words indicator vector for `tokens`.
    ///
    /// Position `i` is 1.0 iff `entries()[i]` occurs in `tokens`, regardless of how
    /// often. Tokens outside the vocabulary contribute nothing.
    pub fn vectorize<S: AsRef<str>>(&self, tokens: &[S]) -> Array1<f32> {
        let mut bag = Array1::zeros(self.entries.len());
        for token in tokens {
            if let Some(i) = self.index_of(token.as_ref()) {
                bag[i] = 1.0;
            }
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(tokens: &[&str]) -> Vocabulary {
        Vocabulary::new(tokens.iter().map(|t| t.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_index_correspondence() {
        let vocabulary = vocab(&["hi", "bye", "order", "track"]);
        for (i, token) in vocabulary.entries().iter().enumerate() {
            let bag = vocabulary.vectorize(&[token.as_str()]);
            assert_eq!(bag.len(), vocabulary.len());
            for (j, &bit) in bag.iter().enumerate() {
                assert_eq!(bit, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_presence_not_count() {
        let vocabulary = vocab(&["hi", "bye"]);
        let bag = vocabulary.vectorize(&["hi", "hi", "hi"]);
        assert_eq!(bag.to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_out_of_vocabulary_ignored() {
        let vocabulary = vocab(&["hi", "bye"]);
        let bag = vocabulary.vectorize(&["hello", "world"]);
        assert_eq!(bag.to_vec(), vec![0.0, 0.0]);

        let empty: [&str; 0] = [];
        assert_eq!(vocabulary.vectorize(&empty).len(), 2);
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        let result = Vocabulary::new(vec!["hi".into(), "bye".into(), "hi".into()]);
        assert!(matches!(result, Err(ArtifactError::DuplicateEntry { .. })));

        assert!(Vocabulary::new(Vec::new()).is_err());
        assert!(Vocabulary::new(vec!["hi".into(), String::new()]).is_err());
    }
}
