use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::{NormalizedString, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use super::error::ClassifierError;
use super::vectorizer::Vocabulary;

lazy_static! {
    /// Irregular English forms that suffix rules cannot reach, and plural-looking
    /// words that are already their own lemma.
    static ref ENGLISH_EXCEPTIONS: HashMap<&'static str, &'static str> = [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("oxen", "ox"),
        ("leaves", "leaf"),
        ("knives", "knife"),
        ("lives", "life"),
        ("wives", "wife"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("data", "datum"),
        ("thanks", "thanks"),
        ("news", "news"),
        ("series", "series"),
    ]
    .into_iter()
    .collect();
}

/// Suffix detachment rules in the order morphy tries them.
const ENGLISH_SUFFIX_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
];

/// Proposes base forms for a lowercased word.
pub trait Lemmatizer: Send + Sync {
    /// Candidate lemmas for `word`, most preferred first. Never empty.
    fn candidates(&self, word: &str) -> Vec<String>;

    fn name(&self) -> &'static str;

    /// The first candidate found in `lexicon`. Without a lexicon, or when no candidate
    /// is known, the first candidate.
    fn lemmatize(&self, word: &str, lexicon: Option<&Vocabulary>) -> String {
        let mut candidates = self.candidates(word);
        if let Some(lexicon) = lexicon {
            if let Some(pos) = candidates.iter().position(|c| lexicon.index_of(c).is_some()) {
                return candidates.swap_remove(pos);
            }
        }
        if candidates.is_empty() {
            word.to_string()
        } else {
            candidates.swap_remove(0)
        }
    }
}

/// Leaves every word unchanged. Used for languages without a morphological reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn candidates(&self, word: &str) -> Vec<String> {
        vec![word.to_string()]
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Rule-based English noun lemmatizer in the style of WordNet's morphy.
///
/// An exception-table entry is tried first, then the word itself, then every suffix
/// rule that applies. Rule outputs are only accepted when the lexicon knows them, so
/// without a lexicon regular words pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLemmatizer;

impl Lemmatizer for EnglishLemmatizer {
    fn candidates(&self, word: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        if let Some(&base) = ENGLISH_EXCEPTIONS.get(word) {
            candidates.push(base.to_string());
        }
        if !candidates.iter().any(|c| c == word) {
            candidates.push(word.to_string());
        }
        if !word.chars().all(|c| c.is_alphabetic()) {
            return candidates;
        }
        for (suffix, replacement) in ENGLISH_SUFFIX_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                let candidate = format!("{}{}", stem, replacement);
                if !stem.is_empty() && !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

/// Turns raw text into the canonical token sequence a vocabulary was built from.
///
/// Text is lowercased and split on whitespace and on every Unicode punctuation
/// character, then runs without a letter or digit are dropped. Apostrophes split too,
/// so `don't` becomes `["don", "t"]` and `I'm` becomes `["i", "m"]`; vocabularies must
/// be produced with the same splitting. Each remaining token is lemmatized, checking
/// candidates against the lexicon when one is attached.
#[derive(Clone)]
pub struct Normalizer {
    language: String,
    lemmatizer: Arc<dyn Lemmatizer>,
    lexicon: Option<Arc<Vocabulary>>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("language", &self.language)
            .field("lemmatizer", &self.lemmatizer.name())
            .field("lexicon", &self.lexicon.as_ref().map(|l| l.len()))
            .finish()
    }
}

impl Normalizer {
    /// Picks the lemmatizer registered for `language`
    pub fn for_language(language: &str) -> Self {
        let lemmatizer: Arc<dyn Lemmatizer> = match language {
            "english" => Arc::new(EnglishLemmatizer),
            _ => Arc::new(IdentityLemmatizer),
        };
        Self::with_lemmatizer(language, lemmatizer)
    }

    pub fn with_lemmatizer(language: impl Into<String>, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            language: language.into(),
            lemmatizer,
            lexicon: None,
        }
    }

    /// Accepts only lemma candidates that `lexicon` contains
    pub fn with_lexicon(mut self, lexicon: Arc<Vocabulary>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Splits, lowercases and lemmatizes `text`.
    ///
    /// # Errors
    /// - `Normalization` if the pre-tokenizer rejects the input
    pub fn normalize(&self, text: &str) -> Result<Vec<String>, ClassifierError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut normalized = NormalizedString::from(text);
        normalized.lowercase();

        let mut pretokenized = PreTokenizedString::from(normalized);
        BertPreTokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| ClassifierError::Normalization(e.to_string()))?;

        let lexicon = self.lexicon.as_deref();
        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Byte)
            .into_iter()
            .map(|(word, _, _)| word)
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .map(|word| self.lemmatizer.lemmatize(word, lexicon))
            .collect())
    }

    /// Same as [`normalize`](Self::normalize) for raw bytes off the wire.
    ///
    /// # Errors
    /// - `Normalization` if `bytes` is not valid UTF-8
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<Vec<String>, ClassifierError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ClassifierError::Normalization(format!("Input is not valid UTF-8: {}", e)))?;
        self.normalize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let normalizer = Normalizer::for_language("english");
        let lower = normalizer.normalize("hello").unwrap();
        assert_eq!(normalizer.normalize("Hello").unwrap(), lower);
        assert_eq!(normalizer.normalize("HELLO").unwrap(), lower);
        assert_eq!(lower, vec!["hello"]);
    }

    #[test]
    fn test_empty_input() {
        let normalizer = Normalizer::for_language("hindi");
        assert!(normalizer.normalize("").unwrap().is_empty());
        assert!(normalizer.normalize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_punctuation_dropped() {
        let normalizer = Normalizer::for_language("english");
        let tokens = normalizer.normalize("Hi, where is my order?!").unwrap();
        assert_eq!(tokens, vec!["hi", "where", "is", "my", "order"]);
    }

    fn english_with_lexicon(words: &[&str]) -> Normalizer {
        let lexicon = Vocabulary::new(words.iter().map(|w| w.to_string()).collect()).unwrap();
        Normalizer::for_language("english").with_lexicon(Arc::new(lexicon))
    }

    #[test]
    fn test_english_lemmas() {
        let normalizer = english_with_lexicon(&[
            "track", "shipment", "box", "delivery", "address", "child", "bus", "status",
        ]);
        let tokens = normalizer.normalize("Track shipments boxes deliveries addresses").unwrap();
        assert_eq!(tokens, vec!["track", "shipment", "box", "delivery", "address"]);

        let tokens = normalizer.normalize("children bus status").unwrap();
        assert_eq!(tokens, vec!["child", "bus", "status"]);
    }

    #[test]
    fn test_lemmas_must_exist_in_lexicon() {
        let normalizer = english_with_lexicon(&[
            "thanks", "purchase", "case", "response", "course", "tie", "news", "series",
        ]);
        let tokens = normalizer
            .normalize("Thanks purchases cases responses courses ties news series")
            .unwrap();
        assert_eq!(
            tokens,
            vec!["thanks", "purchase", "case", "response", "course", "tie", "news", "series"]
        );
    }

    #[test]
    fn test_unknown_words_pass_through() {
        let normalizer = english_with_lexicon(&["order"]);
        assert_eq!(normalizer.normalize("purchases").unwrap(), vec!["purchases"]);

        let bare = Normalizer::for_language("english");
        assert_eq!(bare.normalize("shipments children").unwrap(), vec!["shipments", "child"]);

        // Exceptions lead the candidates but do not hide the regular forms
        let singular = english_with_lexicon(&["thank"]);
        assert_eq!(singular.normalize("Thanks").unwrap(), vec!["thank"]);
    }

    #[test]
    fn test_contractions_split_on_apostrophe() {
        let normalizer = Normalizer::for_language("english");
        assert_eq!(normalizer.normalize("Don't").unwrap(), vec!["don", "t"]);
        assert_eq!(normalizer.normalize("I'm here").unwrap(), vec!["i", "m", "here"]);
    }

    #[test]
    fn test_non_english_unchanged() {
        let normalizer = Normalizer::for_language("hindi");
        let tokens = normalizer.normalize("नमस्ते दोस्तों").unwrap();
        assert_eq!(tokens, vec!["नमस्ते", "दोस्तों"]);
    }

    #[test]
    fn test_invalid_bytes() {
        let normalizer = Normalizer::for_language("english");
        let result = normalizer.normalize_bytes(&[0x68, 0x69, 0xff, 0xfe]);
        assert!(matches!(result, Err(ClassifierError::Normalization(_))));
        assert_eq!(normalizer.normalize_bytes(b"Hi").unwrap(), vec!["hi"]);
    }
}
