use std::collections::HashMap;

use log::warn;
use rand::Rng;
use serde::Deserialize;

use crate::classifier::{ArtifactError, ClassificationResult};

/// Returned whenever no canned response applies.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I don't understand that.";

/// On-disk shape of an intents file. `patterns` belongs to the training tool and is
/// accepted but not kept.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentDocument {
    pub intents: Vec<IntentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentEntry {
    pub tag: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

/// Response templates of one language, keyed by intent tag.
#[derive(Debug, Clone, Default)]
pub struct IntentCorpus {
    responses: HashMap<String, Vec<String>>,
}

impl IntentCorpus {
    /// Builds a corpus from a parsed intents document.
    ///
    /// The first entry for a tag wins; later duplicates are ignored with a warning.
    ///
    /// # Errors
    /// - `Invalid` if a tag is empty or has no responses
    pub fn from_document(document: IntentDocument) -> Result<Self, ArtifactError> {
        let mut responses = HashMap::with_capacity(document.intents.len());
        for entry in document.intents {
            if entry.tag.is_empty() {
                return Err(ArtifactError::Invalid {
                    artifact: "intent corpus".into(),
                    reason: "intent with an empty tag".into(),
                });
            }
            if entry.responses.is_empty() {
                return Err(ArtifactError::Invalid {
                    artifact: "intent corpus".into(),
                    reason: format!("intent '{}' has no responses", entry.tag),
                });
            }
            if responses.contains_key(&entry.tag) {
                warn!("Duplicate intent '{}' in corpus, keeping the first entry", entry.tag);
                continue;
            }
            responses.insert(entry.tag, entry.responses);
        }
        Ok(Self { responses })
    }

    /// Convenience constructor from `(tag, templates)` pairs
    pub fn from_pairs<I, T, R>(pairs: I) -> Result<Self, ArtifactError>
    where
        I: IntoIterator<Item = (T, Vec<R>)>,
        T: Into<String>,
        R: Into<String>,
    {
        Self::from_document(IntentDocument {
            intents: pairs
                .into_iter()
                .map(|(tag, responses)| IntentEntry {
                    tag: tag.into(),
                    patterns: Vec::new(),
                    responses: responses.into_iter().map(Into::into).collect(),
                })
                .collect(),
        })
    }

    pub fn responses(&self, tag: &str) -> Option<&[String]> {
        self.responses.get(tag).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Class labels in `classes` that have no response templates here
    pub fn uncovered<'a>(&self, classes: &'a [String]) -> Vec<&'a str> {
        classes
            .iter()
            .map(String::as_str)
            .filter(|class| !self.responses.contains_key(*class))
            .collect()
    }
}

/// Picks the reply for a ranked intent list.
///
/// Uses the top-ranked intent only. Falls back to [`FALLBACK_RESPONSE`] when the list
/// is empty or the tag has no templates; otherwise picks a template uniformly with
/// `rng`.
pub fn select_response<R: Rng + ?Sized>(
    results: &[ClassificationResult],
    corpus: &IntentCorpus,
    rng: &mut R,
) -> String {
    let Some(top) = results.first() else {
        return FALLBACK_RESPONSE.to_string();
    };
    match corpus.responses(&top.intent) {
        Some(templates) if !templates.is_empty() => {
            templates[rng.random_range(0..templates.len())].clone()
        }
        _ => FALLBACK_RESPONSE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus() -> IntentCorpus {
        IntentCorpus::from_pairs(vec![
            ("greeting", vec!["Hello!", "Hi there!", "Namaste!"]),
            ("farewell", vec!["Goodbye!"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fallbacks() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_response(&[], &corpus, &mut rng), FALLBACK_RESPONSE);

        let unknown = vec![ClassificationResult::new("refund", 0.8)];
        assert_eq!(select_response(&unknown, &corpus, &mut rng), FALLBACK_RESPONSE);
    }

    #[test]
    fn test_uncovered_classes() {
        let corpus = corpus();
        let classes: Vec<String> = ["greeting", "order", "farewell", "refund"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(corpus.uncovered(&classes), vec!["order", "refund"]);
        assert!(corpus.uncovered(&classes[..1]).is_empty());
    }

    #[test]
    fn test_top_intent_only() {
        let corpus = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let results = vec![
            ClassificationResult::new("farewell", 0.7),
            ClassificationResult::new("greeting", 0.3),
        ];
        assert_eq!(select_response(&results, &corpus, &mut rng), "Goodbye!");
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let corpus = corpus();
        let results = vec![ClassificationResult::new("greeting", 0.9)];

        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| select_response(&results, &corpus, &mut rng))
                .collect::<Vec<_>>()
        };
        let first = pick(42);
        assert_eq!(first, pick(42));
        assert!(first.iter().all(|r| corpus.responses("greeting").unwrap().contains(r)));
    }

    #[test]
    fn test_rejects_empty_responses() {
        let result = IntentCorpus::from_pairs(vec![("greeting", Vec::<String>::new())]);
        assert!(matches!(result, Err(ArtifactError::Invalid { .. })));
    }

    #[test]
    fn test_duplicate_tag_keeps_first() {
        let corpus = IntentCorpus::from_pairs(vec![
            ("greeting", vec!["Hello!"]),
            ("greeting", vec!["Howdy!"]),
        ])
        .unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.responses("greeting").unwrap(), ["Hello!".to_string()]);
    }

    #[test]
    fn test_parse_document() {
        let json = r#"{"intents": [
            {"tag": "greeting", "patterns": ["Hi", "Hello"], "responses": ["Hello!"]},
            {"tag": "shipment_status", "responses": ["Your shipment is on its way."]}
        ]}"#;
        let document: IntentDocument = serde_json::from_str(json).unwrap();
        let corpus = IntentCorpus::from_document(document).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.responses("shipment_status").is_some());
    }
}
