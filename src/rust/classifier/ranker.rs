use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// Minimum score a class must strictly exceed to be reported.
pub const DEFAULT_THRESHOLD: f32 = 0.25;

/// One plausible intent for a message, as returned to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: String,
    pub probability: f32,
}

impl ClassificationResult {
    pub fn new(intent: impl Into<String>, probability: f32) -> Self {
        Self {
            intent: intent.into(),
            probability,
        }
    }
}

/// Filters `scores` by `threshold` and orders the survivors by descending probability.
///
/// `scores[i]` belongs to `classes[i]`. Only scores strictly above the threshold are
/// kept; equal scores keep their class order. NaN never clears the threshold.
/// An empty result is a normal outcome.
///
/// # Errors
/// - `Classification` if `scores` and `classes` differ in length
pub fn rank(
    scores: &[f32],
    classes: &[String],
    threshold: f32,
) -> Result<Vec<ClassificationResult>, ClassifierError> {
    if scores.len() != classes.len() {
        return Err(ClassifierError::Classification(format!(
            "Model produced {} scores for {} classes",
            scores.len(),
            classes.len()
        )));
    }

    let mut kept: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score > threshold)
        .collect();

    // sort_by is stable, so ties stay in class order
    kept.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(kept
        .into_iter()
        .map(|(i, score)| ClassificationResult::new(classes[i].clone(), score.clamp(0.0, 1.0)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_threshold_is_strict() {
        let labels = classes(&["a", "b", "c"]);
        let results = rank(&[0.25, 0.2501, 0.1], &labels, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].intent, "b");
        assert!(results.iter().all(|r| r.probability > DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_descending_order() {
        let labels = classes(&["greeting", "farewell", "order", "track"]);
        let results = rank(&[0.3, 0.9, 0.05, 0.6], &labels, DEFAULT_THRESHOLD).unwrap();
        let intents: Vec<_> = results.iter().map(|r| r.intent.as_str()).collect();
        assert_eq!(intents, vec!["farewell", "track", "greeting"]);
        assert!(results.windows(2).all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_ties_keep_class_order() {
        let labels = classes(&["first", "second", "third"]);
        let results = rank(&[0.4, 0.4, 0.5], &labels, DEFAULT_THRESHOLD).unwrap();
        let intents: Vec<_> = results.iter().map(|r| r.intent.as_str()).collect();
        assert_eq!(intents, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_nothing_clears() {
        let labels = classes(&["greeting", "farewell"]);
        assert!(rank(&[0.1, 0.05], &labels, DEFAULT_THRESHOLD).unwrap().is_empty());
        assert!(rank(&[f32::NAN, 0.05], &labels, DEFAULT_THRESHOLD).unwrap().is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        let labels = classes(&["greeting", "farewell"]);
        let result = rank(&[0.9], &labels, DEFAULT_THRESHOLD);
        assert!(matches!(result, Err(ClassifierError::Classification(_))));
    }
}
