use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use vernacular::{
    rank, ClassifierError, IntentCorpus, IntentEngine, IntentScorer, LanguageModel, ModelRegistry, Normalizer,
    Vocabulary, DEFAULT_THRESHOLD,
};

const SHORT_TEXT: &str = "Hi there!";
const LONG_TEXT: &str = "Hello, I was wondering whether the store opens on Sundays, \
    and if it does, what the opening hours are. My friends told me the shops \
    were closing early this week because of the holidays.";

/// Weighted sum over the feature vector, one weight row per class
#[derive(Debug)]
struct LinearScorer {
    weights: Vec<Vec<f32>>,
}

impl IntentScorer for LinearScorer {
    fn score(&self, features: ArrayView1<'_, f32>) -> Result<Vec<f32>, ClassifierError> {
        Ok(self
            .weights
            .iter()
            .map(|row| row.iter().zip(features.iter()).map(|(w, x)| w * x).sum())
            .collect())
    }

    fn dimensions(&self) -> Option<(usize, usize)> {
        Some((self.weights.first().map_or(0, Vec::len), self.weights.len()))
    }
}

fn vocabulary_entries(size: usize) -> Vec<String> {
    let mut entries = vec!["hi".to_string(), "hello".to_string(), "store".to_string()];
    entries.extend((entries.len()..size).map(|i| format!("token{}", i)));
    entries
}

fn setup_engine(vocabulary_size: usize, classes: usize) -> IntentEngine {
    let weights = (0..classes)
        .map(|c| (0..vocabulary_size).map(|i| if i % classes == c { 0.3 } else { 0.0 }).collect())
        .collect();
    let labels: Vec<String> = (0..classes).map(|c| format!("intent{}", c)).collect();

    let model = LanguageModel::builder("english")
        .with_vocabulary(vocabulary_entries(vocabulary_size))
        .unwrap()
        .with_classes(labels.clone())
        .unwrap()
        .with_scorer(Arc::new(LinearScorer { weights }))
        .build()
        .unwrap();
    let corpus = IntentCorpus::from_pairs(labels.iter().map(|l| (l.as_str(), vec!["Sure.", "Okay."]))).unwrap();

    let registry = ModelRegistry::builder().add_model(model).add_corpus("english", corpus).build();
    IntentEngine::new(Arc::new(registry))
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalization");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let english = Normalizer::for_language("english");
    let hindi = Normalizer::for_language("hindi");

    group.bench_function("english_short", |b| b.iter(|| english.normalize(black_box(SHORT_TEXT)).unwrap()));
    group.bench_function("english_long", |b| b.iter(|| english.normalize(black_box(LONG_TEXT)).unwrap()));
    group.bench_function("hindi_short", |b| {
        b.iter(|| hindi.normalize(black_box("नमस्ते, आप कैसे हैं?")).unwrap())
    });

    group.finish();
}

fn bench_vectorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vectorization");
    let tokens = Normalizer::for_language("english").normalize(LONG_TEXT).unwrap();

    for size in [100, 1_000, 10_000] {
        let vocabulary = Vocabulary::new(vocabulary_entries(size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &vocabulary, |b, vocabulary| {
            b.iter(|| vocabulary.vectorize(black_box(tokens.as_slice())))
        });
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ranking");

    for classes in [10, 100] {
        let labels: Vec<String> = (0..classes).map(|c| format!("intent{}", c)).collect();
        let scores: Vec<f32> = (0..classes).map(|c| (c % 7) as f32 / 7.0).collect();
        group.bench_with_input(BenchmarkId::from_parameter(classes), &scores, |b, scores| {
            b.iter(|| rank(black_box(scores.as_slice()), &labels, DEFAULT_THRESHOLD).unwrap())
        });
    }

    group.finish();
}

fn bench_reply(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reply");
    group.sample_size(50);

    let engine = setup_engine(1_000, 20);
    let mut rng = StdRng::seed_from_u64(42);

    group.bench_function("classify_short", |b| {
        b.iter(|| engine.classify(black_box(SHORT_TEXT), "english").unwrap())
    });
    group.bench_function("reply_long", |b| {
        b.iter(|| engine.reply(black_box(LONG_TEXT), "english", &mut rng).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_normalization, bench_vectorization, bench_ranking, bench_reply);
criterion_main!(benches);
