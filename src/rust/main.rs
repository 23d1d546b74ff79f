use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vernacular::{
    ArtifactStore, ClassifierError, IntentEngine, ModelRegistry, RegistryConfig, DEFAULT_THRESHOLD,
    SUPPORTED_LANGUAGES,
};

#[derive(Parser)]
#[command(author, version, about = "Chat with the intent classifier from the terminal", long_about = None)]
struct Args {
    /// Directory holding models/ and intents/ (defaults to $VERNACULAR_ARTIFACTS or the platform data dir)
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Language to chat in
    #[arg(short, long, default_value = "english")]
    language: String,

    /// Answer a single message and exit instead of starting a chat loop
    #[arg(short, long)]
    message: Option<String>,

    /// Minimum score an intent must exceed
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Seed for reply selection, for reproducible sessions
    #[arg(short, long)]
    seed: Option<u64>,

    /// Load languages that ship without a manifest (artifact versions are not cross-checked)
    #[arg(long)]
    allow_missing_manifest: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let language = args.language.to_lowercase();
    if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
        bail!(
            "Unsupported language. Supported languages are: {}.",
            SUPPORTED_LANGUAGES.join(", ")
        );
    }

    let start_time = Instant::now();
    let config = RegistryConfig::default()
        .with_artifacts_dir(args.artifacts.unwrap_or_else(ArtifactStore::default_root))
        .with_require_manifest(!args.allow_missing_manifest);
    let registry = ModelRegistry::load_concurrent(config).await;
    info!("=== Registry loaded (took {:.2?}) ===", start_time.elapsed());

    for status in registry.status() {
        info!(
            "{}: model={} intents={}",
            status.language, status.model_loaded, status.corpus_loaded
        );
    }

    let engine = IntentEngine::new(Arc::new(registry)).with_threshold(args.threshold);
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    if let Some(message) = args.message {
        println!("{}", answer(&engine, &message, &language, &mut rng)?);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("You: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let message = line?;
        let message = message.trim();
        if matches!(message.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        if message.is_empty() {
            continue;
        }
        match answer(&engine, message, &language, &mut rng) {
            Ok(response) => println!("Bot: {}", response),
            Err(e) => eprintln!("Bot: {}", e),
        }
    }

    Ok(())
}

fn answer(engine: &IntentEngine, message: &str, language: &str, rng: &mut StdRng) -> Result<String> {
    let start = Instant::now();
    match engine.reply(message, language, rng) {
        Ok(response) => {
            info!("Replied in {:.2?}", start.elapsed());
            Ok(response)
        }
        Err(ClassifierError::ModelUnavailable(language)) => {
            error!("Model not loaded for language: {}", language);
            bail!("Model not available for language: {}", language)
        }
        Err(e) => {
            error!("Intent prediction failed: {}", e);
            bail!("Intent prediction failed. Please try again later.")
        }
    }
}
