mod input;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mpn_core::{DocumentRef, ValidationConfig, Validator};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mpn-validator")]
#[command(about = "Validate manufacturer part numbers against datasheet PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch datasheets and classify every part, writing verdicts as JSONL
    Run {
        /// Part records: a JSON/JSONL file or a directory of them
        #[arg(long)]
        parts: String,
        /// File with document references to search (one per line)
        #[arg(long)]
        documents: Option<String>,
        /// Output JSONL file path
        #[arg(long, default_value = "./mpn_validation.jsonl")]
        output: String,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(Args)]
struct Tuning {
    /// Documents per sequential fetch batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,
    /// Concurrent fetches within a batch
    #[arg(long, default_value_t = 16)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Overall budget per batch in seconds (0 disables)
    #[arg(long, default_value_t = 300)]
    batch_timeout_secs: u64,
    /// Minimum similarity for a fuzzy match
    #[arg(long, default_value_t = 0.65)]
    fuzzy_cutoff: f64,
    /// Documents with at most this many characters are reported as OCR-only
    #[arg(long, default_value_t = 100)]
    unreadable_threshold: usize,
    /// Matcher threads (0 = available parallelism)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// User-Agent header for datasheet requests
    #[arg(long)]
    user_agent: Option<String>,
}

impl Tuning {
    fn config(&self) -> ValidationConfig {
        let mut config = ValidationConfig::default();
        config.corpus.batch_size = self.batch_size;
        config.corpus.concurrency = self.concurrency;
        config.corpus.batch_timeout = (self.batch_timeout_secs > 0).then(|| Duration::from_secs(self.batch_timeout_secs));
        config.fetch.timeout = Duration::from_secs(self.timeout_secs);
        if let Some(ua) = &self.user_agent {
            config.fetch.user_agent = ua.clone();
        }
        config.matching.fuzzy_cutoff = self.fuzzy_cutoff;
        config.matching.unreadable_threshold = self.unreadable_threshold;
        config.matching.workers = self.workers;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current batch");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Run { parts, documents, output, tuning } => {
            run(&parts, documents.as_deref(), &output, &tuning, &cancel).await
        }
    }
}

async fn run(
    parts_path: &str,
    documents_path: Option<&str>,
    output: &str,
    tuning: &Tuning,
    cancel: &CancellationToken,
) -> Result<()> {
    let validator = Validator::new(tuning.config())?;
    let parts = input::load_parts(parts_path)?;
    let documents: Vec<DocumentRef> = match documents_path {
        Some(path) => input::load_documents(path)?,
        None => Vec::new(),
    };

    let report = validator.validate(&documents, parts, cancel).await;

    input::write_verdicts(output, &report.verdicts)?;
    for (status, count) in report.status_counts() {
        tracing::info!(status = status.label(), count, "verdicts");
    }
    tracing::info!(verdicts = report.verdicts.len(), output, "validation complete");
    Ok(())
}
