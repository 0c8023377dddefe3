use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagestitch_engine::{ChunkingEngine, EngineConfig};
use pagestitch_producer::{prompts::SYSTEM_PROMPT, CancellationToken, ScriptedProducer};
use pagestitch_protocol::{event_response_schema, RESPONSE_SCHEMA_VERSION};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod replay;

use replay::Replay;

#[derive(Parser)]
#[command(name = "pagestitch")]
#[command(about = "Event-driven chunking of paginated documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a recorded document by replaying its producer responses
    Run(RunArgs),

    /// Print the JSON schema of producer responses
    Schema,

    /// Print the system prompt sent with every batch
    Prompt,
}

#[derive(Args)]
struct RunArgs {
    /// Replay file: {"pages": {"1": "..."}, "responses": [...]}
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on text that belongs to no chunk instead of warning
    #[arg(long)]
    strict: bool,

    /// Attempts per batch, including the first
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Pages per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Document name recorded in chunk metadata (default: replay file name)
    #[arg(long)]
    document: Option<String>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Schema => {
            let schema = event_response_schema();
            log::debug!("Response schema version {RESPONSE_SCHEMA_VERSION}");
            print_stdout(&serde_json::to_string_pretty(&schema)?)
        }
        Commands::Prompt => print_stdout(SYSTEM_PROMPT),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let replay = Replay::load(&args.input)?;
    let document = args
        .document
        .clone()
        .or_else(|| replay.document.clone())
        .unwrap_or_else(|| document_name(&args.input));

    let producer = Arc::new(ScriptedProducer::new(replay.response_bodies()));
    let engine = ChunkingEngine::new(producer.clone(), config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let outcome = engine
        .process_document(&document, &replay.pages, &cancel)
        .await
        .with_context(|| format!("Failed to chunk {document}"))?;

    if producer.remaining() > 0 {
        log::warn!(
            "{} recorded response(s) were not used",
            producer.remaining()
        );
    }

    let json = if args.compact {
        serde_json::to_string(&outcome.records)?
    } else {
        serde_json::to_string_pretty(&outcome.records)?
    };
    print_stdout(&json)
}

/// Defaults, then the config file, then `PAGESTITCH_*` variables, then flags
fn resolve_config(args: &RunArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    if args.strict {
        config.stitcher.strict_trailing_text = true;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.retry.max_attempts = max_attempts;
    }
    if let Some(batch_size) = args.batch_size {
        config.batching.page_batch_size = batch_size;
    }
    config
        .validate()
        .map_err(|err| anyhow::anyhow!("Invalid configuration: {err}"))?;
    Ok(config)
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
