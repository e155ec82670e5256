use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use erc2470_miner::{
    Coordinator, FACTORY_ADDRESS, Pattern, RunConfig, SearchOptions, SearchOutcome,
    SearchResult, checksum_encode, config,
    progress::{LogSink, SpinnerSink},
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// High-performance ERC-2470 address miner.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("pattern").required(true).args(["target", "prefix", "suffix"])))]
#[command(group(ArgGroup::new("init_code").required(true).args(["bytecode", "bytecode_file"])))]
struct Args {
    /// Number of worker threads
    #[arg(short = 'w', long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Exact 20-byte address to find (hex)
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Address prefix to match (hex, 1-20 bytes)
    #[arg(short = 'p', long)]
    prefix: Option<String>,

    /// Address suffix to match (hex, 1-20 bytes)
    #[arg(short = 's', long)]
    suffix: Option<String>,

    /// Contract init code (hex)
    #[arg(short = 'B', long)]
    bytecode: Option<String>,

    /// File containing contract init code (hex)
    #[arg(short = 'F', long)]
    bytecode_file: Option<PathBuf>,

    /// Report progress periodically
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Progress interval in seconds
    #[arg(short = 'i', long, default_value_t = 5)]
    log_interval: u64,

    /// Append log output to this file instead of stdout
    #[arg(short = 'l', long)]
    log_file: Option<PathBuf>,

    /// Keep the lowest address seen, even when it does not match
    #[arg(long)]
    track_best: bool,
}

impl Args {
    fn pattern(&self) -> Result<Pattern> {
        let pattern = match (&self.target, &self.prefix, &self.suffix) {
            (Some(target), _, _) => Pattern::exact_from_hex(target)?,
            (_, Some(prefix), _) => Pattern::prefix_from_hex(prefix)?,
            (_, _, Some(suffix)) => Pattern::suffix_from_hex(suffix)?,
            _ => anyhow::bail!("must specify either --target, --prefix, or --suffix"),
        };
        Ok(pattern)
    }

    fn init_code(&self) -> Result<Vec<u8>> {
        let code = match (&self.bytecode_file, &self.bytecode) {
            (Some(path), _) => config::init_code_from_file(path)?,
            (_, Some(code)) => config::init_code_from_hex(code)?,
            _ => anyhow::bail!("must specify either --bytecode or --bytecode-file"),
        };
        Ok(code)
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

fn log_result(result: &SearchResult) {
    info!("Salt: {}", result.salt_hex());
    info!("Address: {}", result.checksum_address());
    info!("Attempts: {}", result.attempts);
    info!("Duration: {:?}", result.duration);
    info!("Rate: {:.2} hashes/sec", result.rate());
}

fn log_outcome(outcome: &SearchOutcome, interrupted: bool) {
    match &outcome.best {
        Some(best) if best.matched => {
            info!("Found match!");
            log_result(best);
        }
        Some(best) => {
            info!("Current best result (lowest address found):");
            log_result(best);
        }
        None if interrupted => info!("Mining stopped by user."),
        None => info!("No match found."),
    }
    info!(
        "Total: {} attempts in {:?} ({:.2} hashes/sec)",
        outcome.attempts,
        outcome.elapsed,
        outcome.rate()
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let pattern = args.pattern().context("invalid address pattern")?;
    let init_code = args.init_code().context("invalid init code")?;
    let config = RunConfig::new(&init_code, pattern)?.track_best(args.track_best);

    let mut options = SearchOptions::new(args.workers)?;
    if args.verbose {
        options = options.progress_every(args.log_interval)?;
    }

    info!("Starting ERC-2470 address miner with {} workers...", options.workers);
    info!("Target: {}", config.pattern);
    info!("Factory address: {}", checksum_encode(&FACTORY_ADDRESS));
    match (&args.bytecode_file, &args.bytecode) {
        (Some(path), _) => info!("Bytecode file: {}", path.display()),
        (_, Some(code)) => info!("Bytecode: {}...", code.chars().take(20).collect::<String>()),
        _ => {}
    }

    let mut coordinator = Coordinator::new(config, options);
    if args.verbose {
        info!("Mining started, logging every {} seconds...", args.log_interval);
        coordinator = if args.log_file.is_some() {
            coordinator.with_progress(LogSink)
        } else {
            coordinator.with_progress(SpinnerSink::new())
        };
    }
    let coordinator = Arc::new(coordinator);

    let interrupted = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler({
        let coordinator = Arc::clone(&coordinator);
        let interrupted = Arc::clone(&interrupted);
        move || {
            interrupted.store(true, Ordering::SeqCst);
            coordinator.stop();
        }
    })
    .context("failed to install Ctrl-C handler")?;

    let outcome = coordinator.run()?;
    let interrupted = interrupted.load(Ordering::SeqCst);
    if interrupted {
        info!("Received interrupt signal (Ctrl+C). Miners stopped.");
    }
    log_outcome(&outcome, interrupted);

    Ok(())
}
