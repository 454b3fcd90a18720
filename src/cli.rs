use crate::{
    checkpoint::CheckpointFile,
    config::Config,
    driver::BatchDriver,
    engine::{python::PythonEngine, OcrEngine},
    store,
    util::ensure_dir,
};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "ocr-batch")]
#[command(about = "Resumable OCR batch runner (checkpointed progress + bounded retry)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./ocr-batch.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the Python recognizer is reachable.
    Doctor {},
    /// Print resume state for the configured job.
    Status {},
    /// Process the item list, resuming from any checkpoint.
    Run {
        /// Override paths.input_file.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Override paths.output_file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let mut cfg = Config::load(&cfg_path)?;

    if let Command::Run { input, output } = &args.cmd {
        if let Some(p) = input {
            cfg.paths.input_file = p.display().to_string();
        }
        if let Some(p) = output {
            cfg.paths.output_file = p.display().to_string();
        }
    }

    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Status {} => status(&cfg),
        Command::Run { .. } => run(&cfg),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("ocr-batch.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("ocr-batch.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .map_err(|e| anyhow!("create log file {}: {e}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    let out_dir = Path::new(&cfg.paths.output_file)
        .parent()
        .unwrap_or_else(|| Path::new("."));
    Some(out_dir.join("ocr-batch.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = PythonEngine::new(cfg)?;
    let diag = engine.doctor()?;
    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn status(cfg: &Config) -> Result<()> {
    let ckpt = CheckpointFile::new(Path::new(&cfg.paths.checkpoint_file)).load();
    let output = Path::new(&cfg.paths.output_file);
    let results_on_disk = if output.exists() {
        store::load_items(output)
            .map(|items| items.iter().filter(|i| i.is_done()).count())
            .unwrap_or(0)
    } else {
        0
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "checkpoint": ckpt,
            "results_on_disk": results_on_disk,
        }))?
    );
    Ok(())
}

fn run(cfg: &Config) -> Result<()> {
    for path in [&cfg.paths.output_file, &cfg.paths.checkpoint_file] {
        if let Some(parent) = Path::new(path).parent() {
            ensure_dir(parent)?;
        }
    }

    let engine = PythonEngine::new(cfg)?;
    let driver = BatchDriver::new(cfg, engine);
    let report = driver.run()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
