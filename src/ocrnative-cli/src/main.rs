//! OcrNative - Windows OCR from the command line
//!
//! Drives the same pipeline the exported library uses, for checking images and
//! installed language packs without a host application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ocrnative_engine::{EngineOptions, PlatformRecognizer, Recognizer};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod extract;

use config::Config;

#[derive(Parser)]
#[command(name = "ocrnative")]
#[command(about = "Extract text from images with the Windows OCR engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize text in one or more image files
    Extract {
        /// Image files (PNG, JPEG, BMP, GIF, TIFF, ...)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recognition language tag (e.g. "en-US")
        #[arg(short, long)]
        language: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Files recognized at once
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List installed recognition languages
    Languages,

    /// Check that an OCR engine can be created
    Check {
        /// Language tag to check instead of the user profile languages
        #[arg(short, long)]
        language: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for results
    let level = if cli.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { files, language, json, jobs } => {
            cmd_extract(&config, files, language, json, jobs)?;
        }
        Commands::Languages => {
            cmd_languages()?;
        }
        Commands::Check { language } => {
            cmd_check(&config, language)?;
        }
    }

    Ok(())
}

fn engine_options(config: &Config, language: Option<String>) -> EngineOptions {
    EngineOptions {
        language: language.or_else(|| config.ocr.language.clone()),
    }
}

fn cmd_extract(
    config: &Config,
    files: Vec<PathBuf>,
    language: Option<String>,
    json: bool,
    jobs: Option<usize>,
) -> Result<()> {
    let options = engine_options(config, language);
    let jobs = jobs.unwrap_or(config.extract.jobs);
    let json = json || config.extract.json;

    info!("extracting text from {} file(s), {} at a time", files.len(), jobs);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let results = runtime.block_on(extract::extract_all(files, options, jobs))?;

    let failed = results.iter().filter(|r| !r.is_success()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let single = results.len() == 1;
        for result in &results {
            match (&result.text, &result.error) {
                (Some(text), _) if single => println!("{}", text),
                (Some(text), _) => println!("==> {} <==\n{}\n", result.path.display(), text),
                (None, error) => error!(
                    "{}: {} ({})",
                    result.path.display(),
                    result.status,
                    error.as_deref().unwrap_or("unknown error")
                ),
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, results.len());
    }
    Ok(())
}

fn cmd_languages() -> Result<()> {
    let languages = ocrnative_engine::available_languages()
        .context("Failed to query recognizer languages")?;

    if languages.is_empty() {
        warn!("no OCR language packs installed");
    }
    for tag in languages {
        println!("{}", tag);
    }
    Ok(())
}

fn cmd_check(config: &Config, language: Option<String>) -> Result<()> {
    let options = engine_options(config, language);
    let target = options
        .language
        .clone()
        .unwrap_or_else(|| "user profile languages".to_string());

    info!("checking OCR engine for {}", target);

    if let Some(tag) = options.language.as_deref() {
        let supported = ocrnative_engine::is_language_supported(tag)
            .with_context(|| format!("Failed to query language '{}'", tag))?;
        if !supported {
            anyhow::bail!("language '{}' is not installed for recognition", tag);
        }
    }

    // A blank 1x1 BMP exercises decode, engine creation and recognition
    let recognizer = PlatformRecognizer::new(options);
    let text = recognizer
        .recognize(&BLANK_BMP)
        .with_context(|| format!("OCR engine unavailable for {}", target))?;

    info!("OCR engine OK ({} characters on blank probe)", text.len());
    println!("ok");
    Ok(())
}

/// 1x1 white 24-bit BMP
const BLANK_BMP: [u8; 56] = [
    0x42, 0x4D, 0x3A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x36, 0x00, 0x00, 0x00,
    0x28, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00,
    0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00,
];
