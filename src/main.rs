//! shelfscan - command line front end
//!
//! Runs the segmentation and catalog correction stages on saved recognizer
//! and extractor output.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shelfscan::catalog::CatalogMatcher;
use shelfscan::config::{self, AppConfig, CONFIG_FILE_NAME};
use shelfscan::extract::JsonResponseExtractor;
use shelfscan::pipeline::BookScanner;
use shelfscan::segmentation::segment_ocr_results;
use shelfscan::storage::{self, snapshot_or_empty, CatalogSource, JsonCatalog, SqliteCatalog};
use shelfscan::vision::{load_ocr_results, JsonFileRecognizer, RecognizerHandle};
use shelfscan::BookRecord;

/// shelfscan - regroup book spine OCR text and correct extracted records
#[derive(Parser, Debug)]
#[command(name = "shelfscan")]
#[command(about = "Book spine OCR segmentation and catalog-based correction")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Segment saved OCR results and print the text sent to the extractor
    Segment {
        /// JSON file with recognizer results
        ocr: PathBuf,
    },
    /// Correct extracted records against the catalog and print them as JSON
    Enhance {
        /// JSON file with extracted records
        #[arg(long)]
        records: PathBuf,

        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Run the full pipeline for one photo and save the books to the catalog
    Scan {
        /// Photo of the shelf
        image: PathBuf,

        /// Saved extractor reply for this photo
        #[arg(long)]
        response: PathBuf,

        /// Recognizer results (defaults to <image>.ocr.json)
        #[arg(long)]
        ocr: Option<PathBuf>,

        /// Print the report without saving the books
        #[arg(long)]
        no_save: bool,

        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// JSON catalog file
    #[arg(long, conflicts_with = "database")]
    catalog: Option<PathBuf>,

    /// SQLite database with a books table
    #[arg(long)]
    database: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => storage::get_config_dir()?.join(CONFIG_FILE_NAME),
    };
    let (config, origin) = config::load_or_default(&config_path);

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    origin.report(&config_path);

    match cli.command {
        Command::Segment { ocr } => run_segment(&ocr, &config),
        Command::Enhance { records, catalog } => run_enhance(&records, &catalog, &config),
        Command::Scan {
            image,
            response,
            ocr,
            no_save,
            catalog,
        } => run_scan(&image, &response, ocr, !no_save, &catalog, &config),
        Command::Config { write } => run_config(&config, &config_path, write),
    }
}

fn run_segment(ocr: &Path, config: &AppConfig) -> Result<()> {
    let results = load_ocr_results(ocr).with_context(|| format!("Failed to read OCR results {:?}", ocr))?;
    let segmentation = segment_ocr_results(&results, &config.segmentation);

    info!(
        "Found {} books, clustered along {}",
        segmentation.book_count(),
        segmentation.cluster_axis()
    );
    println!("{}", segmentation.text);
    Ok(())
}

fn run_enhance(records: &Path, catalog: &CatalogArgs, config: &AppConfig) -> Result<()> {
    let content = std::fs::read_to_string(records).with_context(|| format!("Failed to read {:?}", records))?;
    let records: Vec<BookRecord> = serde_json::from_str(&content).context("Invalid records file")?;

    let source = open_catalog(catalog, config);
    let snapshot = snapshot_or_empty(source.as_deref(), config.matching.catalog_limit);

    let matcher = CatalogMatcher::new(&snapshot, config.matching.clone());
    let enhanced: Vec<BookRecord> = matcher
        .enhance_all(records)
        .into_iter()
        .map(|e| e.record)
        .collect();

    println!("{}", serde_json::to_string_pretty(&enhanced)?);
    Ok(())
}

fn run_scan(
    image: &Path,
    response: &Path,
    ocr: Option<PathBuf>,
    save: bool,
    catalog: &CatalogArgs,
    config: &AppConfig,
) -> Result<()> {
    let reply = std::fs::read_to_string(response).with_context(|| format!("Failed to read {:?}", response))?;

    let recognizer = RecognizerHandle::lazy(move || {
        Ok(match &ocr {
            Some(path) => JsonFileRecognizer::with_results_file(path),
            None => JsonFileRecognizer::new(),
        })
    });
    let extractor = JsonResponseExtractor::new(reply, config.extraction.default_confidence as f32);

    let mut scanner = BookScanner::new(recognizer, Box::new(extractor), config.clone());
    if let Some(source) = open_catalog(catalog, config) {
        scanner = scanner.with_catalog(source);
    }

    let report = scanner.scan(image)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if save {
        scanner
            .save(&report, image)
            .with_context(|| format!("Failed to save books from {:?}", image))?;
    }
    Ok(())
}

fn run_config(config: &AppConfig, path: &Path, write: bool) -> Result<()> {
    if write {
        config::save_config(config, path)?;
        info!("Wrote configuration to {:?}", path);
    }
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Catalog from the command line, falling back to the configured one.
///
/// A database that cannot be opened is treated like no catalog at all.
fn open_catalog(args: &CatalogArgs, config: &AppConfig) -> Option<Box<dyn CatalogSource>> {
    let database = args.database.as_ref().or(config.storage.database_path.as_ref());
    let json = args.catalog.as_ref().or(config.storage.catalog_path.as_ref());

    if args.catalog.is_none() {
        if let Some(path) = database {
            return match SqliteCatalog::open(path) {
                Ok(db) => Some(Box::new(db)),
                Err(e) => {
                    warn!("Failed to open database {:?}, continuing without catalog: {}", path, e);
                    None
                }
            };
        }
    }

    json.map(|path| Box::new(JsonCatalog::new(path)) as Box<dyn CatalogSource>)
}
