// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Massstab — fit images onto A4 landscape pages at standard scales.
//
// Entry point. Loads the configuration, initialises logging, and runs the
// requested subcommand.

mod logging;
mod summary;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use massstab_core::config::DEFAULT_CONFIG_FILE;
use massstab_core::error::{MassstabError, Result};
use massstab_core::{AppConfig, PageConfig};
use massstab_document::{BatchProcessor, BatchResult, PdfExporter, PdfReader, collect_inputs};
use massstab_print::{PrintDispatcher, open_document};

#[derive(Parser)]
#[command(name = "massstab")]
#[command(version)]
#[command(about = "Fit images onto A4 pages at 1:1, 1:2, 1:3 … and export or print them", long_about = None)]
struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log debug output to the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the images and write them to a PDF, one page per image
    Export {
        /// Image files or directories of images
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Destination PDF
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Open the PDF in the default viewer afterwards
        #[arg(long)]
        open: bool,
    },

    /// Compose the images and send them to the default printer
    Print {
        /// Image files or directories of images
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Show page count and page sizes of a PDF
    Inspect {
        #[arg(value_name = "PDF")]
        pdf: PathBuf,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::InitConfig { force } = &cli.command {
        return report(init_config(&cli.config, *force));
    }

    let config = tracing::subscriber::with_default(logging::bootstrap(), || {
        AppConfig::load(&cli.config)
    });
    logging::init(&config.logger, cli.verbose);
    info!(config = %cli.config.display(), "Massstab starting");

    let outcome = match cli.command {
        Commands::Export {
            inputs,
            output,
            open,
        } => export(&inputs, &output, open, &config.page).await,
        Commands::Print { inputs } => print(&inputs, &config.page).await,
        Commands::Inspect { pdf } => inspect(&pdf),
        Commands::InitConfig { .. } => Ok(()),
    };

    if let Err(e) = &outcome {
        error!(error = %e, "run failed");
    }
    report(outcome)
}

fn report(outcome: Result<()>) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn process(inputs: &[PathBuf], page: &PageConfig) -> Result<BatchResult> {
    let paths = collect_inputs(inputs)?;
    let result = BatchProcessor::new(page.clone()).process_batch(&paths);
    print!("{}", summary::render(&result));
    Ok(result)
}

async fn export(inputs: &[PathBuf], output: &Path, open: bool, page: &PageConfig) -> Result<()> {
    let result = process(inputs, page)?;
    let written = PdfExporter::from_config(page).export(&result.records, output)?;
    println!("PDF file: {}", written.display());

    if open {
        if let Err(e) = open_document(&written).await {
            warn!(path = %written.display(), error = %e, "could not open PDF");
        }
    }
    Ok(())
}

async fn print(inputs: &[PathBuf], page: &PageConfig) -> Result<()> {
    let result = process(inputs, page)?;
    if result.is_empty() {
        return Err(MassstabError::NothingToExport);
    }

    if !PrintDispatcher::new(page).print_batch(&result.records).await {
        return Err(MassstabError::Print("the document was not printed".into()));
    }
    println!("Sent {} page(s) to the default printer", result.records.len());
    Ok(())
}

fn inspect(pdf: &Path) -> Result<()> {
    let reader = PdfReader::open(pdf)?;
    println!("{}: {} page(s)", pdf.display(), reader.page_count());
    for (index, (width, height)) in reader.page_sizes_mm()?.into_iter().enumerate() {
        println!("  page {}: {:.1} x {:.1} mm", index + 1, width, height);
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(MassstabError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    AppConfig::default().write(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_export() {
        let cli = Cli::try_parse_from([
            "massstab", "export", "a.png", "scans", "-o", "out.pdf", "--open", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        match cli.command {
            Commands::Export {
                inputs,
                output,
                open,
            } => {
                assert_eq!(inputs, vec![PathBuf::from("a.png"), PathBuf::from("scans")]);
                assert_eq!(output, PathBuf::from("out.pdf"));
                assert!(open);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn export_requires_inputs_and_output() {
        assert!(Cli::try_parse_from(["massstab", "export", "-o", "out.pdf"]).is_err());
        assert!(Cli::try_parse_from(["massstab", "export", "a.png"]).is_err());
    }

    #[test]
    fn init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        init_config(&path, false).unwrap();
        assert!(AppConfig::read(&path).is_ok());
        assert!(matches!(
            init_config(&path, false),
            Err(MassstabError::Config(_))
        ));
        init_config(&path, true).unwrap();
    }

    #[test]
    fn export_writes_pdf_for_readable_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("plan.png");
        image::RgbImage::from_pixel(120, 60, image::Rgb([0, 0, 0]))
            .save(&image_path)
            .unwrap();
        let output = dir.path().join("out.pdf");
        let page = PageConfig {
            dpi: 72,
            margin: 20,
            caption_band_height: 40,
            font_dirs: Vec::new(),
            ..PageConfig::default()
        };

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime
            .block_on(export(&[image_path], &output, false, &page))
            .unwrap();
        assert_eq!(PdfReader::open(&output).unwrap().page_count(), 1);
    }

    #[test]
    fn export_with_nothing_readable_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let outcome = runtime.block_on(export(
            &[dir.path().join("missing.png")],
            &output,
            false,
            &PageConfig::default(),
        ));
        assert!(matches!(outcome, Err(MassstabError::NothingToExport)));
        assert!(!output.exists());
    }
}
