//! Extract command - write figure crops and page renders.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use jrcfig_core::{FigureExtractor, Pass, PdfiumBackend};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args, Default)]
pub struct ExtractArgs {
    /// Project root holding the PDF and the assets directory (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Input PDF, relative to the root
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Output directory, relative to the root
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

const INSTALL_HINT: &str = "Install PDFium: download libpdfium for your platform from \
https://github.com/bblanchon/pdfium-binaries and place it in the working directory, \
in ./vendor/pdfium/lib/, in $PDFIUM_DYNAMIC_LIB_PATH, or on the system library path";

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Nothing is read or written until the renderer is available
    let backend = match PdfiumBackend::bind() {
        Ok(backend) => backend,
        Err(e) => {
            debug!("{}", e);
            println!("{}", INSTALL_HINT);
            std::process::exit(1);
        }
    };

    let mut config = load_config(config_path)?;
    if let Some(pdf) = args.pdf {
        config.input.pdf_path = pdf;
    }
    if let Some(out_dir) = args.out_dir {
        config.output.dir = out_dir;
    }
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let extractor = FigureExtractor::from_root(&config, &root);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let report = extractor.run_with_progress(&backend, |progress| {
        pb.set_message(match progress.pass {
            Pass::EmbeddedImages => "Extracting embedded images...",
            Pass::FullPages => "Rendering pages...",
        });
        pb.set_length(progress.total as u64);
        pb.set_position(progress.done as u64);
    })?;

    pb.finish_and_clear();

    if report.skipped_images > 0 {
        warn!(
            "{} images were skipped because their placements could not be read",
            report.skipped_images
        );
    }

    println!(
        "Saved {} images to {}",
        report.saved.len(),
        report.out_dir.display()
    );
    for name in report.sorted_names() {
        println!("  {}", name);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
