//! Zipper CLI
//!
//! Interleaves the pages of two PDFs, e.g. the fronts and backs of a
//! double-sided stack scanned on a single-sided feeder.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zipper_core::{zipper_merge_documents, MergeOptions, ProcessMetrics};

#[derive(Parser, Debug)]
#[command(name = "zipper")]
#[command(version, about = "Zipper merge two PDFs page by page")]
struct Args {
    /// PDF whose pages come first; its catalog and metadata are kept
    destination: PathBuf,

    /// PDF whose pages are zipped in after each destination page
    source: PathBuf,

    /// Where to write the merged PDF
    #[arg(short, long)]
    output: PathBuf,

    /// Take the source's pages last to first
    #[arg(long)]
    reverse_source: bool,

    /// Take the destination's pages last to first
    #[arg(long)]
    reverse_destination: bool,

    /// Print merge metrics as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Args {
    fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            reverse_source: self.reverse_source,
            reverse_destination: self.reverse_destination,
        }
    }
}

/// Read both inputs, merge, write the output. Nothing is written on failure.
fn run(args: &Args) -> Result<ProcessMetrics> {
    let destination = std::fs::read(&args.destination)
        .with_context(|| format!("Failed to read {}", args.destination.display()))?;
    let source = std::fs::read(&args.source)
        .with_context(|| format!("Failed to read {}", args.source.display()))?;

    let output = zipper_merge_documents(&source, &destination, &args.merge_options())
        .with_context(|| {
            format!(
                "Failed to merge {} into {}",
                args.source.display(),
                args.destination.display()
            )
        })?;

    std::fs::write(&args.output, &output.data)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(output.metrics)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout is reserved for --json output
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("zipper v{}", env!("CARGO_PKG_VERSION"));

    let metrics = run(&args)?;

    tracing::info!(
        "Wrote {} ({} pages, {} bytes) in {} ms",
        args.output.display(),
        metrics.page_count,
        metrics.output_size_bytes,
        metrics.processing_time_ms
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    }

    Ok(())
}
