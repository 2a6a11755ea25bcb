use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use story_gallery::manifest::{MANIFEST_FILE, ManifestSource};
use story_gallery::nav::UrlState;
use story_gallery::{date, gallery, listing, serve};

#[derive(Parser)]
#[command(name = "story-gallery", about = "Date-grouped photo gallery over a scanned JSON manifest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the gallery page to a static HTML file
    Render {
        /// Manifest path or http(s) URL
        manifest: String,
        /// Output file (default: gallery.html next to the manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Show the oldest dates first
        #[arg(long)]
        ascending: bool,
        /// Only show dates matching this text
        #[arg(short, long)]
        query: Option<String>,
        /// Open the lightbox on this image (index in display order)
        #[arg(long)]
        photo: Option<usize>,
    },
    /// Serve the gallery directory over HTTP
    Serve {
        /// Directory containing the manifest and the images
        dir: PathBuf,
        /// Server port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// Manifest file name inside the directory
        #[arg(short, long, default_value = MANIFEST_FILE)]
        manifest: String,
    },
    /// Print manifest statistics
    Stats {
        /// Manifest path or http(s) URL
        manifest: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_stats(source: &ManifestSource) -> Result<()> {
    let entries = source
        .load()
        .with_context(|| format!("Cannot load gallery data from {source}"))?;
    let stats = listing::compute_stats(&entries);
    println!("  {} {}", style("Dates").bold(), stats.date_count);
    println!("  {} {}", style("Stories").bold(), stats.image_count);
    println!(
        "  {} {} ({})",
        style("Latest").bold(),
        style(&stats.latest_date).cyan(),
        date::format_date(&stats.latest_date)
    );
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            manifest,
            output,
            ascending,
            query,
            photo,
        } => {
            let state = UrlState {
                query: query.unwrap_or_default(),
                ascending,
                photo,
            };
            gallery::run_render(&ManifestSource::parse(&manifest), output, &state)
        }
        Commands::Serve {
            dir,
            port,
            manifest,
        } => serve::run_serve(&dir, port, &manifest),
        Commands::Stats { manifest } => run_stats(&ManifestSource::parse(&manifest)),
    }
}
