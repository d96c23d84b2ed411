//! # Labelpress CLI
//!
//! Command-line interface for rendering tape labels.
//!
//! ## Usage
//!
//! ```bash
//! # List media
//! labelpress media
//!
//! # Render one label to PNG
//! labelpress render label.json --png label.png --media tze-12
//!
//! # Also dump the PackBits raster lines
//! labelpress render label.json --png label.png --packbits label.bin
//!
//! # One PNG per parameter row, rendered in parallel
//! labelpress batch label.json rows.json --out-dir pages/ --contexts 4
//! ```
//!
//! `label.json` is either an array of items or an object
//! `{ "items": [...], "layout": {...} }`. `rows.json` is an array of
//! `{ "name": "value" }` objects.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use labelpress::{
    LabelError,
    batch::{self, FastPathRenderer},
    label::{LabelItem, Orientation, ParameterValues},
    pool::{PoolConfig, WorkerPagePool},
    printer::{MediaProfile, ResolutionProfile},
    protocol::raster,
    render::{LabelRenderer, LayoutOptions, PageRenderRequest, RenderedPage},
};

/// Labelpress - Tape label renderer
#[derive(Parser, Debug)]
#[command(name = "labelpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one label to PNG
    Render {
        /// Label JSON file
        label: PathBuf,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,

        /// Write PackBits raster lines (one length-prefixed line each)
        #[arg(long, value_name = "FILE")]
        packbits: Option<PathBuf>,

        #[command(flatten)]
        target: Target,
    },

    /// Render one page per parameter row
    Batch {
        /// Label JSON file
        label: PathBuf,

        /// Parameter rows JSON file
        rows: PathBuf,

        /// Output directory for page-NNN.png
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Execution contexts (0 renders sequentially)
        #[arg(long)]
        contexts: Option<usize>,

        /// Fail pages of lost contexts instead of re-rendering them locally
        #[arg(long)]
        no_fallback: bool,

        #[command(flatten)]
        target: Target,
    },

    /// List the media catalog
    Media,
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Media id (see `labelpress media`)
    #[arg(long, default_value = "tze-12")]
    media: String,

    /// Resolution profile: low or high
    #[arg(long, default_value = "low")]
    resolution: String,

    /// Lay items out top to bottom
    #[arg(long)]
    vertical: bool,

    /// Minimum label length in millimeters
    #[arg(long)]
    length_mm: Option<f32>,
}

/// Label file: a bare item array or items plus layout options.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelFile {
    Items(Vec<LabelItem>),
    Document {
        items: Vec<LabelItem>,
        #[serde(default)]
        layout: LayoutOptions,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Media => {
            println!("{:<10} {:>8} {:>10} {:>10}", "id", "width", "print", "margins");
            for media in MediaProfile::CATALOG {
                println!(
                    "{:<10} {:>6}mm {:>6}dots {:>4}/{:<4}",
                    media.id,
                    media.width_mm,
                    media.print_area_dots,
                    media.margin_start_dots,
                    media.margin_end_dots
                );
            }
        }

        Commands::Render {
            label,
            png,
            packbits,
            target,
        } => {
            let (items, options) = load_label(&label, &target)?;
            let (media, resolution) = target.profiles()?;

            let mut renderer = LabelRenderer::builtin();
            let page = renderer.render(&items, media, resolution, &options);
            save_png(&png, &page)?;
            println!("Saved {}x{} label to {}", page.width, page.height, png.display());

            if let Some(path) = packbits {
                let lines = raster::encode_page(&page)?;
                let mut out = Vec::new();
                for line in &lines {
                    out.push(line.len() as u8);
                    out.extend_from_slice(line);
                }
                fs::write(&path, &out)?;
                println!("Wrote {} raster lines to {}", lines.len(), path.display());
            }
        }

        Commands::Batch {
            label,
            rows,
            out_dir,
            contexts,
            no_fallback,
            target,
        } => {
            let (items, options) = load_label(&label, &target)?;
            let (media, resolution) = target.profiles()?;
            let rows: Vec<ParameterValues> = serde_json::from_str(&fs::read_to_string(&rows)?)?;
            let requests = PageRenderRequest::for_rows(&items, media, resolution, options, rows);

            let mut config = PoolConfig::default();
            if let Some(n) = contexts {
                config.contexts = n;
            }
            config.local_fallback = !no_fallback;

            let runtime = tokio::runtime::Runtime::new()?;
            let results = runtime.block_on(async {
                let mut pool = WorkerPagePool::new(config, FastPathRenderer::builtin);
                let mut local = LabelRenderer::builtin();
                batch::render_batch(&mut pool, &mut local, requests).await
            });

            fs::create_dir_all(&out_dir)?;
            let mut failed = 0;
            for result in &results {
                match &result.outcome {
                    Ok(page) => {
                        let path = out_dir.join(format!("page-{:03}.png", result.page_index));
                        save_png(&path, page)?;
                    }
                    Err(e) => {
                        failed += 1;
                        eprintln!("Page {}: {}", result.page_index, e);
                    }
                }
            }
            info!(pages = results.len(), failed, "batch finished");
            println!(
                "Rendered {} of {} pages to {}",
                results.len() - failed,
                results.len(),
                out_dir.display()
            );
        }
    }

    Ok(())
}

impl Target {
    fn profiles(&self) -> Result<(MediaProfile, ResolutionProfile), LabelError> {
        Ok((
            MediaProfile::by_id(&self.media)?,
            ResolutionProfile::by_name(&self.resolution)?,
        ))
    }
}

/// Read a label file and apply command-line layout overrides.
fn load_label(path: &Path, target: &Target) -> Result<(Vec<LabelItem>, LayoutOptions), LabelError> {
    let file: LabelFile = serde_json::from_str(&fs::read_to_string(path)?)?;
    let (items, mut options) = match file {
        LabelFile::Items(items) => (items, LayoutOptions::default()),
        LabelFile::Document { items, layout } => (items, layout),
    };
    if target.vertical {
        options.orientation = Orientation::Vertical;
    }
    if target.length_mm.is_some() {
        options.forced_length_mm = target.length_mm;
    }
    Ok((items, options))
}

/// Save a rendered page as a 1-bit-looking grayscale PNG.
fn save_png(path: &Path, page: &RenderedPage) -> Result<(), LabelError> {
    use image::{GrayImage, Luma};

    let mut img = GrayImage::new(page.width, page.height);
    for (x, y, px) in page.surface.enumerate_pixels() {
        let color = if labelpress::render::surface::is_ink(px) { 0u8 } else { 255u8 };
        img.put_pixel(x, y, Luma([color]));
    }
    img.save(path)?;
    Ok(())
}
