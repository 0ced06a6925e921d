use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "pocket-doctor",
    version,
    about = "Extract, score and chart blood-test reports."
)]
struct Args {
    /// Pipeline config (JSON). Defaults apply to missing keys.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference table (JSON) replacing the built-in clinical defaults.
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Log debug detail. RUST_LOG overrides.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the text of exported OCR detections.
    OcrText {
        /// Detections JSON (`[{"text", "bbox", "confidence"}]`)
        #[arg(long)]
        detections: PathBuf,
        /// Keep the visual layout (lines and horizontal spacing)
        #[arg(long)]
        structured: bool,
    },

    /// Draw OCR detections over the scanned image.
    Overlay {
        /// Image path or URI, written into the SVG as-is
        #[arg(long)]
        image: String,
        #[arg(long)]
        detections: PathBuf,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        out: PathBuf,
    },

    /// Extract one report from a text file or literal text.
    Extract {
        /// File path, or the report text itself
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        out: PathBuf,
        /// Use the offline line scanner instead of the model
        #[arg(long)]
        mock: bool,
    },

    /// Extract every `.txt` report in a directory into one collection.
    Analyze {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
        /// Use the offline line scanner instead of the model
        #[arg(long)]
        mock: bool,
    },

    /// Print the per-parameter series of a collection as JSON.
    Series {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Recompute health scores for a collection.
    Score {
        #[arg(short, long)]
        input: PathBuf,
        /// Write the scored collection here instead of printing scores
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write per-parameter trend charts and the combined chart.
    Plot {
        #[arg(short, long)]
        input: PathBuf,
        /// Output root (defaults to the configured output_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Chart the health scores of a directory of single-report files.
    Scores {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let ctx = commands::Context::load(args.config.as_deref(), args.reference.as_deref())?;

    match args.command {
        Command::OcrText {
            detections,
            structured,
        } => commands::ocr_text(&ctx, &detections, structured),
        Command::Overlay {
            image,
            detections,
            width,
            height,
            out,
        } => commands::overlay(&image, &detections, width, height, &out),
        Command::Extract { input, out, mock } => commands::extract(&ctx, &input, &out, mock),
        Command::Analyze { dir, out, mock } => commands::analyze(&ctx, &dir, &out, mock),
        Command::Series { input } => commands::series(&ctx, &input),
        Command::Score { input, out } => commands::score(&ctx, &input, out.as_deref()),
        Command::Plot { input, out_dir } => commands::plot(&ctx, &input, out_dir.as_deref()),
        Command::Scores { dir, out } => commands::scores(&dir, &out),
    }
}
