//! Subcommand handlers.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _};
use pocket_doctor_core::analysis::{order_reports, score_trends};
use pocket_doctor_core::ocr::{detections_from_json, detections_to_structured_text, detections_to_text};
use pocket_doctor_core::render::{render_detection_overlay, render_score_strip, write_svg};
use pocket_doctor_core::{
    load_reference_table, plot_collection, store, Analyzer, PipelineConfig, ReferenceTable,
    ReportCollection,
};
use pocket_doctor_llm::{ExtractionError, LlmClient, MockExtractor, ReportExtractor};

/// Configuration and reference data shared by every command.
pub struct Context {
    pub config: PipelineConfig,
    pub table: ReferenceTable,
}

impl Context {
    pub fn load(config: Option<&Path>, reference: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        let table = match reference {
            Some(path) => load_reference_table(path)
                .with_context(|| format!("Failed to load reference table {}", path.display()))?,
            None => ReferenceTable::clinical_defaults(),
        };
        Ok(Self { config, table })
    }

    fn analyzer(&self) -> Analyzer<'_> {
        Analyzer::new(&self.table).with_order(self.config.series_order)
    }
}

#[cfg(feature = "llm")]
fn model_client(ctx: &Context) -> anyhow::Result<Box<dyn LlmClient>> {
    let client = pocket_doctor_llm::OpenAiClient::from_env(ctx.config.llm.clone())?;
    Ok(Box::new(client))
}

#[cfg(not(feature = "llm"))]
fn model_client(_ctx: &Context) -> anyhow::Result<Box<dyn LlmClient>> {
    bail!("Built without the `llm` feature; rerun with --mock")
}

/// Log the model's raw reply before surfacing a payload error.
fn log_payload(err: ExtractionError) -> ExtractionError {
    if let Some(raw) = err.raw_payload() {
        tracing::error!(raw, "Unparseable model response");
    }
    err
}

fn load_collection(path: &Path) -> anyhow::Result<ReportCollection> {
    store::load_collection(path).with_context(|| format!("Failed to load reports from {}", path.display()))
}

pub fn ocr_text(ctx: &Context, detections: &Path, structured: bool) -> anyhow::Result<()> {
    let json = fs::read_to_string(detections)
        .with_context(|| format!("Failed to read {}", detections.display()))?;
    let detections = detections_from_json(&json)?;

    let text = if structured {
        detections_to_structured_text(&detections, &ctx.config.ocr)
    } else {
        detections_to_text(&detections)
    };
    println!("{text}");
    Ok(())
}

pub fn overlay(image: &str, detections: &Path, width: f64, height: f64, out: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(detections)
        .with_context(|| format!("Failed to read {}", detections.display()))?;
    let detections = detections_from_json(&json)?;

    write_svg(out, &render_detection_overlay(image, width, height, &detections))?;
    println!("Overlay with {} detections written to {}", detections.len(), out.display());
    Ok(())
}

pub fn extract(ctx: &Context, input: &str, out: &Path, mock: bool) -> anyhow::Result<()> {
    let text = store::read_text_input(input)?;
    let file = Path::new(input)
        .file_name()
        .filter(|_| Path::new(input).is_file())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    let report = if mock {
        let mut report = MockExtractor::extract(&file, &text);
        report.general_health_score = ctx.analyzer().health_score(&report.parameters);
        report
    } else {
        ReportExtractor::new(model_client(ctx)?, &ctx.table)
            .extract(&file, &text)
            .map_err(log_payload)?
    };

    store::save_report(out, &report)?;
    println!(
        "Extracted {} parameters (score: {}) to {}",
        report.parameters.len(),
        format_score(report.general_health_score),
        out.display()
    );
    Ok(())
}

pub fn analyze(ctx: &Context, dir: &Path, out: &Path, mock: bool) -> anyhow::Result<()> {
    let reports = store::read_text_files(dir)?;
    if reports.is_empty() {
        bail!("No .txt files found in {}", dir.display());
    }

    let collection = if mock {
        let mut collection = ReportCollection::new(
            reports
                .iter()
                .map(|(name, text)| MockExtractor::extract(name, text))
                .collect(),
        );
        ctx.analyzer().score_collection(&mut collection);
        collection
    } else {
        ReportExtractor::new(model_client(ctx)?, &ctx.table)
            .extract_many(&reports)
            .map_err(log_payload)?
    };

    store::save_collection(out, &collection)?;
    println!("Analysis of {} reports written to {}", collection.len(), out.display());
    Ok(())
}

pub fn series(ctx: &Context, input: &Path) -> anyhow::Result<()> {
    let collection = load_collection(input)?;
    let reports = order_reports(&collection.reports, ctx.config.series_order);
    let series = ctx.analyzer().series(&reports);

    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

pub fn score(ctx: &Context, input: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let mut collection = load_collection(input)?;
    ctx.analyzer().score_collection(&mut collection);

    match out {
        Some(out) => {
            store::save_collection(out, &collection)?;
            println!("Scored {} reports to {}", collection.len(), out.display());
        }
        None => {
            for report in &collection.reports {
                println!("{}\t{}", report.file, format_score(report.general_health_score));
            }
        }
    }
    Ok(())
}

pub fn plot(ctx: &Context, input: &Path, out_dir: Option<&Path>) -> anyhow::Result<()> {
    let collection = load_collection(input)?;
    let written = plot_collection(&collection, &ctx.table, &ctx.config, out_dir)?;

    println!("Wrote {} charts", written.len());
    Ok(())
}

pub fn scores(dir: &Path, out: &Path) -> anyhow::Result<()> {
    let reports = store::load_reports_dir(dir)?;
    let scores: Vec<f64> = reports
        .iter()
        .filter_map(|(_, report)| report.general_health_score)
        .collect();

    let svg = render_score_strip(&scores)
        .with_context(|| format!("No health scores found in {}", dir.display()))?;
    write_svg(out, &svg)?;

    let trend: Vec<String> = scores
        .iter()
        .zip(score_trends(&scores))
        .map(|(score, trend)| format!("{} {}", score.round(), trend.glyph()))
        .collect();
    println!("{}", trend.join("  "));
    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
}
