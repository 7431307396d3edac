use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use beat_montage::{analysis::AnalysisSummary, Analyzer, BeatRecord, Config};

#[derive(Parser)]
#[command(
    name = "beat-montage",
    version,
    about = "Find the strongest beats in a music track",
    long_about = "Beat-Montage detects beats in an audio track, scores each one by the energy around it, and lists the strongest beats for placing beat-synced video overlays."
)]
struct Cli {
    /// Audio file path (WAV, MP3, FLAC, OGG, M4A, AAC)
    #[arg(short, long)]
    audio: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of strongest beats to list
    #[arg(short, long)]
    top: Option<usize>,

    /// Percentile in (0, 1] above which a beat counts as strong
    #[arg(short, long)]
    percentile: Option<f64>,

    /// Write every beat to the configured CSV file
    #[arg(short, long)]
    export: bool,

    /// Write every beat to this CSV file (implies --export)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Also write all diagnostics to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

struct Report {
    summary: AnalysisSummary,
    strong: Vec<BeatRecord>,
    top: Vec<BeatRecord>,
    exported: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)
            .with_context(|| format!("loading configuration from {:?}", config_path))?,
        None => Config::default(),
    };

    config.logging.verbose |= cli.verbose;
    if let Some(log_file) = cli.log_file {
        config.logging.log_file = Some(log_file);
    }
    if let Some(top) = cli.top {
        config.output.top_n = top;
    }
    if let Some(percentile) = cli.percentile {
        config.output.percentile = percentile;
    }
    let export = cli.export || cli.csv.is_some();
    if let Some(csv) = cli.csv {
        config.output.csv_path = csv;
    }
    config.validate()?;

    // Decoding and analysis block; keep them off the async runtime
    let audio = cli.audio.clone();
    let report = tokio::task::spawn_blocking(move || -> beat_montage::Result<Report> {
        let mut analyzer = Analyzer::new(&audio, &config)?;
        analyzer.process()?;

        let exported = if export {
            analyzer.save_csv(&config.output.csv_path)?;
            Some(config.output.csv_path.clone())
        } else {
            None
        };

        Ok(Report {
            summary: analyzer.summary()?,
            strong: analyzer.above_percentile(config.output.percentile)?,
            top: analyzer.top(config.output.top_n)?,
            exported,
        })
    })
    .await
    .context("analysis worker panicked")?
    .with_context(|| format!("analyzing {:?}", cli.audio))?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &Report) {
    let summary = &report.summary;
    println!(
        "{:.2}s at {} Hz, {:.1} BPM, {} beats",
        summary.duration, summary.sample_rate, summary.tempo, summary.beat_count
    );
    println!(
        "Strength min {:.4} / mean {:.4} / max {:.4}",
        summary.min_strength, summary.mean_strength, summary.max_strength
    );

    println!("\nStrong beats ({}):", report.strong.len());
    print_beats(&report.strong);

    println!("\nTop {} beats:", report.top.len());
    print_beats(&report.top);

    if let Some(path) = &report.exported {
        println!("\nBeats saved to {}", path.display());
    }
}

fn print_beats(beats: &[BeatRecord]) {
    println!("{:>14}  {:>10}", "Beat Time (s)", "Strength");
    for beat in beats {
        println!("{:>14.3}  {:>10.4}", beat.time, beat.strength);
    }
}
