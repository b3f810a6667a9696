use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use snn_viz::{compose_chart, extract_series, ChartDescription, ResultDocument, VizConfig};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod render;

use render::{render_chart_guard, ImageKind};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot the result document of a spiking-network run", long_about = None)]
struct Cli {
    /// Result document (JSON) written by a validation run
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output PNG path for the main figure (defaults next to the input)
    #[arg(long, value_hint = ValueHint::FilePath)]
    png: Option<PathBuf>,

    /// Output SVG path for the main figure
    #[arg(long, value_hint = ValueHint::FilePath)]
    svg: Option<PathBuf>,

    /// Disable plot generation
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Write the composed chart description as JSON (`-` for stdout)
    #[arg(long, value_hint = ValueHint::FilePath)]
    dump_chart: Option<PathBuf>,

    /// JSON file with plot settings; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Spike bar width in time units
    #[arg(long)]
    spike_width: Option<f64>,

    /// Draw the raw label markers
    #[arg(long, action = ArgAction::SetTrue)]
    raw_labels: bool,

    /// Skip the training error figure
    #[arg(long, action = ArgAction::SetTrue)]
    no_error_figure: bool,

    /// Moving-average window (epochs) for the error trend
    #[arg(long)]
    smoothing_window: Option<usize>,

    /// Plot the analog signal only, without spikes, predictions or labels
    #[arg(long, action = ArgAction::SetTrue)]
    signal_only: bool,

    /// Image width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 760)]
    height: u32,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Profile major stages with timings
    #[arg(long, action = ArgAction::SetTrue)]
    profile: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    handle_render(cli)
}

fn handle_render(args: Cli) -> Result<()> {
    let config = resolve_config(&args)?;
    debug!("Plot settings: {:?}", config);

    let t_load = Instant::now();
    let document = ResultDocument::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    if args.profile || args.verbose {
        info!(
            "Load stage: {:.1} ms",
            t_load.elapsed().as_secs_f64() * 1000.0
        );
    }
    info!(
        "Loaded {}: {} samples, {} spikes, {} predictions, {} epochs",
        args.input.display(),
        document.eeg_raw.len(),
        document.spikes.len(),
        document.predictions.as_ref().map_or(0, Vec::len),
        document.errors.len()
    );

    let t_compose = Instant::now();
    let series = extract_series(&document, &config)
        .with_context(|| format!("failed to extract series from {}", args.input.display()))?;
    let chart = compose_chart(&series);
    if args.profile || args.verbose {
        info!(
            "Compose stage: {:.1} ms ({} figures)",
            t_compose.elapsed().as_secs_f64() * 1000.0,
            chart.figures.len()
        );
    }

    if let Some(path) = args.dump_chart.as_ref() {
        write_chart_json(&chart, path)?;
    }

    if args.no_plot {
        return Ok(());
    }

    let mut targets: Vec<(PathBuf, ImageKind)> = Vec::new();
    if let Some(path) = args.png.as_ref() {
        targets.push((path.clone(), ImageKind::Png));
    }
    if let Some(path) = args.svg.as_ref() {
        targets.push((path.clone(), ImageKind::Svg));
    }
    if targets.is_empty() {
        targets.push((default_png_path(&args.input), ImageKind::Png));
    }

    let t_plot = Instant::now();
    let mut written = 0usize;
    for (path, kind) in &targets {
        match render_chart_guard(&chart, path, *kind, (args.width, args.height)) {
            Ok(paths) => {
                for p in &paths {
                    info!("Wrote plot: {}", p.display());
                }
                written += paths.len();
            }
            Err(err) => warn!("Skipping render ({}): {}", path.display(), err),
        }
    }
    if args.profile || args.verbose {
        info!(
            "Plot stage: {:.1} ms",
            t_plot.elapsed().as_secs_f64() * 1000.0
        );
    }

    if written == 0 {
        return Err(anyhow!("no plot could be written"));
    }
    Ok(())
}

/// Defaults, then the config file, then explicit flags.
fn resolve_config(args: &Cli) -> Result<VizConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => load_config(path)?,
        None => VizConfig::default(),
    };
    if let Some(width) = args.spike_width {
        config.spike_bar_width = width;
    }
    if let Some(window) = args.smoothing_window {
        config.error_smoothing_window = window;
    }
    if args.raw_labels {
        config.show_raw_labels = true;
    }
    if args.no_error_figure {
        config.show_error_figure = false;
    }
    if args.signal_only {
        config.show_events = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<VizConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid config {}", path.display()))
}

fn default_png_path(input: &Path) -> PathBuf {
    input.with_extension("png")
}

fn write_chart_json(chart: &ChartDescription, path: &Path) -> Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, chart)?;
        writeln!(handle)?;
    } else {
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, chart)?;
        info!("Wrote chart description: {}", path.display());
    }
    Ok(())
}
