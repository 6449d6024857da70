//! hepplotting CLI

mod demo;
mod inputs;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hp_hist::{add_flat_syst, scale_xaxis, sum_histograms};
use hp_viz_render::Renderer;
use hp_viz_render::config::resolve_config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hepplot")]
#[command(about = "hepplot - stacked histogram comparison plots")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a data / stacked-background comparison plot
    Plot {
        /// Plot inputs (JSON: backgrounds, data, optional total and signals)
        #[arg(short, long)]
        input: PathBuf,

        /// Style and plot options (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Plot name, used for the output file names
        #[arg(short, long)]
        name: String,

        /// Output directory; overrides the configuration
        #[arg(long)]
        plotdir: Option<PathBuf>,
    },

    /// Sum histograms bin by bin (errors in quadrature)
    Sum {
        /// JSON array of histograms sharing one binning
        #[arg(short, long)]
        input: PathBuf,

        /// Name of the sum
        #[arg(long, default_value = "tot")]
        name: String,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a flat relative systematic to every bin error
    Syst {
        /// Histogram (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Relative uncertainty, e.g. 0.15 for 15%
        #[arg(long)]
        fraction: f64,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rescale the x-axis calibration, optionally folding the overflow
    Rescale {
        /// Histogram (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Factor applied to every bin edge (1e-3 for MeV to GeV)
        #[arg(long)]
        scale: f64,

        /// Fold the overflow into the last visible bin
        #[arg(long)]
        add_overflow: bool,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Draw the example plot from Gaussian toy histograms
    Demo {
        /// Output directory
        #[arg(long, default_value = "plots")]
        plotdir: PathBuf,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Plot { input, config, name, plotdir } => {
            cmd_plot(&input, config.as_deref(), &name, plotdir)
        }
        Commands::Sum { input, name, output } => cmd_sum(&input, &name, output.as_deref()),
        Commands::Syst { input, fraction, output } => {
            cmd_syst(&input, fraction, output.as_deref())
        }
        Commands::Rescale { input, scale, add_overflow, output } => {
            cmd_rescale(&input, scale, add_overflow, output.as_deref())
        }
        Commands::Demo { plotdir, seed } => cmd_demo(plotdir, seed),
        Commands::Version => {
            println!("hepplot {}", hp_core::VERSION);
            Ok(())
        }
    }
}

fn write_json<T: serde::Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    if let Some(path) = output {
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        println!("{text}");
    }
    Ok(())
}

fn print_written(paths: &[PathBuf]) {
    for p in paths {
        println!("{}", p.display());
    }
}

fn cmd_plot(input: &Path, config: Option<&Path>, name: &str, plotdir: Option<PathBuf>) -> Result<()> {
    let yaml = config
        .map(|p| {
            std::fs::read_to_string(p)
                .with_context(|| format!("failed to read config {}", p.display()))
        })
        .transpose()?;
    let mut viz = resolve_config(yaml.as_deref())?;
    if plotdir.is_some() {
        viz.comparison.plotdir = plotdir;
    }

    let inputs = inputs::PlotInputFile::load(input)?.into_inputs()?;
    let renderer = Renderer::new(viz);
    let artifact = renderer.build(&inputs)?;
    let written = renderer.save(&artifact, name)?;
    tracing::info!(plot = name, files = written.len(), "plot complete");
    print_written(&written);
    Ok(())
}

fn cmd_sum(input: &Path, name: &str, output: Option<&Path>) -> Result<()> {
    let hists = inputs::load_histograms(input)?;
    let total = sum_histograms(&hists, name)?;
    tracing::info!(inputs = hists.len(), integral = total.integral(), "summed");
    write_json(output, &total)
}

fn cmd_syst(input: &Path, fraction: f64, output: Option<&Path>) -> Result<()> {
    let h = inputs::load_histogram(input)?;
    write_json(output, &add_flat_syst(&h, fraction, "syst"))
}

fn cmd_rescale(input: &Path, scale: f64, add_overflow: bool, output: Option<&Path>) -> Result<()> {
    let h = inputs::load_histogram(input)?;
    write_json(output, &scale_xaxis(&h, scale, add_overflow)?)
}

fn cmd_demo(plotdir: PathBuf, seed: u64) -> Result<()> {
    let mut viz = resolve_config(None)?;
    viz.comparison = demo::demo_options(viz.comparison);
    viz.comparison.plotdir = Some(plotdir);

    let renderer = Renderer::new(viz);
    let artifact = renderer.build(&demo::demo_inputs(seed)?)?;
    let written = renderer.save(&artifact, demo::PLOT_NAME)?;
    tracing::info!(seed, files = written.len(), "demo plot complete");
    print_written(&written);
    Ok(())
}
