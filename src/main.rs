use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_data::{BlobConfig, Dataset};
use arbor_plot::BoundaryPlot;

mod viewer;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Random-forest decision boundary visualizer for teaching")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the synthetic dataset
    #[arg(long, default_value_t = 61526, global = true)]
    data_seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared tuning parameters for the boundary plot.
#[derive(Args, Debug, Clone)]
struct PlotArgs {
    /// Evaluation grid step
    #[arg(long, default_value_t = 0.02)]
    step: f64,

    /// Bounding box margin around the data
    #[arg(long, default_value_t = 0.5)]
    margin: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 20)]
    n_trees: usize,

    /// RNG seed for forest training
    #[arg(long, default_value_t = 1)]
    forest_seed: u64,

    /// Output image width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,
}

impl PlotArgs {
    fn to_plot(&self) -> BoundaryPlot {
        BoundaryPlot::new()
            .with_step(self.step)
            .with_margin(self.margin)
            .with_n_trees(self.n_trees)
            .with_forest_seed(self.forest_seed)
            .with_size(self.width, self.height)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Render a single boundary plot to a PNG file
    Render {
        /// Maximum tree depth (0 plots the raw data only)
        #[arg(long, default_value_t = 1)]
        max_depth: usize,

        /// Output PNG path
        #[arg(long, default_value = "boundary.png")]
        output: PathBuf,

        #[command(flatten)]
        plot: PlotArgs,
    },

    /// Render one plot per depth in an inclusive range
    Sweep {
        /// Smallest depth to render (0 plots the raw data only)
        #[arg(long, default_value_t = 0)]
        min_depth: usize,

        /// Largest depth to render
        #[arg(long, default_value_t = 8)]
        max_depth: usize,

        /// Output directory for the PNG files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        plot: PlotArgs,
    },

    /// Open the interactive viewer with a depth slider
    View {
        #[command(flatten)]
        plot: PlotArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct RenderOutput {
    max_depth: usize,
    n_points: usize,
    width: u32,
    height: u32,
    output: PathBuf,
}

#[derive(Serialize)]
struct SweepOutput {
    min_depth: usize,
    max_depth: usize,
    n_points: usize,
    files: Vec<PathBuf>,
}

/// Build the teaching dataset: 50 points around (0,0) and (1,1).
fn load_dataset(seed: u64) -> Result<Dataset> {
    let dataset = BlobConfig::new(vec![[0.0, 0.0], [1.0, 1.0]])
        .with_n_samples(50)
        .with_seed(seed)
        .sample()
        .context("failed to sample blob dataset")?;
    info!(n_points = dataset.len(), seed, "dataset sampled");
    Ok(dataset)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Render {
            max_depth,
            output,
            plot,
        } => {
            let dataset = load_dataset(cli.data_seed)?;

            plot.to_plot()
                .render_to_file(&dataset, max_depth, &output)
                .context("failed to render boundary plot")?;

            let summary = RenderOutput {
                max_depth,
                n_points: dataset.len(),
                width: plot.width,
                height: plot.height,
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Sweep {
            min_depth,
            max_depth,
            output_dir,
            plot,
        } => {
            anyhow::ensure!(
                min_depth <= max_depth,
                "min_depth {min_depth} exceeds max_depth {max_depth}"
            );

            let dataset = load_dataset(cli.data_seed)?;
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("failed to create {}", output_dir.display()))?;

            let boundary = plot.to_plot();
            let mut files = Vec::with_capacity(max_depth - min_depth + 1);
            for depth in min_depth..=max_depth {
                let path = output_dir.join(format!("boundary_depth_{depth}.png"));
                boundary
                    .render_to_file(&dataset, depth, &path)
                    .with_context(|| format!("failed to render depth {depth}"))?;
                files.push(path);
            }

            let summary = SweepOutput {
                min_depth,
                max_depth,
                n_points: dataset.len(),
                files,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::View { plot } => {
            let dataset = load_dataset(cli.data_seed)?;
            viewer::run(dataset, plot.to_plot())
                .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))?;
        }
    }

    Ok(())
}
