use anyhow::{Context, Result};
use clap::Parser;
use percolation_sim::export::{ensure_saves_dir, export_grid_to_ppm, frame_path, upscale_factor};
use percolation_sim::{CellStatus, Simulation, SimulationConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const SEPARATOR: &str = "------------------------------------";

/// Solves the percolation problem on a 2D grid.
///
/// The fluid flows from the top side to the bottom side. The grid percolates
/// once a continuous path of opened cells joins the two. Closed cells are
/// drawn dark, opened cells light grey and cells filled with fluid white.
#[derive(Parser, Debug)]
#[command(name = "percolation-sim", version)]
struct Args {
    /// Grid resolution, cells in each direction
    #[arg(long, default_value_t = 12)]
    res: usize,

    /// Number of rows, overrides --res
    #[arg(long)]
    rows: Option<usize>,

    /// Number of columns, overrides --res
    #[arg(long)]
    cols: Option<usize>,

    /// Write cell data to the console
    #[arg(long)]
    console: bool,

    /// Write cell data to PPM images
    #[arg(long)]
    image: bool,

    /// Refresh fill status on multiple threads
    #[arg(long, visible_alias = "ll")]
    parallel: bool,

    /// Seed for the random cell selection
    #[arg(long)]
    seed: Option<u64>,

    /// Allow picking cells that are already opened
    #[arg(long)]
    allow_reopen: bool,

    /// Stop at the first iteration that percolates
    #[arg(long)]
    stop_when_percolated: bool,

    /// Directory for exported images
    #[arg(long, default_value = "saves")]
    saves_dir: PathBuf,

    /// Minimal image resolution, smaller grids are upscaled
    #[arg(long, default_value_t = 300)]
    image_min_res: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> SimulationConfig {
        SimulationConfig {
            rows: self.rows.unwrap_or(self.res),
            cols: self.cols.unwrap_or(self.res),
            restrict_to_closed: !self.allow_reopen,
            parallel_refresh: self.parallel,
            stop_when_percolated: self.stop_when_percolated,
            seed: self.seed,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("Percolation Solver - weighted quick-union on a 2D grid");
    let timer = Instant::now();

    let config = args.to_config();
    if args.image {
        ensure_saves_dir(&args.saves_dir).with_context(|| {
            format!("creating saves folder {}", args.saves_dir.display())
        })?;
    }

    let mut simulation =
        Simulation::from_config(&config).context("setting up the simulation")?;

    if args.console {
        println!("Initial state of the cells:");
        print!("{}", simulation.grid());
        println!("{}", SEPARATOR);
    }

    let upscale = upscale_factor(config.rows, config.cols, args.image_min_res);
    let summary = simulation.run(|report, grid| {
        println!("{}", report);
        if args.console {
            print!("{}", grid);
        }
        println!("{}", SEPARATOR);

        if args.image {
            let path = frame_path(&args.saves_dir, report.iteration);
            export_grid_to_ppm(
                grid,
                &path,
                CellStatus::Closed,
                CellStatus::OpenedAndFilled,
                upscale,
            )?;
        }
        Ok(())
    })?;

    match summary.percolated_at {
        Some(iteration) => println!(
            "Percolated at iteration {} after {} iterations",
            iteration, summary.iterations
        ),
        None => println!(
            "Did not percolate after {} iterations",
            summary.iterations
        ),
    }

    println!("Ok!");
    println!("Elapsed time = {:.3} [s]", timer.elapsed().as_secs_f64());
    Ok(())
}
