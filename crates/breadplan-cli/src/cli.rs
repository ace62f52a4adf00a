//! Command structures and arg parsing — spec §6 "External interfaces".

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "breadplan", version, about = "Gluten-free bread production/distribution planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and solve a plan from a problem file, printing the plan as JSON.
    Solve(SolveArgs),
    /// Validate a problem file's inputs without invoking the solver.
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct SolveArgs {
    /// Path to the problem file (JSON; see `ProblemFile`).
    pub problem: PathBuf,

    /// Write the plan JSON here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the problem file's solver time limit (seconds).
    #[arg(long)]
    pub time_limit_seconds: Option<f64>,

    /// Override the problem file's MIP gap tolerance.
    #[arg(long)]
    pub mip_gap: Option<f64>,

    /// Solve in rolling-horizon mode instead of a single monolithic solve.
    #[arg(long)]
    pub rolling: bool,

    /// Rolling-horizon window length in days (requires --rolling).
    #[arg(long, default_value_t = 14)]
    pub window_days: i64,

    /// Rolling-horizon overlap length in days (requires --rolling).
    #[arg(long, default_value_t = 4)]
    pub overlap_days: i64,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Path to the problem file (JSON; see `ProblemFile`).
    pub problem: PathBuf,
}
