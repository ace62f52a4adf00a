//! # breadplan-cli
//!
//! Command-line entry point for the bread production/distribution planner.
//! Loads a problem file, builds and solves the MILP model (or checks it in
//! `validate` mode), and prints the resulting plan as JSON.

pub mod cli;
pub mod output;
pub mod problem;

pub use cli::{Cli, Commands, SolveArgs, ValidateArgs};
pub use problem::{load_problem, LoadedProblem, ProblemFile};
