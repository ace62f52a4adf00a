//! # breadplan-solver
//!
//! Mixed-integer model builder and solve driver for the gluten-free bread
//! production/distribution planner. Builds on `breadplan-core`'s typed
//! domain model and network preprocessor; this crate owns everything that
//! touches `good_lp`.

pub mod builder;
pub mod cohort;
pub mod error;
pub mod extract;
pub mod model;
pub mod rolling_horizon;
pub mod solver;

pub use builder::{build_model, BuiltModel, ModelContext, PlanningInputs};
pub use error::{PlanError, PlanResult, PlanWarning};
pub use extract::{extract_solution, CostBreakdown, LaborHoursByDate, PlanOutput, SolverStatus, ValidationReport};
pub use model::{PlanningConfig, SolverConfig};
pub use rolling_horizon::{solve_rolling_horizon, RollingHorizonConfig};
pub use solver::{solve, TerminationStatus};
