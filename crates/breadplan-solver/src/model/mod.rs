//! Model assembly — variable creation, constraints, and objective.

pub mod config;
pub mod constraints;
pub mod objective;
pub mod variables;

pub use config::{PlanningConfig, SolverConfig};
pub use constraints::{add_all_constraints, ConstraintInputs};
pub use objective::{build_objective, ObjectiveInputs};
pub use variables::{create_variables, ModelVariables, VariableBuildConfig, PRODUCTION_STATE};
