//! Error taxonomy for the model builder / solver pipeline — spec §7.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    /// Missing/invalid input fields, labor calendar gaps, unreachable demand
    /// nodes, negative quantities. Fatal before solve.
    #[error("input validation error: {0}")]
    InputValidation(String),

    /// No route path to a demand node, or transit time exceeds shelf life.
    /// Fatal before solve.
    #[error("network infeasibility: {0}")]
    NetworkInfeasibility(String),

    /// Inconsistent index sets — a constraint referred to a variable
    /// outside the sparse set. Indicates a programming defect.
    #[error("model build error: {0}")]
    ModelBuild(String),

    /// Solver not installed, license missing, or solver internal failure.
    #[error("solver error: {0}")]
    Solver(String),

    /// Solver proved infeasibility.
    #[error("infeasible{}", .iis.as_ref().map(|s| format!(": {s}")).unwrap_or_default())]
    Infeasible { iis: Option<String> },

    /// Solver hit its time limit without a feasible incumbent.
    #[error("time limit reached without a feasible solution")]
    TimeLimitWithoutSolution,
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Non-fatal conditions reported alongside a solution rather than aborting
/// the solve (spec §7 "Warnings").
#[derive(Debug, Clone)]
pub enum PlanWarning {
    LaborCalendarGap { date: chrono::NaiveDate },
    HoldingCostMissing { state: &'static str },
    ForecastEntryOutsideHorizon { date: chrono::NaiveDate },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::LaborCalendarGap { date } => {
                write!(f, "labor calendar has no entry for {date}; treated as zero capacity")
            }
            PlanWarning::HoldingCostMissing { state } => {
                write!(f, "{state} holding cost rate is missing; treated as 0")
            }
            PlanWarning::ForecastEntryOutsideHorizon { date } => {
                write!(f, "forecast entry on {date} is outside the planning horizon; ignored")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_without_iis_displays_plainly() {
        let err = PlanError::Infeasible { iis: None };
        assert_eq!(err.to_string(), "infeasible");
    }

    #[test]
    fn infeasible_with_iis_includes_detail() {
        let err = PlanError::Infeasible {
            iis: Some("demand[Dn,P,2026-08-01] unreachable".into()),
        };
        assert!(err.to_string().contains("unreachable"));
    }
}
