//! Recognized solver/builder configuration options — spec §6.

use breadplan_core::GranularityConfig;

#[derive(Debug, Clone)]
pub struct PlanningConfig {
    pub use_batch_tracking: bool,
    pub enforce_shelf_life: bool,
    pub allow_shortages: bool,
    pub enable_production_smoothing: bool,
    pub enforce_packaging_constraints: bool,
    /// Fraction of a manufacturing node's max daily capacity that
    /// production may swing day over day when smoothing is enabled.
    pub smoothing_alpha: f64,
    pub granularity: Option<GranularityConfig>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            use_batch_tracking: true,
            enforce_shelf_life: true,
            allow_shortages: false,
            // Default tracks `use_batch_tracking` (spec §6).
            enable_production_smoothing: true,
            enforce_packaging_constraints: true,
            smoothing_alpha: 0.20,
            granularity: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub solver_name: String,
    pub time_limit_seconds: f64,
    pub mip_gap: f64,
    pub threads: Option<u32>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_name: "highs".to_string(),
            time_limit_seconds: 300.0,
            mip_gap: 0.01,
            threads: None,
        }
    }
}
