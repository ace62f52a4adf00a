//! Problem file format — the on-disk JSON shape for everything listed under
//! spec §6 "Inputs". A `HashMap` keyed by `(NodeId, ProductId, CohortState)`
//! does not round-trip through JSON (object keys must be strings), so
//! `initial_inventory` is a flat list of entries here and converted to that
//! map shape before being handed to `breadplan_solver::build_model`.

use anyhow::{bail, Context, Result};
use breadplan_core::{
    CohortState, CostStructure, Forecast, ForecastEntry, GranularityConfig, Horizon, LaborDay, Network, Node,
    NodeId, ProductId, Route, TruckSchedule,
};
use breadplan_solver::{PlanningConfig, RollingHorizonConfig, SolverConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ProblemFile {
    pub nodes: Vec<Node>,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub trucks: Vec<TruckSchedule>,
    #[serde(default)]
    pub labor: Vec<LaborDay>,
    pub forecast: Vec<ForecastEntry>,
    pub costs: CostStructure,
    pub products: Vec<ProductId>,
    pub horizon: HorizonFile,
    #[serde(default)]
    pub initial_inventory: Vec<InitialInventoryEntry>,
    #[serde(default)]
    pub planning: PlanningConfigFile,
    #[serde(default)]
    pub solver: SolverConfigFile,
    pub rolling_horizon: Option<RollingHorizonConfigFile>,
}

#[derive(Debug, Deserialize)]
pub struct HorizonFile {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct InitialInventoryEntry {
    pub node_id: NodeId,
    pub product_id: ProductId,
    pub state: CohortState,
    pub quantity: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlanningConfigFile {
    pub use_batch_tracking: bool,
    pub enforce_shelf_life: bool,
    pub allow_shortages: bool,
    pub enable_production_smoothing: bool,
    pub enforce_packaging_constraints: bool,
    pub smoothing_alpha: f64,
    pub granularity: Option<GranularityConfigFile>,
}

impl Default for PlanningConfigFile {
    fn default() -> Self {
        let defaults = PlanningConfig::default();
        Self {
            use_batch_tracking: defaults.use_batch_tracking,
            enforce_shelf_life: defaults.enforce_shelf_life,
            allow_shortages: defaults.allow_shortages,
            enable_production_smoothing: defaults.enable_production_smoothing,
            enforce_packaging_constraints: defaults.enforce_packaging_constraints,
            smoothing_alpha: defaults.smoothing_alpha,
            granularity: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GranularityConfigFile {
    pub near_term_days: i64,
    pub far_granularity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SolverConfigFile {
    pub solver_name: String,
    pub time_limit_seconds: f64,
    pub mip_gap: f64,
    pub threads: Option<u32>,
}

impl Default for SolverConfigFile {
    fn default() -> Self {
        let defaults = SolverConfig::default();
        Self {
            solver_name: defaults.solver_name,
            time_limit_seconds: defaults.time_limit_seconds,
            mip_gap: defaults.mip_gap,
            threads: defaults.threads,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RollingHorizonConfigFile {
    pub window_days: i64,
    pub overlap_days: i64,
}

/// Everything a problem file resolves to: owned domain objects plus the
/// config structs the builder/solver take by reference.
pub struct LoadedProblem {
    pub network: Network,
    pub trucks: Vec<TruckSchedule>,
    pub labor: Vec<LaborDay>,
    pub forecast: Forecast,
    pub costs: CostStructure,
    pub products: Vec<ProductId>,
    pub horizon: Horizon,
    pub initial_inventory: HashMap<(NodeId, ProductId, CohortState), f64>,
    pub planning_config: PlanningConfig,
    pub solver_config: SolverConfig,
    pub rolling_horizon_config: Option<RollingHorizonConfig>,
}

pub fn load_problem(path: &Path) -> Result<LoadedProblem> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading problem file {}", path.display()))?;
    let file: ProblemFile = serde_json::from_str(&raw).with_context(|| format!("parsing problem file {}", path.display()))?;

    let mut network = Network::new();
    for node in file.nodes {
        node.validate().map_err(|e| anyhow::anyhow!(e))?;
        network.add_node(node);
    }
    for route in file.routes {
        network.add_route(route).map_err(|e| anyhow::anyhow!(e))?;
    }

    for day in &file.labor {
        day.validate().map_err(|e| anyhow::anyhow!(e))?;
    }
    for entry in &file.forecast {
        entry.validate().map_err(|e| anyhow::anyhow!(e))?;
    }

    if file.horizon.end < file.horizon.start {
        bail!("horizon end {} precedes horizon start {}", file.horizon.end, file.horizon.start);
    }

    let mut initial_inventory = HashMap::new();
    for entry in file.initial_inventory {
        initial_inventory.insert((entry.node_id, entry.product_id, entry.state), entry.quantity);
    }

    let planning_config = PlanningConfig {
        use_batch_tracking: file.planning.use_batch_tracking,
        enforce_shelf_life: file.planning.enforce_shelf_life,
        allow_shortages: file.planning.allow_shortages,
        enable_production_smoothing: file.planning.enable_production_smoothing,
        enforce_packaging_constraints: file.planning.enforce_packaging_constraints,
        smoothing_alpha: file.planning.smoothing_alpha,
        granularity: file.planning.granularity.map(|g| GranularityConfig {
            near_term_days: g.near_term_days,
            far_granularity: g.far_granularity,
        }),
    };

    let solver_config = SolverConfig {
        solver_name: file.solver.solver_name,
        time_limit_seconds: file.solver.time_limit_seconds,
        mip_gap: file.solver.mip_gap,
        threads: file.solver.threads,
    };

    let rolling_horizon_config = file.rolling_horizon.map(|r| RollingHorizonConfig {
        window_days: r.window_days,
        overlap_days: r.overlap_days,
    });

    Ok(LoadedProblem {
        network,
        trucks: file.trucks,
        labor: file.labor,
        forecast: Forecast::new(file.forecast),
        costs: file.costs,
        products: file.products,
        horizon: Horizon::new(file.horizon.start, file.horizon.end),
        initial_inventory,
        planning_config,
        solver_config,
        rolling_horizon_config,
    })
}
