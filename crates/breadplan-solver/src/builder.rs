//! Model builder — spec C5, the top-level entry point tying C1-C4 into a
//! solvable model.
//!
//! Top-to-bottom shape: extract network data, create variables, fold in
//! constraint families, minimise the objective, hand off to the solver.

use crate::cohort::build_cohort_index;
use crate::error::{PlanError, PlanResult, PlanWarning};
use crate::model::{
    add_all_constraints, build_objective, create_variables, ConstraintInputs, ModelVariables, ObjectiveInputs,
    PlanningConfig, VariableBuildConfig,
};
use crate::solver::{solve, SolveReport};
use breadplan_core::{CohortState, CostStructure, Forecast, Horizon, LaborDay, NetworkIndex, Network, Node, NodeId, ProductId, TruckSchedule};
use good_lp::solvers::highs::highs;
use good_lp::{variables, Solution, SolverModel};
use std::collections::HashMap;

use crate::model::SolverConfig;

pub struct PlanningInputs<'a> {
    pub network: &'a Network,
    pub trucks: &'a [TruckSchedule],
    pub labor: &'a [LaborDay],
    pub forecast: &'a Forecast,
    pub costs: &'a CostStructure,
    pub products: &'a [ProductId],
    pub horizon: Horizon,
    pub initial_inventory: &'a HashMap<(NodeId, ProductId, CohortState), f64>,
    pub config: &'a PlanningConfig,
}

/// Bookkeeping the extractor needs to turn a solved model back into domain
/// types; everything [`BuiltModel`] carries except the solver-specific
/// problem object itself.
pub struct ModelContext<'a> {
    pub net_index: NetworkIndex<'a>,
    pub cohorts: crate::cohort::CohortIndex,
    pub mv: ModelVariables,
    pub all_dates: Vec<chrono::NaiveDate>,
    pub labor_by_date: HashMap<chrono::NaiveDate, LaborDay>,
    pub warnings: Vec<PlanWarning>,
}

impl<'a> ModelContext<'a> {
    pub fn labor_by_date_lookup(&self, date: chrono::NaiveDate) -> Option<&LaborDay> {
        self.labor_by_date.get(&date)
    }
}

/// The assembled model plus the bookkeeping the extractor needs to turn a
/// solution back into domain types.
pub struct BuiltModel<'a> {
    pub context: ModelContext<'a>,
    model: good_lp::solvers::highs::HighsProblem,
}

pub fn build_model<'a>(inputs: &PlanningInputs<'a>) -> PlanResult<BuiltModel<'a>> {
    validate_inputs(inputs)?;

    let net_index = NetworkIndex::build(inputs.network, inputs.trucks);
    let cohorts = build_cohort_index(
        &net_index,
        inputs.products,
        &inputs.horizon,
        inputs.forecast,
        inputs.config.enforce_shelf_life,
    );
    let all_dates: Vec<chrono::NaiveDate> = inputs.horizon.dates().collect();

    let mut warnings = Vec::new();
    let labor_by_date: HashMap<chrono::NaiveDate, LaborDay> = inputs.labor.iter().map(|d| (d.date, d.clone())).collect();
    for date in &all_dates {
        if !labor_by_date.contains_key(date) {
            warnings.push(PlanWarning::LaborCalendarGap { date: *date });
        }
    }
    if inputs.costs.frozen_holding.per_unit_day == 0.0 && inputs.costs.frozen_holding.per_pallet_day.is_none() {
        warnings.push(PlanWarning::HoldingCostMissing { state: "frozen" });
    }
    if inputs.costs.ambient_holding.per_unit_day == 0.0 && inputs.costs.ambient_holding.per_pallet_day.is_none() {
        warnings.push(PlanWarning::HoldingCostMissing { state: "ambient" });
    }
    for entry in &inputs.forecast.entries {
        if !inputs.horizon.contains(entry.date) {
            warnings.push(PlanWarning::ForecastEntryOutsideHorizon { date: entry.date });
        }
    }

    let nodes_by_id: HashMap<NodeId, &Node> = inputs.network.nodes().map(|n| (n.id.clone(), n)).collect();

    let mut use_pallet_holding = HashMap::new();
    use_pallet_holding.insert(CohortState::Frozen, inputs.costs.frozen_holding.uses_pallet_rate());
    use_pallet_holding.insert(CohortState::Ambient, inputs.costs.ambient_holding.uses_pallet_rate());
    use_pallet_holding.insert(CohortState::Thawed, inputs.costs.ambient_holding.uses_pallet_rate());

    let var_config = VariableBuildConfig {
        allow_shortages: inputs.config.allow_shortages,
        enforce_packaging_constraints: inputs.config.enforce_packaging_constraints,
        use_pallet_holding,
    };

    let mut vars = variables!();
    let mv = create_variables(
        &mut vars,
        &net_index,
        &cohorts,
        &net_index.manufacturing_nodes,
        inputs.products,
        &all_dates,
        inputs.trucks,
        &all_dates,
        &var_config,
    );

    let objective_inputs = ObjectiveInputs {
        net_index: &net_index,
        cohorts: &cohorts,
        costs: inputs.costs,
        trucks: inputs.trucks,
        products: inputs.products,
        labor_by_date: &labor_by_date,
    };
    let objective = build_objective(&mv, &objective_inputs);

    let model = vars.minimise(objective).using(highs);

    let constraint_inputs = ConstraintInputs {
        net_index: &net_index,
        cohorts: &cohorts,
        nodes_by_id: &nodes_by_id,
        products: inputs.products,
        all_dates: &all_dates,
        forecast: inputs.forecast,
        trucks: inputs.trucks,
        labor_by_date: &labor_by_date,
        initial_inventory: inputs.initial_inventory,
        config: inputs.config,
    };
    let model = add_all_constraints(model, &mv, &constraint_inputs);

    Ok(BuiltModel {
        context: ModelContext {
            net_index,
            cohorts,
            mv,
            all_dates,
            labor_by_date,
            warnings,
        },
        model,
    })
}

impl<'a> BuiltModel<'a> {
    /// Hand the assembled model to the solver, consuming it; the returned
    /// [`ModelContext`] is what [`crate::extract::extract_solution`] needs
    /// to read variable values back into domain types.
    pub fn solve(self, config: &SolverConfig) -> PlanResult<(SolveReport<impl Solution>, ModelContext<'a>)> {
        let report = solve(self.model, config)?;
        Ok((report, self.context))
    }
}

fn validate_inputs(inputs: &PlanningInputs) -> PlanResult<()> {
    if inputs.products.is_empty() {
        return Err(PlanError::InputValidation("product catalog is empty".into()));
    }
    if inputs.horizon.end < inputs.horizon.start {
        return Err(PlanError::InputValidation("horizon end precedes horizon start".into()));
    }
    let net_index = NetworkIndex::build(inputs.network, inputs.trucks);
    if net_index.manufacturing_nodes.is_empty() {
        return Err(PlanError::NetworkInfeasibility("no manufacturing node in network".into()));
    }
    let reachable = net_index.reachable_from_manufacturing();
    for demand_node in &net_index.demand_nodes {
        if !reachable.contains(demand_node) {
            return Err(PlanError::NetworkInfeasibility(format!(
                "demand node {demand_node} is unreachable from any manufacturing node"
            )));
        }
    }
    for entry in &inputs.forecast.entries {
        if entry.quantity < 0.0 {
            return Err(PlanError::InputValidation(format!(
                "negative forecast quantity for ({}, {}, {})",
                entry.location_id, entry.product_id, entry.date
            )));
        }
    }
    Ok(())
}
