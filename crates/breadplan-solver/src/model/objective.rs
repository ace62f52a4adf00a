//! Objective function — spec §4.9 cost minimization.
//!
//! Cost terms are folded into an `Expression` one family at a time before
//! `vars.minimise(objective)`: labor, production, transport, holding,
//! trucking, and shortage penalty, in the order spec §4.9 lists them.

use crate::model::constraints::{departure_state, route_for_leg};
use crate::model::variables::ModelVariables;
use breadplan_core::{CohortState, CostStructure, LaborDay, NetworkIndex, ProductId, TransportMode, TruckSchedule};
use chrono::NaiveDate;
use good_lp::Expression;
use std::collections::HashMap;

pub struct ObjectiveInputs<'a> {
    pub net_index: &'a NetworkIndex<'a>,
    pub cohorts: &'a crate::cohort::CohortIndex,
    pub costs: &'a CostStructure,
    pub trucks: &'a [TruckSchedule],
    pub products: &'a [ProductId],
    pub labor_by_date: &'a HashMap<NaiveDate, LaborDay>,
}

pub fn build_objective(mv: &ModelVariables, inputs: &ObjectiveInputs) -> Expression {
    let mut objective = Expression::from(0.0);

    for (date, day) in inputs.labor_by_date {
        let (Some(&h_fixed), Some(&h_overtime), Some(&h_non_fixed)) =
            (mv.h_fixed.get(date), mv.h_overtime.get(date), mv.h_non_fixed.get(date))
        else {
            continue;
        };
        objective += day.regular_rate * h_fixed;
        objective += day.overtime_rate * h_overtime;
        objective += day.non_fixed_rate * h_non_fixed;
    }

    for &production_var in mv.production.values() {
        objective += inputs.costs.production_cost_per_unit * production_var;
    }

    for (key, &shipment_var) in &mv.shipment {
        let route = route_for_leg(inputs.net_index, &key.leg);
        let state = departure_state(inputs.net_index, key);
        let rate = transport_rate(inputs.costs, route.transport_mode, state);
        objective += rate * shipment_var;
    }

    for (key, &inv_var) in &mv.inventory {
        let rate_per_unit = holding_rate_per_unit(inputs.costs, key.state);
        if let Some(&pallets_var) = mv.inv_pallets.get(&(key.node.clone(), key.state, key.curr_date)) {
            let per_pallet = holding_rate_per_pallet(inputs.costs, key.state).unwrap_or(0.0);
            objective += per_pallet * pallets_var;
        } else {
            objective += rate_per_unit * inv_var;
        }
    }

    for ((truck_id, date), &used_var) in &mv.truck_used {
        let Some(truck) = inputs.trucks.iter().find(|t| &t.id == truck_id) else {
            continue;
        };
        objective += truck.cost_fixed * used_var;
        let load_sum: Expression = inputs
            .products
            .iter()
            .filter_map(|p| mv.truck_load.get(&(truck_id.clone(), p.clone(), *date)))
            .map(|v| Expression::from(*v))
            .fold(Expression::from(0.0), |acc, e| acc + e);
        objective += truck.cost_per_unit * load_sum;
    }

    for &shortage_var in mv.shortage.values() {
        objective += inputs.costs.shortage_penalty_per_unit * shortage_var;
    }

    objective
}

fn transport_rate(costs: &CostStructure, mode: TransportMode, _arrival_state: CohortState) -> f64 {
    match mode {
        TransportMode::Frozen => costs.frozen_transport_cost_per_unit,
        TransportMode::Ambient => costs.ambient_transport_cost_per_unit,
    }
}

fn holding_rate_per_unit(costs: &CostStructure, state: CohortState) -> f64 {
    match state {
        CohortState::Frozen => costs.frozen_holding.per_unit_day,
        CohortState::Ambient | CohortState::Thawed => costs.ambient_holding.per_unit_day,
    }
}

fn holding_rate_per_pallet(costs: &CostStructure, state: CohortState) -> Option<f64> {
    match state {
        CohortState::Frozen => costs.frozen_holding.per_pallet_day,
        CohortState::Ambient | CohortState::Thawed => costs.ambient_holding.per_pallet_day,
    }
}
