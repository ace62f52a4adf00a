//! Constraint system — spec §4.5 through §4.9.
//!
//! Each constraint family is its own private function that folds
//! constraints into the model and returns it, so [`add_all_constraints`]
//! reads as a flat pipeline of named passes.

use crate::cohort::{CohortKey, LegKey};
use crate::model::config::PlanningConfig;
use crate::model::variables::{ModelVariables, PRODUCTION_STATE};
use breadplan_core::{CohortState, Forecast, LaborDay, NetworkIndex, Node, NodeId, ProductId, Route, TruckSchedule};
use chrono::{Duration, NaiveDate};
use good_lp::{constraint, Expression, SolverModel};
use std::collections::HashMap;

pub struct ConstraintInputs<'a> {
    pub net_index: &'a NetworkIndex<'a>,
    pub cohorts: &'a crate::cohort::CohortIndex,
    pub nodes_by_id: &'a HashMap<NodeId, &'a Node>,
    pub products: &'a [ProductId],
    pub all_dates: &'a [NaiveDate],
    pub forecast: &'a Forecast,
    pub trucks: &'a [TruckSchedule],
    pub labor_by_date: &'a HashMap<NaiveDate, LaborDay>,
    pub initial_inventory: &'a HashMap<(NodeId, ProductId, CohortState), f64>,
    pub config: &'a PlanningConfig,
}

/// The one route between a leg's endpoints. The model assumes at most one
/// physical route per (origin, destination) pair, consistent with how
/// [`LegKey`] (and the `shipment_cohort` key) name a leg purely by its
/// endpoints rather than by a route identifier.
pub(crate) fn route_for_leg<'a>(net_index: &'a NetworkIndex<'a>, leg: &LegKey) -> &'a Route {
    net_index
        .routes_by_origin
        .get(&leg.origin)
        .into_iter()
        .flatten()
        .map(|e| net_index.route(*e))
        .find(|r| r.destination_node_id == leg.destination)
        .expect("every shipment_cohort leg is backed by a route between those endpoints")
}

pub fn add_all_constraints<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    model = add_inventory_balance(model, mv, inputs);
    model = add_demand_satisfaction(model, mv, inputs);
    model = add_packaging_linking(model, mv, inputs);
    model = add_production_capacity(model, mv, inputs);
    model = add_labor_constraints(model, mv, inputs);
    model = add_truck_loading(model, mv, inputs);
    model = add_morning_truck_ordering(model, mv, inputs);
    if inputs.config.enable_production_smoothing {
        model = add_production_smoothing(model, mv, inputs);
    }
    model
}

/// spec §4.5 — the unified balance rule, one equation per sparse cohort.
fn add_inventory_balance<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    for key in &inputs.cohorts.inventory {
        let inv_var = mv.inventory[key];

        let previous: Expression = prior_day_term(key, mv, inputs);

        let production_inflow: Expression = if key.curr_date == key.prod_date && key.state == PRODUCTION_STATE {
            inputs
                .nodes_by_id
                .get(&key.node)
                .map(|n| n.capabilities.can_manufacture)
                .unwrap_or(false)
                .then(|| mv.production.get(&(key.node.clone(), key.product.clone(), key.prod_date)).copied())
                .flatten()
                .map(Expression::from)
                .unwrap_or_else(|| Expression::from(0.0))
        } else {
            Expression::from(0.0)
        };

        let arrivals: Expression = inputs
            .cohorts
            .shipment
            .iter()
            .filter(|s| {
                s.leg.destination == key.node
                    && s.product == key.product
                    && s.prod_date == key.prod_date
                    && s.delivery_date == key.curr_date
                    && s.arrival_state == key.state
            })
            .map(|s| Expression::from(mv.shipment[s]))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        let departures: Expression = inputs
            .cohorts
            .shipment
            .iter()
            .filter(|s| {
                route_for_leg(inputs.net_index, &s.leg).origin_node_id == key.node
                    && s.product == key.product
                    && s.prod_date == key.prod_date
                    && departure_date(inputs.net_index, s) == key.curr_date
                    && departure_state(inputs.net_index, s) == key.state
            })
            .map(|s| Expression::from(mv.shipment[s]))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        let demand_consumed: Expression = if key.state.can_satisfy_demand() {
            inputs
                .cohorts
                .demand
                .iter()
                .filter(|d| d.node == key.node && d.product == key.product && d.prod_date == key.prod_date && d.date == key.curr_date)
                .map(|d| Expression::from(mv.demand_from_cohort[d]))
                .fold(Expression::from(0.0), |acc, e| acc + e)
        } else {
            Expression::from(0.0)
        };

        let rhs = previous + production_inflow + arrivals - demand_consumed - departures;
        model = model.with(constraint!(inv_var == rhs));
    }
    model
}

/// `inv[N,P,D,t-1,S]` if the sparse set contains it, else `initial_inventory`
/// on the cohort's very first possible day, else zero.
fn prior_day_term(key: &CohortKey, mv: &ModelVariables, inputs: &ConstraintInputs) -> Expression {
    let prev_date = key.curr_date - Duration::days(1);
    let prev_key = CohortKey {
        node: key.node.clone(),
        product: key.product.clone(),
        prod_date: key.prod_date,
        curr_date: prev_date,
        state: key.state,
    };
    if let Some(v) = mv.inventory.get(&prev_key) {
        return Expression::from(*v);
    }
    if prev_date < key.prod_date || key.curr_date == key.prod_date {
        return inputs
            .initial_inventory
            .get(&(key.node.clone(), key.product.clone(), key.state))
            .copied()
            .map(Expression::from)
            .unwrap_or_else(|| Expression::from(0.0));
    }
    Expression::from(0.0)
}

/// A shipment's departure date, derived from its delivery date and the
/// leg's transit time (shipment_cohort keys only carry delivery_date,
/// matching spec §4.3's key shape).
pub(crate) fn departure_date(net_index: &NetworkIndex, s: &crate::cohort::ShipmentCohortKey) -> NaiveDate {
    departure_date_for_leg(net_index, &s.leg, s.delivery_date)
}

pub(crate) fn departure_date_for_leg(net_index: &NetworkIndex, leg: &LegKey, delivery_date: NaiveDate) -> NaiveDate {
    let route = route_for_leg(net_index, leg);
    delivery_date - Duration::days(route.transit_days.ceil() as i64)
}

/// The state the cohort departs *in* (before arrival-state conversion),
/// derived from the leg's transport mode.
pub(crate) fn departure_state(net_index: &NetworkIndex, s: &crate::cohort::ShipmentCohortKey) -> CohortState {
    let route = route_for_leg(net_index, &s.leg);
    match route.transport_mode {
        breadplan_core::TransportMode::Frozen => CohortState::Frozen,
        breadplan_core::TransportMode::Ambient => {
            if s.arrival_state == CohortState::Frozen {
                CohortState::Ambient
            } else {
                s.arrival_state
            }
        }
    }
}

/// spec §4.6 — demand accounting, including the allowed shortage term.
fn add_demand_satisfaction<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    let mut seen: std::collections::HashSet<(NodeId, ProductId, NaiveDate)> = std::collections::HashSet::new();
    for d in &inputs.cohorts.demand {
        let triple = (d.node.clone(), d.product.clone(), d.date);
        if !seen.insert(triple.clone()) {
            continue;
        }
        let demand_qty = inputs
            .forecast
            .entries
            .iter()
            .filter(|e| e.location_id == d.node && e.product_id == d.product && e.date == d.date)
            .map(|e| e.quantity)
            .sum::<f64>();

        let satisfied: Expression = inputs
            .cohorts
            .demand
            .iter()
            .filter(|k| k.node == d.node && k.product == d.product && k.date == d.date)
            .map(|k| Expression::from(mv.demand_from_cohort[k]))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        let shortage_term: Expression = mv
            .shortage
            .get(&triple)
            .copied()
            .map(Expression::from)
            .unwrap_or_else(|| Expression::from(0.0));

        model = model.with(constraint!(satisfied + shortage_term == demand_qty));
    }
    model
}

/// spec §4.4 — `production = production_cases * 10`, and the packaging
/// pallet ceil-link when packaging constraints are enforced.
fn add_packaging_linking<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    for (key, prod_var) in &mv.production {
        let cases_var = mv.production_cases[key];
        model = model.with(constraint!(*prod_var == breadplan_core::UNITS_PER_CASE * cases_var));
    }

    if !inputs.config.enforce_packaging_constraints {
        return model;
    }

    for ((truck_id, _destination, date), pallets_var) in &mv.pallets_loaded {
        let units_expr: Expression = inputs
            .products
            .iter()
            .filter_map(|p| mv.truck_load.get(&(truck_id.clone(), p.clone(), *date)))
            .map(|v| Expression::from(*v))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        model = model.with(constraint!(units_expr.clone() <= breadplan_core::UNITS_PER_PALLET * (*pallets_var)));
        model = model.with(constraint!(
            breadplan_core::UNITS_PER_PALLET * (*pallets_var) <= units_expr + (breadplan_core::UNITS_PER_PALLET - 1.0)
        ));
    }
    model
}

/// spec §4.7 — production capacity linked to labor hours via a linear
/// fixed-overhead + changeover expression (no bilinear terms: both the
/// "any production today" and "num distinct products today" indicators
/// appear only with constant coefficients).
fn add_production_capacity<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    for (mfg, node) in inputs.nodes_by_id.iter().filter(|(_, n)| n.capabilities.can_manufacture) {
        let rate = node.capabilities.production_rate_per_hour.unwrap_or(0.0);
        let overhead = node.capabilities.fixed_overhead_hours();
        let changeover = node.capabilities.default_changeover_hours;
        let big_m = rate * 24.0;

        for date in inputs.all_dates {
            let Some(&produces_any) = mv.produces_any.get(&(mfg.clone(), *date)) else {
                continue;
            };
            let Some(&labor_hours) = mv.labor_hours_used.get(date) else {
                continue;
            };

            let mut total_production = Expression::from(0.0);
            let mut num_products = Expression::from(0.0);
            for product in inputs.products {
                if let Some(&p) = mv.production.get(&(mfg.clone(), product.clone(), *date)) {
                    total_production += p;
                    model = model.with(constraint!(p <= big_m * mv.produces_product[&(mfg.clone(), product.clone(), *date)]));
                    model = model.with(constraint!(
                        mv.produces_product[&(mfg.clone(), product.clone(), *date)] <= produces_any
                    ));
                    num_products += mv.produces_product[&(mfg.clone(), product.clone(), *date)];
                }
            }

            model = model.with(constraint!(total_production.clone() <= big_m * produces_any));

            let capacity_hours = labor_hours - overhead * produces_any - changeover * (num_products - produces_any);
            model = model.with(constraint!(total_production <= rate * capacity_hours));
        }
    }
    model
}

/// spec §4.4 / §4.7 — labor piecewise components.
fn add_labor_constraints<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    for date in inputs.all_dates {
        let Some(&labor_hours) = mv.labor_hours_used.get(date) else {
            continue;
        };
        let h_fixed = mv.h_fixed[date];
        let h_overtime = mv.h_overtime[date];
        let h_non_fixed = mv.h_non_fixed[date];

        model = model.with(constraint!(labor_hours == h_fixed + h_overtime + h_non_fixed));

        let Some(day) = inputs.labor_by_date.get(date) else {
            model = model.with(constraint!(labor_hours == 0.0));
            continue;
        };

        model = model.with(constraint!(h_fixed <= day.fixed_hours));
        model = model.with(constraint!(labor_hours <= day.maximum_hours));

        if day.fixed_hours <= 1e-9 {
            // Non-fixed day: h_non_fixed >= minimum_hours whenever production
            // or a truck departure happens (§4.4). Each indicator gets its
            // own constraint rather than a summed one, so two simultaneous
            // activities on the same day don't double the floor.
            let activity_indicators = inputs
                .nodes_by_id
                .keys()
                .filter_map(|n| mv.produces_any.get(&(n.clone(), *date)))
                .chain(mv.truck_used.iter().filter(|((_, d), _)| d == date).map(|(_, v)| v));
            for &indicator in activity_indicators {
                model = model.with(constraint!(h_non_fixed >= day.minimum_hours * indicator));
            }
        }
    }
    model
}

/// spec §4.8 — truck loading links and capacity.
fn add_truck_loading<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    let mut legs_with_delivery: std::collections::HashSet<(LegKey, ProductId, NaiveDate)> = std::collections::HashSet::new();
    for s in &inputs.cohorts.shipment {
        legs_with_delivery.insert((s.leg.clone(), s.product.clone(), s.delivery_date));
    }

    for (leg, product, delivery_date) in &legs_with_delivery {
        let shipped: Expression = inputs
            .cohorts
            .shipment
            .iter()
            .filter(|s| &s.leg == leg && &s.product == product && s.delivery_date == *delivery_date)
            .map(|s| Expression::from(mv.shipment[s]))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        let departure = departure_date_for_leg(inputs.net_index, leg, *delivery_date);

        let trucks_on_leg: Vec<&TruckSchedule> = inputs
            .trucks
            .iter()
            .filter(|t| t.origin_node_id == leg.origin && t.destination_node_id == leg.destination)
            .collect();

        let truck_load_sum: Expression = trucks_on_leg
            .iter()
            .filter_map(|t| mv.truck_load.get(&(t.id.clone(), product.clone(), *delivery_date)))
            .map(|v| Expression::from(*v))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        model = model.with(constraint!(shipped == truck_load_sum));

        for t in &trucks_on_leg {
            if let Some(&load_var) = mv.truck_load.get(&(t.id.clone(), product.clone(), *delivery_date)) {
                if let Some(&used_var) = mv.truck_used.get(&(t.id.clone(), departure)) {
                    model = model.with(constraint!(load_var <= t.capacity_units * used_var));
                }
            }
        }
    }

    for ((truck_id, date), used_var) in &mv.truck_used {
        let pallets_sum: Expression = mv
            .pallets_loaded
            .iter()
            .filter(|((t, _, d), _)| t == truck_id && d == date)
            .map(|(_, v)| Expression::from(*v))
            .fold(Expression::from(0.0), |acc, e| acc + e);
        if inputs.config.enforce_packaging_constraints {
            model = model.with(constraint!(pallets_sum <= breadplan_core::PALLETS_PER_TRUCK * (*used_var)));
        }
    }

    for node in inputs.nodes_by_id.values().filter(|n| n.capabilities.requires_truck_schedules) {
        for date in inputs.all_dates {
            let any_truck_active = inputs
                .trucks
                .iter()
                .any(|t| t.origin_node_id == node.id && t.is_active_on(*date));
            if any_truck_active {
                continue;
            }
            let outbound: Expression = inputs
                .cohorts
                .shipment
                .iter()
                .filter(|s| departure_date(inputs.net_index, s) == *date && route_for_leg(inputs.net_index, &s.leg).origin_node_id == node.id)
                .map(|s| Expression::from(mv.shipment[s]))
                .fold(Expression::from(0.0), |acc, e| acc + e);
            model = model.with(constraint!(outbound == 0.0));
        }
    }

    model
}

/// spec §4.8 "Morning vs afternoon trucks" — morning departures at a
/// manufacturing node may only draw on ambient inventory that existed at
/// the end of the prior day, not same-day production.
fn add_morning_truck_ordering<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    let morning_origins: std::collections::HashSet<(NodeId, NaiveDate)> = inputs
        .trucks
        .iter()
        .filter(|t| {
            t.departure_type == breadplan_core::DepartureType::Morning
                && inputs
                    .nodes_by_id
                    .get(&t.origin_node_id)
                    .map(|n| n.capabilities.can_manufacture)
                    .unwrap_or(false)
        })
        .flat_map(|t| inputs.all_dates.iter().filter(move |d| t.is_active_on(**d)).map(move |d| (t.origin_node_id.clone(), *d)))
        .collect();

    for (origin, date) in &morning_origins {
        let prev_day = *date - Duration::days(1);
        let pool_vars: Vec<_> = inputs
            .cohorts
            .inventory
            .iter()
            .filter(|c| &c.node == origin && c.curr_date == prev_day && c.state == PRODUCTION_STATE)
            .filter_map(|c| mv.inventory.get(c))
            .collect();
        if pool_vars.is_empty() {
            // No tracked prior-day ambient cohort (e.g. the horizon's first
            // day): fall back to initial inventory only, handled by the
            // general inventory balance; nothing extra to bound here.
            continue;
        }
        let pool_expr: Expression = pool_vars.into_iter().map(|v| Expression::from(*v)).fold(Expression::from(0.0), |acc, e| acc + e);

        let morning_load: Expression = inputs
            .trucks
            .iter()
            .filter(|t| &t.origin_node_id == origin && t.departure_type == breadplan_core::DepartureType::Morning && t.is_active_on(*date))
            .flat_map(|t| {
                let transit = inputs.net_index.min_transit_days(&t.origin_node_id, &t.destination_node_id).unwrap_or(0.0);
                let delivery = *date + Duration::days(transit.ceil() as i64);
                inputs.products.iter().filter_map(move |p| mv.truck_load.get(&(t.id.clone(), p.clone(), delivery)))
            })
            .map(|v| Expression::from(*v))
            .fold(Expression::from(0.0), |acc, e| acc + e);

        model = model.with(constraint!(morning_load <= pool_expr));
    }
    model
}

/// spec §4.9 — `|production[t] - production[t-1]| <= alpha * max_daily_capacity`.
fn add_production_smoothing<M: SolverModel>(mut model: M, mv: &ModelVariables, inputs: &ConstraintInputs) -> M {
    for (mfg, node) in inputs.nodes_by_id.iter().filter(|(_, n)| n.capabilities.can_manufacture) {
        let rate = node.capabilities.production_rate_per_hour.unwrap_or(0.0);
        let max_daily_capacity = rate * 24.0;
        let cap = inputs.config.smoothing_alpha * max_daily_capacity;

        for product in inputs.products {
            let mut sorted_dates = inputs.all_dates.to_vec();
            sorted_dates.sort();
            for window in sorted_dates.windows(2) {
                let (prev, curr) = (window[0], window[1]);
                let (Some(&p_prev), Some(&p_curr)) = (
                    mv.production.get(&(mfg.clone(), product.clone(), prev)),
                    mv.production.get(&(mfg.clone(), product.clone(), curr)),
                ) else {
                    continue;
                };
                model = model.with(constraint!(p_curr - p_prev <= cap));
                model = model.with(constraint!(p_prev - p_curr <= cap));
            }
        }
    }
    model
}
