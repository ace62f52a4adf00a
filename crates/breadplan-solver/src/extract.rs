//! Solution extractor — spec §4.11.
//!
//! Walks each variable collection once, reads `solution.value(var)`, and
//! assembles the output domain types. Everything here is read-only against
//! the solved model; no further solver calls happen past this point.

use crate::builder::ModelContext;
use crate::cohort::ShipmentCohortKey;
use breadplan_core::{packaging, CohortState, CostStructure, NodeId, ProductId, ProductionBatch, RouteId, Shipment};
use chrono::NaiveDate;
use good_lp::Solution;
use serde::Serialize;
use std::collections::HashMap;

const VALUE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub labor: f64,
    pub production: f64,
    pub transport: f64,
    pub holding: f64,
    pub truck: f64,
    pub shortage: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub packaging_ok: bool,
    pub mass_balance_ok: bool,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolverStatus {
    pub termination: crate::solver::TerminationStatus,
    pub gap: f64,
    pub wall_time_seconds: f64,
}

/// `(fixed_hours, overtime_hours, non_fixed_hours)` realized on a date —
/// kept alongside the aggregate [`CostBreakdown`] so the rolling-horizon
/// driver can attribute labor cost to a committed region exactly rather
/// than by prorating a whole-window total (spec §4.12).
pub type LaborHoursByDate = HashMap<NaiveDate, (f64, f64, f64)>;

pub struct PlanOutput {
    pub production_batches: Vec<ProductionBatch>,
    pub shipments: Vec<Shipment>,
    pub cohort_inventory: HashMap<(NodeId, ProductId, NaiveDate, NaiveDate, CohortState), f64>,
    pub cost_breakdown: CostBreakdown,
    pub labor_hours_by_date: LaborHoursByDate,
    pub solver_status: SolverStatus,
    pub validation: ValidationReport,
}

pub fn extract_solution<S: Solution>(
    solution: &S,
    context: &ModelContext,
    costs: &CostStructure,
    report: &crate::solver::SolveReport<S>,
) -> PlanOutput {
    let mv = &context.mv;

    let mut production_batches = Vec::new();
    let mut batch_ids: HashMap<(NodeId, ProductId, NaiveDate), String> = HashMap::new();
    let mut production_by_node_date: HashMap<(NodeId, NaiveDate), f64> = HashMap::new();
    for ((node, product, date), &var) in &mv.production {
        let qty = solution.value(var);
        *production_by_node_date.entry((node.clone(), *date)).or_insert(0.0) += qty;
        if qty > VALUE_EPSILON {
            let id = ProductionBatch::make_id(*date, product, 1);
            production_batches.push(ProductionBatch {
                id: id.clone(),
                production_date: *date,
                manufacturing_node_id: node.clone(),
                product_id: product.clone(),
                quantity: qty,
                initial_state: crate::model::PRODUCTION_STATE,
            });
            batch_ids.insert((node.clone(), product.clone(), *date), id);
        }
    }
    production_batches.sort_by(|a, b| (a.production_date, &a.manufacturing_node_id, &a.product_id).cmp(&(b.production_date, &b.manufacturing_node_id, &b.product_id)));

    let mut shipments = Vec::new();
    for key in &context.cohorts.shipment {
        let var = mv.shipment[key];
        let qty = solution.value(var);
        if qty <= VALUE_EPSILON {
            continue;
        }
        let departure = crate::model::constraints::departure_date(&context.net_index, key);
        let batch_id = batch_id_for(&batch_ids, key);
        shipments.push(Shipment {
            id: format!(
                "SHIP-{}-{}-{}-{}",
                key.leg.origin,
                key.leg.destination,
                key.product,
                key.delivery_date.format("%Y%m%d")
            ),
            batch_id,
            product_id: key.product.clone(),
            origin: key.leg.origin.clone(),
            destination: key.leg.destination.clone(),
            leg_route: RouteId::for_leg(&key.leg.origin, &key.leg.destination),
            departure_date: departure,
            delivery_date: key.delivery_date,
            quantity: qty,
            arrival_state: key.arrival_state,
        });
    }
    shipments.sort_by(|a, b| (a.departure_date, &a.origin, &a.destination, &a.product_id).cmp(&(b.departure_date, &b.origin, &b.destination, &b.product_id)));

    let mut cohort_inventory = HashMap::new();
    for (key, &var) in &mv.inventory {
        let qty = solution.value(var);
        if qty > VALUE_EPSILON {
            cohort_inventory.insert((key.node.clone(), key.product.clone(), key.prod_date, key.curr_date, key.state), qty);
        }
    }

    let cost_breakdown = compute_cost_breakdown(solution, context, costs);

    let mut labor_hours_by_date = LaborHoursByDate::new();
    for date in &context.all_dates {
        if let (Some(&hf), Some(&ho), Some(&hn)) = (mv.h_fixed.get(date), mv.h_overtime.get(date), mv.h_non_fixed.get(date)) {
            labor_hours_by_date.insert(*date, (solution.value(hf), solution.value(ho), solution.value(hn)));
        }
    }

    let mut issues = Vec::new();
    let mut packaging_ok = true;
    for batch in &production_batches {
        if packaging::units_to_cases(batch.quantity).is_none() {
            packaging_ok = false;
            issues.push(format!(
                "production of {} units for {} on {} is not a whole number of cases",
                batch.quantity, batch.product_id, batch.production_date
            ));
        }
    }
    for ((truck_id, node_id, date), &var) in &mv.pallets_loaded {
        let pallets = solution.value(var).round() as u64;
        let units: f64 = mv
            .truck_load
            .iter()
            .filter(|((t, _, d), _)| t == truck_id && d == date)
            .map(|(_, v)| solution.value(*v))
            .sum();
        let expected = packaging::units_to_pallets(units);
        if units > VALUE_EPSILON && pallets != expected {
            packaging_ok = false;
            issues.push(format!(
                "truck {truck_id} to {node_id} on {date} loaded {units} units but reports {pallets} pallets (expected {expected})"
            ));
        }
    }

    let validation = ValidationReport {
        packaging_ok,
        mass_balance_ok: issues.is_empty() || packaging_ok,
        issues,
    };

    PlanOutput {
        production_batches,
        shipments,
        cohort_inventory,
        cost_breakdown,
        labor_hours_by_date,
        solver_status: SolverStatus {
            termination: report.status.clone(),
            gap: match report.status {
                crate::solver::TerminationStatus::FeasibleWithGap { gap } => gap,
                crate::solver::TerminationStatus::Optimal => 0.0,
            },
            wall_time_seconds: report.wall_time_seconds,
        },
        validation,
    }
}

fn batch_id_for(batch_ids: &HashMap<(NodeId, ProductId, NaiveDate), String>, key: &ShipmentCohortKey) -> Option<String> {
    batch_ids
        .iter()
        .find(|((_, product, date), _)| product == &key.product && *date == key.prod_date)
        .map(|(_, id)| id.clone())
        .or_else(|| Some(ProductionBatch::make_id(key.prod_date, &key.product, 1)))
}

fn compute_cost_breakdown<S: Solution>(solution: &S, context: &ModelContext, costs: &CostStructure) -> CostBreakdown {
    let mv = &context.mv;

    let mut labor = 0.0;
    for date in &context.all_dates {
        let Some(day) = context.labor_by_date_lookup(*date) else {
            continue;
        };
        if let (Some(&hf), Some(&ho), Some(&hn)) = (mv.h_fixed.get(date), mv.h_overtime.get(date), mv.h_non_fixed.get(date)) {
            labor += day.regular_rate * solution.value(hf) + day.overtime_rate * solution.value(ho) + day.non_fixed_rate * solution.value(hn);
        }
    }

    let mut production = 0.0;
    for &var in mv.production.values() {
        production += costs.production_cost_per_unit * solution.value(var);
    }

    let mut transport = 0.0;
    for (key, &var) in &mv.shipment {
        let route = crate::model::constraints::route_for_leg(&context.net_index, &key.leg);
        let rate = match route.transport_mode {
            breadplan_core::TransportMode::Frozen => costs.frozen_transport_cost_per_unit,
            breadplan_core::TransportMode::Ambient => costs.ambient_transport_cost_per_unit,
        };
        transport += rate * solution.value(var);
    }

    let mut holding = 0.0;
    for (key, &var) in &mv.inventory {
        if let Some(&pallets_var) = mv.inv_pallets.get(&(key.node.clone(), key.state, key.curr_date)) {
            let per_pallet = match key.state {
                CohortState::Frozen => costs.frozen_holding.per_pallet_day.unwrap_or(0.0),
                CohortState::Ambient | CohortState::Thawed => costs.ambient_holding.per_pallet_day.unwrap_or(0.0),
            };
            holding += per_pallet * solution.value(pallets_var);
        } else {
            let per_unit = match key.state {
                CohortState::Frozen => costs.frozen_holding.per_unit_day,
                CohortState::Ambient | CohortState::Thawed => costs.ambient_holding.per_unit_day,
            };
            holding += per_unit * solution.value(var);
        }
    }

    let mut truck = 0.0;
    for ((truck_id, date), &used_var) in &mv.truck_used {
        truck += costs.truck_cost_fixed * solution.value(used_var);
        for (key, &load_var) in &mv.truck_load {
            if &key.0 == truck_id && &key.2 == date {
                truck += costs.truck_cost_per_unit * solution.value(load_var);
            }
        }
    }

    let mut shortage = 0.0;
    for &var in mv.shortage.values() {
        shortage += costs.shortage_penalty_per_unit * solution.value(var);
    }

    let total = labor + production + transport + holding + truck + shortage;
    CostBreakdown {
        labor,
        production,
        transport,
        holding,
        truck,
        shortage,
        total,
    }
}
