//! JSON view of a [`PlanOutput`] — spec §6 "Outputs". `cohort_inventory` is
//! keyed by a tuple in-process, which does not survive a JSON object key
//! (object keys must be strings), so it is flattened to a list of entries
//! here.

use breadplan_core::{CohortState, NodeId, ProductId};
use breadplan_solver::PlanOutput;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CohortInventoryEntry {
    pub node_id: NodeId,
    pub product_id: ProductId,
    pub production_date: NaiveDate,
    pub current_date: NaiveDate,
    pub state: CohortState,
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
pub struct LaborHoursEntry {
    pub date: NaiveDate,
    pub fixed_hours: f64,
    pub overtime_hours: f64,
    pub non_fixed_hours: f64,
}

#[derive(Debug, Serialize)]
pub struct PlanOutputView<'a> {
    pub production_batches: &'a [breadplan_core::ProductionBatch],
    pub shipments: &'a [breadplan_core::Shipment],
    pub cohort_inventory: Vec<CohortInventoryEntry>,
    pub cost_breakdown: &'a breadplan_solver::CostBreakdown,
    pub labor_hours: Vec<LaborHoursEntry>,
    pub solver_status: &'a breadplan_solver::SolverStatus,
    pub validation: &'a breadplan_solver::ValidationReport,
}

impl<'a> PlanOutputView<'a> {
    pub fn from_output(output: &'a PlanOutput) -> Self {
        let mut cohort_inventory: Vec<CohortInventoryEntry> = output
            .cohort_inventory
            .iter()
            .map(|((node_id, product_id, prod_date, curr_date, state), &quantity)| CohortInventoryEntry {
                node_id: node_id.clone(),
                product_id: product_id.clone(),
                production_date: *prod_date,
                current_date: *curr_date,
                state: *state,
                quantity,
            })
            .collect();
        cohort_inventory.sort_by(|a, b| {
            (a.current_date, &a.node_id, &a.product_id, a.state as u8).cmp(&(
                b.current_date,
                &b.node_id,
                &b.product_id,
                b.state as u8,
            ))
        });

        let mut labor_hours: Vec<LaborHoursEntry> = output
            .labor_hours_by_date
            .iter()
            .map(|(date, (fixed, overtime, non_fixed))| LaborHoursEntry {
                date: *date,
                fixed_hours: *fixed,
                overtime_hours: *overtime,
                non_fixed_hours: *non_fixed,
            })
            .collect();
        labor_hours.sort_by_key(|entry| entry.date);

        Self {
            production_batches: &output.production_batches,
            shipments: &output.shipments,
            cohort_inventory,
            cost_breakdown: &output.cost_breakdown,
            labor_hours,
            solver_status: &output.solver_status,
            validation: &output.validation,
        }
    }
}
