//! Decision variable creation — spec §4.4.
//!
//! Every variable is created once, up front, keyed by the sparse index
//! tuples `build_cohort_index` produced, and handed out to the
//! constraint/objective builders by lookup rather than by re-deriving
//! bounds at each use site.

use crate::cohort::{CohortIndex, CohortKey, DemandCohortKey, ShipmentCohortKey};
use breadplan_core::{CohortState, NetworkIndex, NodeId, ProductId, TruckSchedule};
use chrono::NaiveDate;
use good_lp::{variable, ProblemVariables, Variable};
use std::collections::HashMap;

/// Every decision variable in the model, keyed by the same tuples used to
/// build the sparse indices. Built once by [`create_variables`] and then
/// read (never mutated) by the constraint and objective builders.
#[derive(Debug, Default)]
pub struct ModelVariables {
    pub production: HashMap<(NodeId, ProductId, NaiveDate), Variable>,
    pub production_cases: HashMap<(NodeId, ProductId, NaiveDate), Variable>,
    pub produces_product: HashMap<(NodeId, ProductId, NaiveDate), Variable>,
    pub produces_any: HashMap<(NodeId, NaiveDate), Variable>,

    pub inventory: HashMap<CohortKey, Variable>,
    pub shipment: HashMap<ShipmentCohortKey, Variable>,
    pub demand_from_cohort: HashMap<DemandCohortKey, Variable>,
    pub shortage: HashMap<(NodeId, ProductId, NaiveDate), Variable>,

    pub truck_used: HashMap<(breadplan_core::TruckId, NaiveDate), Variable>,
    pub truck_load: HashMap<(breadplan_core::TruckId, ProductId, NaiveDate), Variable>,
    pub pallets_loaded: HashMap<(breadplan_core::TruckId, NodeId, NaiveDate), Variable>,

    pub labor_hours_used: HashMap<NaiveDate, Variable>,
    pub h_fixed: HashMap<NaiveDate, Variable>,
    pub h_overtime: HashMap<NaiveDate, Variable>,
    pub h_non_fixed: HashMap<NaiveDate, Variable>,

    /// Ceil-linked pallet count per (node, state, date), used only when the
    /// cost structure prices holding per pallet-day rather than per unit.
    pub inv_pallets: HashMap<(NodeId, CohortState, NaiveDate), Variable>,
}

/// What inventory state a manufacturing node's fresh production lands in.
/// Spec §4.5 "Production_state(N): ambient by default."
pub const PRODUCTION_STATE: CohortState = CohortState::Ambient;

pub struct VariableBuildConfig {
    pub allow_shortages: bool,
    pub enforce_packaging_constraints: bool,
    pub use_pallet_holding: HashMap<CohortState, bool>,
}

/// Materialize every decision variable the model needs.
///
/// `products` is the full catalog, `manufacturing_dates` the horizon dates
/// a manufacturing node could produce on, and `trucks` the truck schedule
/// list (used to build `truck_used`/`truck_load`/`pallets_loaded` only for
/// trucks actually active on a given date, per spec §4.3's sparsity
/// discipline extended to truck variables).
#[allow(clippy::too_many_arguments)]
pub fn create_variables(
    vars: &mut ProblemVariables,
    net_index: &NetworkIndex,
    cohorts: &CohortIndex,
    manufacturing_nodes: &[NodeId],
    products: &[ProductId],
    manufacturing_dates: &[NaiveDate],
    trucks: &[TruckSchedule],
    all_dates: &[NaiveDate],
    config: &VariableBuildConfig,
) -> ModelVariables {
    let mut mv = ModelVariables::default();

    for mfg in manufacturing_nodes {
        for date in manufacturing_dates {
            mv.produces_any.insert(
                (mfg.clone(), *date),
                vars.add(variable().binary().name(format!("produces_any_{mfg}_{date}"))),
            );
            for product in products {
                let cases = vars.add(
                    variable()
                        .integer()
                        .min(0.0)
                        .name(format!("production_cases_{mfg}_{product}_{date}")),
                );
                mv.production_cases.insert((mfg.clone(), product.clone(), *date), cases);
                mv.production.insert(
                    (mfg.clone(), product.clone(), *date),
                    vars.add(variable().min(0.0).name(format!("production_{mfg}_{product}_{date}"))),
                );
                mv.produces_product.insert(
                    (mfg.clone(), product.clone(), *date),
                    vars.add(variable().binary().name(format!("produces_{mfg}_{product}_{date}"))),
                );
            }
        }
    }

    for key in &cohorts.inventory {
        mv.inventory.insert(
            key.clone(),
            vars.add(variable().min(0.0).name(format!(
                "inv_{}_{}_{}_{}_{:?}",
                key.node, key.product, key.prod_date, key.curr_date, key.state
            ))),
        );
    }

    for key in &cohorts.shipment {
        mv.shipment.insert(
            key.clone(),
            vars.add(variable().min(0.0).name(format!(
                "ship_{}_{}_{}_{}_{}_{:?}",
                key.leg.origin, key.leg.destination, key.product, key.prod_date, key.delivery_date, key.arrival_state
            ))),
        );
    }

    for key in &cohorts.demand {
        mv.demand_from_cohort.insert(
            key.clone(),
            vars.add(variable().min(0.0).name(format!(
                "dfc_{}_{}_{}_{}",
                key.node, key.product, key.prod_date, key.date
            ))),
        );
        if config.allow_shortages {
            mv.shortage
                .entry((key.node.clone(), key.product.clone(), key.date))
                .or_insert_with(|| vars.add(variable().min(0.0).name(format!("shortage_{}_{}_{}", key.node, key.product, key.date))));
        }
    }

    for truck in trucks {
        for date in all_dates {
            if !truck.is_active_on(*date) {
                continue;
            }
            mv.truck_used.insert(
                (truck.id.clone(), *date),
                vars.add(variable().binary().name(format!("truck_used_{}_{}", truck.id, date))),
            );
            if config.enforce_packaging_constraints {
                mv.pallets_loaded.insert(
                    (truck.id.clone(), truck.destination_node_id.clone(), *date),
                    vars.add(
                        variable()
                            .integer()
                            .min(0.0)
                            .name(format!("pallets_{}_{}_{}", truck.id, truck.destination_node_id, date)),
                    ),
                );
            }
            let transit = net_index
                .min_transit_days(&truck.origin_node_id, &truck.destination_node_id)
                .unwrap_or(0.0);
            let delivery_date = *date + chrono::Duration::days(transit.ceil() as i64);
            for product in products {
                mv.truck_load.entry((truck.id.clone(), product.clone(), delivery_date)).or_insert_with(|| {
                    vars.add(variable().min(0.0).name(format!(
                        "truck_load_{}_{}_{}",
                        truck.id, product, delivery_date
                    )))
                });
            }
        }
    }

    for date in all_dates {
        mv.labor_hours_used
            .insert(*date, vars.add(variable().min(0.0).name(format!("labor_hours_{date}"))));
        mv.h_fixed
            .insert(*date, vars.add(variable().min(0.0).name(format!("h_fixed_{date}"))));
        mv.h_overtime
            .insert(*date, vars.add(variable().min(0.0).name(format!("h_overtime_{date}"))));
        mv.h_non_fixed
            .insert(*date, vars.add(variable().min(0.0).name(format!("h_non_fixed_{date}"))));
    }

    for (&state, &use_it) in config.use_pallet_holding.iter() {
        if !use_it {
            continue;
        }
        for date in all_dates {
            let nodes: std::collections::HashSet<NodeId> = cohorts
                .inventory
                .iter()
                .filter(|c| c.state == state && c.curr_date == *date)
                .map(|c| c.node.clone())
                .collect();
            for node in nodes {
                mv.inv_pallets.entry((node.clone(), state, *date)).or_insert_with(|| {
                    vars.add(variable().integer().min(0.0).name(format!("inv_pallets_{node}_{state:?}_{date}")))
                });
            }
        }
    }

    mv
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadplan_core::{Forecast, ForecastEntry, Horizon, Network, NetworkIndex, Node, NodeCapabilities, Route, TransportMode};
    use good_lp::variables;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn production_and_inventory_variables_created_for_every_cohort() {
        let mut net = Network::new();
        net.add_node(Node::new(
            "M",
            "M",
            NodeCapabilities {
                can_manufacture: true,
                production_rate_per_hour: Some(1400.0),
                can_store: true,
                ..Default::default()
            },
        ));
        net.add_node(Node::new(
            "Dn",
            "Dn",
            NodeCapabilities {
                can_store: true,
                has_demand: true,
                ..Default::default()
            },
        ));
        net.add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "Dn".into(),
            transit_days: 1.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.3,
        })
        .unwrap();

        let idx = NetworkIndex::build(&net, &[]);
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 10));
        let forecast = Forecast::new(vec![ForecastEntry {
            location_id: "Dn".into(),
            product_id: "P".into(),
            date: d(2026, 7, 3),
            quantity: 6000.0,
        }]);
        let products = vec![ProductId::new("P")];
        let cohorts = crate::cohort::build_cohort_index(&idx, &products, &horizon, &forecast, true);
        let all_dates: Vec<NaiveDate> = horizon.dates().collect();

        let mut vars = variables!();
        let config = VariableBuildConfig {
            allow_shortages: false,
            enforce_packaging_constraints: true,
            use_pallet_holding: HashMap::new(),
        };
        let mv = create_variables(&mut vars, &idx, &cohorts, &idx.manufacturing_nodes, &products, &all_dates, &[], &all_dates, &config);

        assert!(!mv.inventory.is_empty());
        assert!(mv.production.contains_key(&(NodeId::new("M"), ProductId::new("P"), d(2026, 7, 1))));
        assert!(!mv.demand_from_cohort.is_empty());
        assert!(mv.shortage.is_empty());
    }
}
