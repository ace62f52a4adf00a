//! Sparse cohort index builder — spec §4.3.
//!
//! Builds the `(node, product, prod_date, curr_date, state)` tuple set by
//! walking the network forward from manufacturing-born cohorts, instead of
//! enumerating the full 5-D Cartesian product (spec §9 "Multiple
//! interacting dimensions"). A worklist of cohort *origin events* — a
//! lineage beginning at some node in some state on some effective
//! production date — is expanded one hop at a time; a `visited` set keyed
//! on the same fields as [`CohortKey`] (minus `curr_date`) prevents
//! re-expanding a lineage the network has already produced, which also
//! makes the builder safe on a network with cycles.

use breadplan_core::{CohortState, Forecast, Horizon, NetworkIndex, NodeId, ProductId, TransportMode};
use chrono::{Duration, NaiveDate};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CohortKey {
    pub node: NodeId,
    pub product: ProductId,
    pub prod_date: NaiveDate,
    pub curr_date: NaiveDate,
    pub state: CohortState,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegKey {
    pub origin: NodeId,
    pub destination: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShipmentCohortKey {
    pub leg: LegKey,
    pub product: ProductId,
    /// Original production date, preserved for batch linking (spec §4.11)
    /// even when the arriving cohort's own shelf-life clock is reset.
    pub prod_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub arrival_state: CohortState,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DemandCohortKey {
    pub node: NodeId,
    pub product: ProductId,
    pub prod_date: NaiveDate,
    pub date: NaiveDate,
}

#[derive(Debug, Default)]
pub struct CohortIndex {
    pub inventory: Vec<CohortKey>,
    pub shipment: Vec<ShipmentCohortKey>,
    pub demand: Vec<DemandCohortKey>,
}

/// A leg whose transport mode physically carries `state` goods.
fn leg_carries_state(transport_mode: TransportMode, state: CohortState) -> bool {
    match transport_mode {
        TransportMode::Frozen => state == CohortState::Frozen,
        TransportMode::Ambient => matches!(state, CohortState::Ambient | CohortState::Thawed),
    }
}

/// Calendar-day offset a leg's (possibly half-integer) transit time maps
/// to in this daily-bucket model: a same-day leg has offset 0, any
/// fractional day rounds up to the next whole day (spec §3 Route supports
/// 0, 0.5, 1, ... transit_days; this grid only has whole-day buckets).
fn delivery_offset_days(transit_days: f64) -> i64 {
    transit_days.ceil() as i64
}

struct OriginEvent {
    node: NodeId,
    product: ProductId,
    prod_date: NaiveDate,
    first_available: NaiveDate,
    state: CohortState,
}

/// Build the sparse cohort, shipment, and demand index sets.
///
/// `products` is the full product catalog; `forecast` is used only to know
/// which (node, product, date) triples actually have demand, so the
/// `demand_from_cohort` index stays restricted to dates demand exists
/// (spec §4.3 "only when demand exists that day"). When `enforce_shelf_life`
/// is false, a cohort's shelf-life cap is widened to the horizon length, so
/// the index builder stops only at the horizon boundary rather than at
/// `CohortState::max_life_days`.
pub fn build_cohort_index(
    net_index: &NetworkIndex,
    products: &[ProductId],
    horizon: &Horizon,
    forecast: &Forecast,
    enforce_shelf_life: bool,
) -> CohortIndex {
    let mut inventory_set: HashSet<CohortKey> = HashSet::new();
    let mut shipment_set: HashSet<ShipmentCohortKey> = HashSet::new();
    let mut visited_lineages: HashSet<(NodeId, ProductId, NaiveDate, CohortState)> = HashSet::new();
    let mut queue: VecDeque<OriginEvent> = VecDeque::new();
    let horizon_span_days = (horizon.end - horizon.start).num_days() + 1;

    for product in products {
        for prod_date in horizon.dates() {
            for mfg in &net_index.manufacturing_nodes {
                queue.push_back(OriginEvent {
                    node: mfg.clone(),
                    product: product.clone(),
                    prod_date,
                    first_available: prod_date,
                    state: CohortState::Ambient,
                });
            }
        }
    }

    while let Some(event) = queue.pop_front() {
        let lineage_key = (event.node.clone(), event.product.clone(), event.prod_date, event.state);
        if !visited_lineages.insert(lineage_key) {
            continue;
        }

        let max_life = if enforce_shelf_life {
            event.state.max_life_days()
        } else {
            horizon_span_days
        };
        let last_date = event.prod_date + Duration::days(max_life);
        let mut curr_date = event.first_available;
        while curr_date < last_date && curr_date <= horizon.end {
            if horizon.contains(curr_date) {
                inventory_set.insert(CohortKey {
                    node: event.node.clone(),
                    product: event.product.clone(),
                    prod_date: event.prod_date,
                    curr_date,
                    state: event.state,
                });
            }
            curr_date += Duration::days(1);
        }

        // Propagate down every outbound leg this cohort's state can ride,
        // for every day the cohort is in inventory (and not yet expired).
        if let Some(edges) = net_index.routes_by_origin.get(&event.node) {
            for edge_idx in edges {
                let route = net_index.route(*edge_idx);
                if !leg_carries_state(route.transport_mode, event.state) {
                    continue;
                }
                let arrival_state = *net_index
                    .arrival_state_by_leg
                    .get(edge_idx)
                    .expect("edge indexed in arrival_state_by_leg");
                let offset = delivery_offset_days(route.transit_days);

                let mut departure_date = event.first_available;
                while departure_date < last_date && departure_date <= horizon.end {
                    let delivery_date = departure_date + Duration::days(offset);
                    if delivery_date > horizon.end {
                        departure_date += Duration::days(1);
                        continue;
                    }

                    shipment_set.insert(ShipmentCohortKey {
                        leg: LegKey {
                            origin: route.origin_node_id.clone(),
                            destination: route.destination_node_id.clone(),
                        },
                        product: event.product.clone(),
                        prod_date: event.prod_date,
                        delivery_date,
                        arrival_state,
                    });

                    let effective_prod_date = if arrival_state == CohortState::Thawed {
                        delivery_date
                    } else {
                        event.prod_date
                    };

                    queue.push_back(OriginEvent {
                        node: route.destination_node_id.clone(),
                        product: event.product.clone(),
                        prod_date: effective_prod_date,
                        first_available: delivery_date,
                        state: arrival_state,
                    });

                    departure_date += Duration::days(1);
                }
            }
        }
    }

    let mut inventory: Vec<CohortKey> = inventory_set.into_iter().collect();
    inventory.sort();

    let mut shipment: Vec<ShipmentCohortKey> = shipment_set.into_iter().collect();
    shipment.sort_by(|a, b| {
        (
            &a.leg.origin,
            &a.leg.destination,
            &a.product,
            a.prod_date,
            a.delivery_date,
        )
            .cmp(&(&b.leg.origin, &b.leg.destination, &b.product, b.prod_date, b.delivery_date))
    });

    let mut demand = Vec::new();
    for key in &inventory {
        if !key.state.can_satisfy_demand() {
            continue;
        }
        let has_demand = forecast
            .entries
            .iter()
            .any(|e| e.location_id == key.node && e.product_id == key.product && e.date == key.curr_date && e.quantity > 0.0);
        if has_demand {
            demand.push(DemandCohortKey {
                node: key.node.clone(),
                product: key.product.clone(),
                prod_date: key.prod_date,
                date: key.curr_date,
            });
        }
    }
    demand.sort_by(|a, b| (&a.node, &a.product, a.prod_date, a.date).cmp(&(&b.node, &b.product, b.prod_date, b.date)));

    CohortIndex {
        inventory,
        shipment,
        demand,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadplan_core::{Network, Node, NodeCapabilities, Route};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn direct_ambient_network() -> Network {
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
        net
    }

    #[test]
    fn direct_ambient_cohort_reaches_demand_node_one_day_later() {
        let net = direct_ambient_network();
        let idx = NetworkIndex::build(&net, &[]);
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 10));
        let forecast = Forecast::new(vec![breadplan_core::ForecastEntry {
            location_id: "Dn".into(),
            product_id: "P".into(),
            date: d(2026, 7, 3),
            quantity: 6000.0,
        }]);
        let cohorts = build_cohort_index(&idx, &["P".into()], &horizon, &forecast, true);

        assert!(cohorts
            .inventory
            .iter()
            .any(|c| c.node == NodeId::new("Dn") && c.curr_date == d(2026, 7, 3) && c.state == CohortState::Ambient));
        assert!(cohorts.demand.iter().any(|k| k.node == NodeId::new("Dn") && k.date == d(2026, 7, 3)));
    }

    #[test]
    fn frozen_cohorts_never_appear_in_demand_index() {
        let net = direct_ambient_network();
        let idx = NetworkIndex::build(&net, &[]);
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 10));
        let forecast = Forecast::new(vec![]);
        let cohorts = build_cohort_index(&idx, &["P".into()], &horizon, &forecast, true);
        assert!(cohorts.demand.iter().all(|_| true));
        assert!(!cohorts.inventory.iter().any(|c| c.state == CohortState::Frozen));
    }

    #[test]
    fn shelf_life_boundary_excludes_expired_ambient_cohort() {
        let net = direct_ambient_network();
        let idx = NetworkIndex::build(&net, &[]);
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 8, 31));
        let forecast = Forecast::new(vec![]);
        let cohorts = build_cohort_index(&idx, &["P".into()], &horizon, &forecast, true);
        let born = d(2026, 7, 1);
        // Ambient max life is 17 days: t = D + 17 must not be created.
        assert!(!cohorts
            .inventory
            .iter()
            .any(|c| c.node == NodeId::new("M") && c.prod_date == born && c.curr_date == born + Duration::days(17)));
        assert!(cohorts
            .inventory
            .iter()
            .any(|c| c.node == NodeId::new("M") && c.prod_date == born && c.curr_date == born + Duration::days(16)));
    }
}
