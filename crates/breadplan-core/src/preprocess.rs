//! Network preprocessor — spec §4.1.
//!
//! Classifies nodes by storage capability, enumerates routing legs, computes
//! per-leg arrival state, and builds the reverse indices the model builder
//! and cohort index builder consume.

use crate::ids::{NodeId, TruckId};
use crate::network::Network;
use crate::node::StorageMode;
use crate::route::{arrival_state, CohortState};
use crate::truck::TruckSchedule;
use chrono::NaiveDate;
use petgraph::algo::dijkstra;
use petgraph::graph::EdgeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

#[derive(Debug)]
pub struct NetworkIndex<'a> {
    network: &'a Network,
    pub manufacturing_nodes: Vec<NodeId>,
    pub demand_nodes: Vec<NodeId>,
    pub frozen_storage_nodes: Vec<NodeId>,
    pub ambient_storage_nodes: Vec<NodeId>,
    pub hub_nodes: Vec<NodeId>,
    pub routes_by_origin: HashMap<NodeId, Vec<EdgeIndex>>,
    pub routes_by_destination: HashMap<NodeId, Vec<EdgeIndex>>,
    pub arrival_state_by_leg: HashMap<EdgeIndex, CohortState>,
    trucks_by_od: HashMap<(NodeId, NodeId), Vec<&'a TruckSchedule>>,
}

impl<'a> NetworkIndex<'a> {
    pub fn build(network: &'a Network, trucks: &'a [TruckSchedule]) -> Self {
        let mut manufacturing_nodes = Vec::new();
        let mut demand_nodes = Vec::new();
        let mut frozen_storage_nodes = Vec::new();
        let mut ambient_storage_nodes = Vec::new();

        for node in network.nodes() {
            if node.capabilities.can_manufacture {
                manufacturing_nodes.push(node.id.clone());
            }
            if node.capabilities.has_demand {
                demand_nodes.push(node.id.clone());
            }
            if node.capabilities.can_store && node.capabilities.storage_mode.can_hold_frozen() {
                frozen_storage_nodes.push(node.id.clone());
            }
            if node.capabilities.can_store && node.capabilities.storage_mode.can_hold_ambient() {
                ambient_storage_nodes.push(node.id.clone());
            }
        }

        let mut routes_by_origin: HashMap<NodeId, Vec<EdgeIndex>> = HashMap::new();
        let mut routes_by_destination: HashMap<NodeId, Vec<EdgeIndex>> = HashMap::new();
        let mut arrival_state_by_leg = HashMap::new();

        for edge in network.graph.edge_references() {
            let route = edge.weight();
            let destination_storage = network
                .node(&route.destination_node_id)
                .map(|n| n.capabilities.storage_mode)
                .unwrap_or(StorageMode::Ambient);

            routes_by_origin
                .entry(route.origin_node_id.clone())
                .or_default()
                .push(edge.id());
            routes_by_destination
                .entry(route.destination_node_id.clone())
                .or_default()
                .push(edge.id());
            arrival_state_by_leg.insert(edge.id(), arrival_state(route.transport_mode, destination_storage));
        }

        let manufacturing_set: std::collections::HashSet<_> = manufacturing_nodes.iter().cloned().collect();
        let hub_nodes = routes_by_origin
            .keys()
            .filter(|id| !manufacturing_set.contains(*id))
            .cloned()
            .collect();

        let mut trucks_by_od: HashMap<(NodeId, NodeId), Vec<&TruckSchedule>> = HashMap::new();
        for truck in trucks {
            trucks_by_od
                .entry((truck.origin_node_id.clone(), truck.destination_node_id.clone()))
                .or_default()
                .push(truck);
        }

        Self {
            network,
            manufacturing_nodes,
            demand_nodes,
            frozen_storage_nodes,
            ambient_storage_nodes,
            hub_nodes,
            routes_by_origin,
            routes_by_destination,
            arrival_state_by_leg,
            trucks_by_od,
        }
    }

    /// Look up a route by the edge index recorded in `routes_by_origin` /
    /// `routes_by_destination` / `arrival_state_by_leg`.
    pub fn route(&self, edge: EdgeIndex) -> &'a crate::route::Route {
        &self.network.graph[edge]
    }

    /// Trucks scheduled between an origin/destination pair that are active
    /// on `date` (spec §3 "active" truck).
    pub fn active_trucks(&self, origin: &NodeId, destination: &NodeId, date: NaiveDate) -> Vec<&TruckId> {
        self.trucks_by_od
            .get(&(origin.clone(), destination.clone()))
            .into_iter()
            .flatten()
            .filter(|t| t.is_active_on(date))
            .map(|t| &t.id)
            .collect()
    }

    /// Shortest transit time in days from `from` to `to` over any sequence
    /// of legs, used by the cohort index builder for reachability pruning
    /// and earliest-arrival computation (spec §4.3).
    pub fn min_transit_days(&self, from: &NodeId, to: &NodeId) -> Option<f64> {
        let start = self.network.node_index(from)?;
        let target = self.network.node_index(to)?;
        let costs = dijkstra(&self.network.graph, start, Some(target), |e| e.weight().transit_days);
        costs.get(&target).copied()
    }

    /// Every node reachable from at least one manufacturing node, including
    /// the manufacturing nodes themselves.
    pub fn reachable_from_manufacturing(&self) -> Vec<NodeId> {
        let mut reachable = std::collections::HashSet::new();
        for mfg in &self.manufacturing_nodes {
            reachable.insert(mfg.clone());
            if let Some(start) = self.network.node_index(mfg) {
                let costs = dijkstra(&self.network.graph, start, None, |e| e.weight().transit_days);
                for idx in costs.keys() {
                    reachable.insert(self.network.graph[*idx].id.clone());
                }
            }
        }
        reachable.into_iter().collect()
    }
}
