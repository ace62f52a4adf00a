//! The raw network container: nodes and routes as a directed graph.
//!
//! Directed rather than undirected, since a leg's cost and transport mode
//! are not symmetric the way a transmission branch's impedance would be.

use crate::ids::NodeId;
use crate::node::Node;
use crate::route::Route;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Network {
    pub graph: DiGraph<Node, Route>,
    index_by_id: HashMap<NodeId, NodeIndex>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index_by_id.insert(id, idx);
        idx
    }

    pub fn add_route(&mut self, route: Route) -> Result<(), String> {
        route.validate()?;
        let origin = *self
            .index_by_id
            .get(&route.origin_node_id)
            .ok_or_else(|| format!("route origin {} not found", route.origin_node_id))?;
        let destination = *self
            .index_by_id
            .get(&route.destination_node_id)
            .ok_or_else(|| format!("route destination {} not found", route.destination_node_id))?;
        self.graph.add_edge(origin, destination, route);
        Ok(())
    }

    pub fn node_index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.graph.edge_weights()
    }
}
