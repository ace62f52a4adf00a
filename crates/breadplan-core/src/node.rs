//! Node (facility) domain types — spec §3 "Node".

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Where a node can hold inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    Frozen,
    Ambient,
    Both,
}

impl StorageMode {
    pub fn can_hold_frozen(&self) -> bool {
        matches!(self, StorageMode::Frozen | StorageMode::Both)
    }

    pub fn can_hold_ambient(&self) -> bool {
        matches!(self, StorageMode::Ambient | StorageMode::Both)
    }
}

/// Capability flags and default labor parameters for a node.
///
/// A node is polymorphic by capability, not by subtype: the balance rule and
/// constraint builders branch on these predicates rather than on a class
/// hierarchy (see spec §9 "Polymorphic node").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCapabilities {
    pub can_manufacture: bool,
    /// Required, and must be > 0, when `can_manufacture` is true.
    pub production_rate_per_hour: Option<f64>,
    pub can_store: bool,
    pub storage_mode: StorageMode,
    pub has_demand: bool,
    pub requires_truck_schedules: bool,
    pub daily_startup_hours: f64,
    pub daily_shutdown_hours: f64,
    pub default_changeover_hours: f64,
}

impl Default for NodeCapabilities {
    fn default() -> Self {
        Self {
            can_manufacture: false,
            production_rate_per_hour: None,
            can_store: false,
            // Manufacturing nodes default to ambient intrinsic storage; entry
            // into frozen storage happens only via freeze-on-arrival at a
            // downstream frozen-only node.
            storage_mode: StorageMode::Ambient,
            has_demand: false,
            requires_truck_schedules: false,
            daily_startup_hours: 0.5,
            daily_shutdown_hours: 0.5,
            default_changeover_hours: 1.0,
        }
    }
}

impl NodeCapabilities {
    pub fn validate(&self, node_id: &NodeId) -> Result<(), String> {
        if self.can_manufacture {
            match self.production_rate_per_hour {
                Some(rate) if rate > 0.0 => {}
                _ => {
                    return Err(format!(
                        "node {node_id} can_manufacture but has no positive production_rate_per_hour"
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn fixed_overhead_hours(&self) -> f64 {
        self.daily_startup_hours + self.daily_shutdown_hours
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub capabilities: NodeCapabilities,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, capabilities: NodeCapabilities) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capabilities,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.capabilities.validate(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturing_node_requires_production_rate() {
        let caps = NodeCapabilities {
            can_manufacture: true,
            production_rate_per_hour: None,
            ..Default::default()
        };
        let node = Node::new("M", "Manufacturing", caps);
        assert!(node.validate().is_err());
    }

    #[test]
    fn storage_mode_both_holds_either_state() {
        assert!(StorageMode::Both.can_hold_frozen());
        assert!(StorageMode::Both.can_hold_ambient());
        assert!(!StorageMode::Frozen.can_hold_ambient());
    }
}
