//! Route (leg) domain types and the arrival-state derivation rule —
//! spec §3 "Route (leg)" and "Arrival state of a leg".

use crate::ids::NodeId;
use crate::node::StorageMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    Frozen,
    Ambient,
}

/// The state a cohort is in while sitting in inventory, or while riding a
/// shipment. Transitions between states happen only at arrival — there is
/// no separate "is frozen" flag anywhere; the cohort key's state dimension
/// carries the semantics (spec §9 "Freeze/thaw state machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CohortState {
    Frozen,
    Ambient,
    Thawed,
}

impl CohortState {
    /// Shelf-life ceiling in days, counted from the cohort's effective
    /// `prod_date` (which is reset on freeze-on-arrival and on thaw).
    pub fn max_life_days(&self) -> i64 {
        match self {
            CohortState::Ambient => 17,
            CohortState::Thawed => 14,
            CohortState::Frozen => 120,
        }
    }

    /// Frozen cohorts cannot satisfy demand (spec §4.6).
    pub fn can_satisfy_demand(&self) -> bool {
        !matches!(self, CohortState::Frozen)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub origin_node_id: NodeId,
    pub destination_node_id: NodeId,
    pub transit_days: f64,
    pub transport_mode: TransportMode,
    pub cost_per_unit: f64,
}

impl Route {
    pub fn validate(&self) -> Result<(), String> {
        if self.transit_days < 0.0 {
            return Err(format!(
                "route {}->{} has negative transit_days",
                self.origin_node_id, self.destination_node_id
            ));
        }
        // transit_days must be an integer or half-integer (spec §3).
        let doubled = self.transit_days * 2.0;
        if (doubled - doubled.round()).abs() > 1e-9 {
            return Err(format!(
                "route {}->{} transit_days {} is not integer or half-integer",
                self.origin_node_id, self.destination_node_id, self.transit_days
            ));
        }
        Ok(())
    }
}

/// Derive the state a shipment on `route` arrives in at a destination with
/// the given intrinsic storage mode (spec §3 "Arrival state of a leg").
pub fn arrival_state(transport_mode: TransportMode, destination_storage: StorageMode) -> CohortState {
    match (transport_mode, destination_storage) {
        (TransportMode::Ambient, StorageMode::Ambient) => CohortState::Ambient,
        (TransportMode::Ambient, StorageMode::Both) => CohortState::Ambient,
        // Ambient transport into a frozen-only node: freeze on arrival.
        (TransportMode::Ambient, StorageMode::Frozen) => CohortState::Frozen,
        (TransportMode::Frozen, StorageMode::Frozen) => CohortState::Frozen,
        (TransportMode::Frozen, StorageMode::Both) => CohortState::Frozen,
        // Frozen transport into an ambient-only node: thaw on arrival.
        (TransportMode::Frozen, StorageMode::Ambient) => CohortState::Thawed,
    }
}
