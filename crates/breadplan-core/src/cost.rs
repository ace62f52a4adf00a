//! Cost structure domain type — spec §3 "CostStructure".

use serde::{Deserialize, Serialize};

/// Holding cost can be priced per-unit-day or per-pallet-day; when the
/// pallet rate is provided it takes precedence (spec §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingRate {
    pub per_unit_day: f64,
    pub per_pallet_day: Option<f64>,
}

impl HoldingRate {
    pub fn uses_pallet_rate(&self) -> bool {
        self.per_pallet_day.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostStructure {
    pub production_cost_per_unit: f64,
    pub frozen_transport_cost_per_unit: f64,
    pub ambient_transport_cost_per_unit: f64,
    pub frozen_holding: HoldingRate,
    pub ambient_holding: HoldingRate,
    pub shortage_penalty_per_unit: f64,
    pub truck_cost_fixed: f64,
    pub truck_cost_per_unit: f64,
    pub waste_cost_multiplier: f64,
}

impl Default for CostStructure {
    fn default() -> Self {
        Self {
            production_cost_per_unit: 0.0,
            frozen_transport_cost_per_unit: 0.0,
            ambient_transport_cost_per_unit: 0.0,
            frozen_holding: HoldingRate {
                per_unit_day: 0.0,
                per_pallet_day: None,
            },
            ambient_holding: HoldingRate {
                per_unit_day: 0.0,
                per_pallet_day: None,
            },
            // Large by construction; callers should still validate it
            // dominates every other per-unit rate in the objective.
            shortage_penalty_per_unit: 1_000_000.0,
            truck_cost_fixed: 0.0,
            truck_cost_per_unit: 0.0,
            waste_cost_multiplier: 1.0,
        }
    }
}
