//! Demand forecast domain types — spec §3 "ForecastEntry".

use crate::ids::{NodeId, ProductId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub location_id: NodeId,
    pub product_id: ProductId,
    pub date: NaiveDate,
    pub quantity: f64,
}

impl ForecastEntry {
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity < 0.0 {
            return Err(format!(
                "forecast entry for {} / {} on {} has negative quantity",
                self.location_id, self.product_id, self.date
            ));
        }
        Ok(())
    }
}

/// A forecast is just an ordered bag of entries; it is cheap enough that we
/// do not index it eagerly — callers (the preprocessor, the aggregator)
/// build whatever index shape they need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    /// Entries within `[start, end]` inclusive; entries outside the horizon
    /// are ignored by the core (spec §3).
    pub fn within_horizon(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &ForecastEntry> {
        self.entries
            .iter()
            .filter(move |e| e.date >= start && e.date <= end)
    }

    pub fn total_quantity(&self) -> f64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }
}
