//! Production batch output type — spec §3 "ProductionBatch".

use crate::ids::{NodeId, ProductId};
use crate::route::CohortState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionBatch {
    pub id: String,
    pub production_date: NaiveDate,
    pub manufacturing_node_id: NodeId,
    pub product_id: ProductId,
    pub quantity: f64,
    pub initial_state: CohortState,
}

impl ProductionBatch {
    /// `BATCH-YYYYMMDD-PRODUCT-NNNN`, deterministic within a solve given a
    /// stable enumeration order (spec §3, §5 "Ordering guarantees").
    pub fn make_id(production_date: NaiveDate, product_id: &ProductId, sequence: u32) -> String {
        format!(
            "BATCH-{}-{}-{:04}",
            production_date.format("%Y%m%d"),
            product_id,
            sequence
        )
    }
}
