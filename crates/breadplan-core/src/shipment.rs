//! Shipment output type — spec §3 "Shipment".

use crate::ids::{NodeId, ProductId, RouteId};
use crate::route::CohortState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub batch_id: Option<String>,
    pub product_id: ProductId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub leg_route: RouteId,
    pub departure_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub quantity: f64,
    pub arrival_state: CohortState,
}
