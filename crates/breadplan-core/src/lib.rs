//! # breadplan-core
//!
//! Typed domain model, network preprocessing, and temporal scaffolding for
//! the gluten-free bread production/distribution planner. This crate has no
//! solver dependency — it is the C1–C3 layer the model builder
//! (`breadplan-solver`) consumes.

pub mod batch;
pub mod cost;
pub mod forecast;
pub mod ids;
pub mod labor;
pub mod network;
pub mod node;
pub mod packaging;
pub mod preprocess;
pub mod route;
pub mod shipment;
pub mod temporal;
pub mod truck;

pub use batch::ProductionBatch;
pub use cost::{CostStructure, HoldingRate};
pub use forecast::{Forecast, ForecastEntry};
pub use ids::{NodeId, ProductId, RouteId, TruckId};
pub use labor::LaborDay;
pub use network::Network;
pub use node::{Node, NodeCapabilities, StorageMode};
pub use packaging::{cases_to_units, units_to_cases, units_to_pallets, CASES_PER_PALLET, PALLETS_PER_TRUCK, UNITS_PER_CASE, UNITS_PER_PALLET, UNITS_PER_TRUCK};
pub use preprocess::NetworkIndex;
pub use route::{arrival_state, CohortState, Route, TransportMode};
pub use shipment::Shipment;
pub use temporal::{aggregate_forecast, build_buckets, BucketedForecast, GranularityConfig, Horizon, TimeBucket};
pub use truck::{DepartureType, TruckSchedule, Weekday};
