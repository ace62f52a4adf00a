//! End-to-end scenarios A-F from the planner's concrete test suite: build a
//! small network fixture, solve it, and check the plan against the literal
//! expected values.

use breadplan_core::{
    CohortState, CostStructure, DepartureType, Forecast, ForecastEntry, Horizon, HoldingRate, LaborDay, Network,
    Node, NodeCapabilities, ProductId, Route, StorageMode, TransportMode, TruckSchedule, Weekday,
};
use breadplan_solver::{build_model, extract_solution, PlanningConfig, PlanningInputs, SolverConfig};
use chrono::NaiveDate;
use std::collections::HashMap;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn flat_costs() -> CostStructure {
    CostStructure {
        production_cost_per_unit: 1.0,
        frozen_transport_cost_per_unit: 0.5,
        ambient_transport_cost_per_unit: 0.3,
        frozen_holding: HoldingRate { per_unit_day: 0.05, per_pallet_day: None },
        ambient_holding: HoldingRate { per_unit_day: 0.02, per_pallet_day: None },
        shortage_penalty_per_unit: 1_000.0,
        truck_cost_fixed: 50.0,
        truck_cost_per_unit: 0.0,
        waste_cost_multiplier: 1.0,
    }
}

fn labor_calendar(start: NaiveDate, end: NaiveDate, fixed_hours: f64) -> Vec<LaborDay> {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        days.push(LaborDay {
            date,
            fixed_hours,
            regular_rate: 25.0,
            overtime_rate: 37.5,
            non_fixed_rate: 40.0,
            minimum_hours: 4.0,
            maximum_hours: 16.0,
        });
        date += chrono::Duration::days(1);
    }
    days
}

fn mfg_node(id: &str) -> Node {
    Node::new(
        id,
        id,
        NodeCapabilities {
            can_manufacture: true,
            production_rate_per_hour: Some(1400.0),
            can_store: true,
            ..Default::default()
        },
    )
}

fn demand_node(id: &str, storage_mode: StorageMode) -> Node {
    Node::new(
        id,
        id,
        NodeCapabilities {
            can_store: true,
            storage_mode,
            has_demand: true,
            ..Default::default()
        },
    )
}

fn hub_node(id: &str, storage_mode: StorageMode) -> Node {
    Node::new(
        id,
        id,
        NodeCapabilities {
            can_store: true,
            storage_mode,
            ..Default::default()
        },
    )
}

/// Scenario A: direct ambient — single manufacturing node one day from a
/// demand node, one forecast entry.
#[test]
fn scenario_a_direct_ambient() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(demand_node("Dn", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "Dn".into(),
            transit_days: 1.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.3,
        })
        .unwrap();

    let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 10));
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "Dn".into(),
        product_id: "P".into(),
        date: d(2026, 7, 3),
        quantity: 6000.0,
    }]);
    let labor = labor_calendar(horizon.start, horizon.end, 8.0);
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let config = PlanningConfig::default();

    let inputs = PlanningInputs {
        network: &network,
        trucks: &[],
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    assert!(output.validation.mass_balance_ok);
    assert!(output.cohort_inventory.values().all(|&qty| qty >= -1e-6));
    assert!(!output.shipments.iter().any(|s| s.arrival_state == CohortState::Frozen));

    let total_produced: f64 = output.production_batches.iter().map(|b| b.quantity).sum();
    assert!((total_produced - 6000.0).abs() < 1e-3, "expected 6000 units produced, got {total_produced}");

    let shipment = output
        .shipments
        .iter()
        .find(|s| s.destination.as_str() == "Dn")
        .expect("a shipment to Dn");
    assert_eq!(shipment.delivery_date, d(2026, 7, 3));
}

/// Scenario B: hub-spoke ambient — M -> H -> Sp, a single batch should ride
/// both legs under the same `batch_id`.
#[test]
fn scenario_b_hub_spoke_ambient() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(hub_node("H", StorageMode::Ambient));
    network.add_node(demand_node("Sp", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "H".into(),
            transit_days: 1.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.2,
        })
        .unwrap();
    network
        .add_route(Route {
            origin_node_id: "H".into(),
            destination_node_id: "Sp".into(),
            transit_days: 1.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.2,
        })
        .unwrap();

    let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 12));
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "Sp".into(),
        product_id: "P".into(),
        date: d(2026, 7, 4),
        quantity: 2500.0,
    }]);
    let labor = labor_calendar(horizon.start, horizon.end, 8.0);
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let config = PlanningConfig::default();

    let inputs = PlanningInputs {
        network: &network,
        trucks: &[],
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    assert!(output.validation.mass_balance_ok);

    let first_leg = output
        .shipments
        .iter()
        .find(|s| s.origin.as_str() == "M" && s.destination.as_str() == "H")
        .expect("M->H shipment");
    let second_leg = output
        .shipments
        .iter()
        .find(|s| s.origin.as_str() == "H" && s.destination.as_str() == "Sp")
        .expect("H->Sp shipment");

    assert_eq!(first_leg.delivery_date, d(2026, 7, 2));
    assert_eq!(second_leg.delivery_date, d(2026, 7, 4));
    assert!(first_leg.batch_id.is_some());
    assert_eq!(first_leg.batch_id, second_leg.batch_id, "both legs ride the same production batch");
}

/// Scenario C: frozen via Lineage with thaw at an ambient-only destination.
/// M -> L (frozen, 0.5d) -> Wn (ambient-only, 3d frozen transport, thaws on
/// arrival). Demand is satisfied entirely from the thawed cohort.
#[test]
fn scenario_c_frozen_with_thaw_at_destination() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(hub_node("L", StorageMode::Frozen));
    network.add_node(demand_node("Wn", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "L".into(),
            transit_days: 0.5,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.2,
        })
        .unwrap();
    network
        .add_route(Route {
            origin_node_id: "L".into(),
            destination_node_id: "Wn".into(),
            transit_days: 3.0,
            transport_mode: TransportMode::Frozen,
            cost_per_unit: 0.4,
        })
        .unwrap();

    let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 14));
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "Wn".into(),
        product_id: "P".into(),
        date: d(2026, 7, 8),
        quantity: 3000.0,
    }]);
    let labor = labor_calendar(horizon.start, horizon.end, 8.0);
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let config = PlanningConfig::default();

    let inputs = PlanningInputs {
        network: &network,
        trucks: &[],
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    assert!(output.validation.mass_balance_ok);

    let frozen_leg = output
        .shipments
        .iter()
        .find(|s| s.origin.as_str() == "L" && s.destination.as_str() == "Wn")
        .expect("L->Wn frozen shipment");
    assert_eq!(frozen_leg.arrival_state, CohortState::Thawed);

    let frozen_cohorts_at_lineage = output
        .cohort_inventory
        .iter()
        .filter(|((node, _, _, _, state), _)| node.as_str() == "L" && *state == CohortState::Frozen)
        .count();
    assert!(frozen_cohorts_at_lineage > 0, "L should hold frozen cohorts while waiting for the next truck");

    assert!(output.cost_breakdown.shortage < 1e-6, "demand should be fully satisfied");
}

/// Scenario D: truck day-of-week — a Monday-Friday-only truck cannot move
/// Sunday-produced goods same-day; the planner shifts production earlier or
/// reports a shortage, but never fabricates an infeasible truck usage.
#[test]
fn scenario_d_truck_day_of_week() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(demand_node("H", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "H".into(),
            transit_days: 1.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.2,
        })
        .unwrap();

    // 2026-07-06 is a Monday; with 1-day transit, satisfying that demand
    // needs a departure on 2026-07-05, a Sunday, which the Mon-Fri truck
    // cannot serve. The horizon is pinned to exactly these two days so
    // there's no earlier weekday departure to pre-position inventory at H
    // with either: the shortage path is the only way out.
    let horizon = Horizon::new(d(2026, 7, 5), d(2026, 7, 6));
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "H".into(),
        product_id: "P".into(),
        date: d(2026, 7, 6),
        quantity: 1000.0,
    }]);
    let labor = labor_calendar(horizon.start, horizon.end, 8.0);
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let mut config = PlanningConfig::default();
    config.allow_shortages = true;

    let trucks = vec![TruckSchedule {
        id: "T1".into(),
        origin_node_id: "M".into(),
        destination_node_id: "H".into(),
        departure_type: DepartureType::Morning,
        day_of_week: None,
        capacity_units: 14_080.0,
        pallet_capacity: 44,
        cost_fixed: 50.0,
        cost_per_unit: 0.0,
        intermediate_stops: vec![],
    }];
    // Restrict to weekdays by overriding day_of_week per instance below.
    let weekday_trucks: Vec<TruckSchedule> = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
    .into_iter()
    .map(|day| TruckSchedule {
        day_of_week: Some(day),
        ..trucks[0].clone()
    })
    .collect();

    let inputs = PlanningInputs {
        network: &network,
        trucks: &weekday_trucks,
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    for shipment in &output.shipments {
        let is_weekday = !matches!(shipment.departure_date.format("%a").to_string().as_str(), "Sat" | "Sun");
        assert!(is_weekday, "no shipment should depart on a day the truck is inactive");
    }

    assert!(
        output.cost_breakdown.shortage > 0.0,
        "demand requiring a Sunday departure must fall back to shortage, not a fabricated truck use"
    );
    assert!(
        !output.shipments.iter().any(|s| s.destination.as_str() == "H"),
        "no shipment can reach H in time for this demand"
    );
}

/// Scenario E: packaging — 325 units of demand forces a case-rounding
/// decision (330 produced with 5 excess, or 320 produced with 5 shortage),
/// and the resulting pallet count for any positive load must equal 2.
#[test]
fn scenario_e_packaging_rounding() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(demand_node("Dn", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "Dn".into(),
            transit_days: 0.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.1,
        })
        .unwrap();

    let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 3));
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "Dn".into(),
        product_id: "P".into(),
        date: d(2026, 7, 1),
        quantity: 325.0,
    }]);
    let labor = labor_calendar(horizon.start, horizon.end, 8.0);
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let mut config = PlanningConfig::default();
    config.allow_shortages = true;

    let trucks = vec![TruckSchedule {
        id: "T1".into(),
        origin_node_id: "M".into(),
        destination_node_id: "Dn".into(),
        departure_type: DepartureType::Morning,
        day_of_week: None,
        capacity_units: 14_080.0,
        pallet_capacity: 44,
        cost_fixed: 0.0,
        cost_per_unit: 0.0,
        intermediate_stops: vec![],
    }];

    let inputs = PlanningInputs {
        network: &network,
        trucks: &trucks,
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    assert!(output.validation.packaging_ok);
    let total_produced: f64 = output.production_batches.iter().map(|b| b.quantity).sum();
    assert!(
        (total_produced - 330.0).abs() < 1e-3 || (total_produced - 320.0).abs() < 1e-3,
        "expected production to round to a whole case multiple near demand, got {total_produced}"
    );
}

/// Scenario F: labor piecewise — a non-fixed day pays at least
/// `minimum_hours` of non-fixed-rate labor even when actual production time
/// is far below that floor.
#[test]
fn scenario_f_labor_piecewise_floor() {
    let mut network = Network::new();
    network.add_node(mfg_node("M"));
    network.add_node(demand_node("Dn", StorageMode::Ambient));
    network
        .add_route(Route {
            origin_node_id: "M".into(),
            destination_node_id: "Dn".into(),
            transit_days: 0.0,
            transport_mode: TransportMode::Ambient,
            cost_per_unit: 0.1,
        })
        .unwrap();

    // 2026-07-05 is a Sunday.
    let sunday = d(2026, 7, 5);
    let horizon = Horizon::new(sunday, sunday);
    let forecast = Forecast::new(vec![ForecastEntry {
        location_id: "Dn".into(),
        product_id: "P".into(),
        date: sunday,
        quantity: 1000.0,
    }]);
    let labor = vec![LaborDay {
        date: sunday,
        fixed_hours: 0.0,
        regular_rate: 25.0,
        overtime_rate: 37.5,
        non_fixed_rate: 40.0,
        minimum_hours: 4.0,
        maximum_hours: 16.0,
    }];
    let costs = flat_costs();
    let products = vec![ProductId::new("P")];
    let initial_inventory = HashMap::new();
    let config = PlanningConfig::default();

    let inputs = PlanningInputs {
        network: &network,
        trucks: &[],
        labor: &labor,
        forecast: &forecast,
        costs: &costs,
        products: &products,
        horizon,
        initial_inventory: &initial_inventory,
        config: &config,
    };

    let built = build_model(&inputs).expect("model builds");
    let (report, context) = built.solve(&SolverConfig::default()).expect("model solves");
    let output = extract_solution(&report.solution, &context, &costs, &report);

    let (_, overtime, non_fixed) = output.labor_hours_by_date.get(&sunday).copied().unwrap_or((0.0, 0.0, 0.0));
    assert!(overtime < 1e-6, "a non-fixed day has no fixed-hour allotment to exceed");
    assert!(non_fixed >= 4.0 - 1e-6, "non-fixed hours should be floored at minimum_hours, got {non_fixed}");
}
