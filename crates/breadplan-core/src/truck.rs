//! Truck schedule domain types — spec §3 "TruckSchedule".

use crate::ids::{NodeId, TruckId};
use chrono::{Datelike, NaiveDate, Weekday as ChronoWeekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartureType {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    fn matches(&self, date: NaiveDate) -> bool {
        let chrono_day = date.weekday();
        matches!(
            (self, chrono_day),
            (Weekday::Mon, ChronoWeekday::Mon)
                | (Weekday::Tue, ChronoWeekday::Tue)
                | (Weekday::Wed, ChronoWeekday::Wed)
                | (Weekday::Thu, ChronoWeekday::Thu)
                | (Weekday::Fri, ChronoWeekday::Fri)
                | (Weekday::Sat, ChronoWeekday::Sat)
                | (Weekday::Sun, ChronoWeekday::Sun)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckSchedule {
    pub id: TruckId,
    pub origin_node_id: NodeId,
    pub destination_node_id: NodeId,
    pub departure_type: DepartureType,
    /// `None` means the truck runs every day.
    pub day_of_week: Option<Weekday>,
    pub capacity_units: f64,
    pub pallet_capacity: u32,
    pub cost_fixed: f64,
    pub cost_per_unit: f64,
    pub intermediate_stops: Vec<NodeId>,
}

impl TruckSchedule {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self.day_of_week {
            None => true,
            Some(day) => day.matches(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn truck(day: Option<Weekday>) -> TruckSchedule {
        TruckSchedule {
            id: "T1".into(),
            origin_node_id: "M".into(),
            destination_node_id: "H".into(),
            departure_type: DepartureType::Morning,
            day_of_week: day,
            capacity_units: 14_080.0,
            pallet_capacity: 44,
            cost_fixed: 500.0,
            cost_per_unit: 0.0,
            intermediate_stops: vec![],
        }
    }

    #[test]
    fn any_day_truck_is_always_active() {
        let t = truck(None);
        let date = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        assert!(t.is_active_on(date));
    }

    #[test]
    fn weekday_truck_is_inactive_on_mismatched_day() {
        // 2026-07-28 is a Tuesday.
        let t = truck(Some(Weekday::Mon));
        let date = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        assert!(!t.is_active_on(date));
    }

    #[test]
    fn weekday_truck_is_active_on_matching_day() {
        let t = truck(Some(Weekday::Tue));
        let date = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        assert!(t.is_active_on(date));
    }
}
