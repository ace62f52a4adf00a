//! Packaging unit constants and conversions — spec §3 "Packaging units".

pub const UNITS_PER_CASE: f64 = 10.0;
pub const CASES_PER_PALLET: f64 = 32.0;
pub const UNITS_PER_PALLET: f64 = UNITS_PER_CASE * CASES_PER_PALLET;
pub const PALLETS_PER_TRUCK: f64 = 44.0;
pub const UNITS_PER_TRUCK: f64 = UNITS_PER_PALLET * PALLETS_PER_TRUCK;

pub fn cases_to_units(cases: u64) -> f64 {
    cases as f64 * UNITS_PER_CASE
}

/// Whole-case production in units must divide evenly by `UNITS_PER_CASE`
/// (spec §3 invariant 3); callers that already hold a `production_cases`
/// integer variable should use [`cases_to_units`] directly instead.
pub fn units_to_cases(units: f64) -> Option<u64> {
    let cases = units / UNITS_PER_CASE;
    if (cases - cases.round()).abs() > 1e-6 {
        None
    } else {
        Some(cases.round() as u64)
    }
}

/// A partial pallet still consumes a full pallet slot (spec §3 invariant 4).
pub fn units_to_pallets(units: f64) -> u64 {
    (units / UNITS_PER_PALLET).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truck_capacity_matches_spec_constant() {
        assert_eq!(UNITS_PER_TRUCK, 14_080.0);
    }

    #[test]
    fn partial_pallet_rounds_up() {
        assert_eq!(units_to_pallets(325.0), 2);
        assert_eq!(units_to_pallets(320.0), 1);
        assert_eq!(units_to_pallets(0.0), 0);
    }

    #[test]
    fn exact_case_multiple_round_trips() {
        assert_eq!(units_to_cases(330.0), Some(33));
        assert_eq!(units_to_cases(325.0), None);
    }
}
