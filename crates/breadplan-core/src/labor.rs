//! Labor calendar domain types — spec §3 "LaborDay".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborDay {
    pub date: NaiveDate,
    pub fixed_hours: f64,
    pub regular_rate: f64,
    pub overtime_rate: f64,
    pub non_fixed_rate: f64,
    pub minimum_hours: f64,
    pub maximum_hours: f64,
}

impl LaborDay {
    pub fn is_production_capable(&self) -> bool {
        self.maximum_hours > 0.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fixed_hours < 0.0 {
            return Err(format!("labor day {} has negative fixed_hours", self.date));
        }
        if self.minimum_hours < 0.0 {
            return Err(format!("labor day {} has negative minimum_hours", self.date));
        }
        if self.maximum_hours > 24.0 {
            return Err(format!(
                "labor day {} has maximum_hours {} exceeding 24",
                self.date, self.maximum_hours
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn zero_max_hours_is_not_production_capable() {
        let day = LaborDay {
            date: NaiveDate::from_ymd_opt(2026, 7, 26).unwrap(),
            fixed_hours: 0.0,
            regular_rate: 25.0,
            overtime_rate: 37.5,
            non_fixed_rate: 40.0,
            minimum_hours: 0.0,
            maximum_hours: 0.0,
        };
        assert!(!day.is_production_capable());
    }
}
