//! Temporal scaffolding & forecast aggregation — spec §4.2.

use crate::forecast::{Forecast, ForecastEntry};
use crate::ids::{NodeId, ProductId};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// All calendar days in `[start, end]` inclusive.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let mut d = self.start;
        std::iter::from_fn(move || {
            if d > self.end {
                None
            } else {
                let cur = d;
                d += Duration::days(1);
                Some(cur)
            }
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Near-term daily days stay daily; far-term days are grouped into fixed
/// buckets of `far_granularity` days (spec §4.2 "Variable granularity").
#[derive(Debug, Clone, Copy)]
pub struct GranularityConfig {
    pub near_term_days: i64,
    pub far_granularity: i64,
}

impl Default for GranularityConfig {
    fn default() -> Self {
        Self {
            near_term_days: 14,
            far_granularity: 7,
        }
    }
}

/// A contiguous span of calendar days treated as a single planning period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeBucket {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        Horizon::new(self.start, self.end).dates()
    }
}

/// Build the bucket list for a horizon. With `granularity = None`, every
/// day is its own one-day bucket (daily mode).
pub fn build_buckets(horizon: &Horizon, granularity: Option<GranularityConfig>) -> Vec<TimeBucket> {
    let Some(cfg) = granularity else {
        return horizon
            .dates()
            .map(|d| TimeBucket { start: d, end: d })
            .collect();
    };

    let mut buckets = Vec::new();
    let near_term_end = horizon.start + Duration::days(cfg.near_term_days.max(0) - 1);

    for d in horizon.dates() {
        if d > near_term_end {
            break;
        }
        buckets.push(TimeBucket { start: d, end: d });
    }

    let far_start = (near_term_end + Duration::days(1)).max(horizon.start);
    let mut cursor = far_start;
    while cursor <= horizon.end {
        let bucket_end = (cursor + Duration::days(cfg.far_granularity - 1)).min(horizon.end);
        buckets.push(TimeBucket {
            start: cursor,
            end: bucket_end,
        });
        cursor = bucket_end + Duration::days(1);
    }

    buckets
}

/// A forecast aggregated onto buckets: `quantity` is the exact sum of the
/// daily quantities whose date falls in the bucket (spec §4.2 invariant).
#[derive(Debug, Clone)]
pub struct BucketedForecast {
    pub quantities: HashMap<(NodeId, ProductId, usize), f64>,
    pub buckets: Vec<TimeBucket>,
}

pub fn aggregate_forecast(forecast: &Forecast, buckets: &[TimeBucket]) -> BucketedForecast {
    let mut quantities: HashMap<(NodeId, ProductId, usize), f64> = HashMap::new();
    for entry in &forecast.entries {
        if let Some(bucket_idx) = buckets.iter().position(|b| entry.date >= b.start && entry.date <= b.end) {
            *quantities
                .entry((entry.location_id.clone(), entry.product_id.clone(), bucket_idx))
                .or_insert(0.0) += entry.quantity;
        }
    }
    BucketedForecast {
        quantities,
        buckets: buckets.to_vec(),
    }
}

/// Disaggregate a bucket-level plan back to daily quantities, splitting a
/// bucket's total proportionally to the *original* daily demand within
/// that bucket (spec §4.2 "Disaggregation").
///
/// When every day in the bucket had zero original demand, the bucket total
/// (necessarily zero too, since it is the sum) is split evenly — this only
/// matters when `bucket_value` disagrees with the original sum, which does
/// not happen for a plan produced from `aggregate_forecast`'s own output.
pub fn disaggregate_bucket(bucket: &TimeBucket, bucket_value: f64, original: &Forecast, location: &NodeId, product: &ProductId) -> HashMap<NaiveDate, f64> {
    let daily: Vec<(NaiveDate, f64)> = bucket
        .days()
        .map(|d| {
            let demand: f64 = original
                .entries
                .iter()
                .filter(|e| e.date == d && &e.location_id == location && &e.product_id == product)
                .map(|e| e.quantity)
                .sum();
            (d, demand)
        })
        .collect();

    let total: f64 = daily.iter().map(|(_, q)| q).sum();
    let mut out = HashMap::new();
    if total.abs() < 1e-12 {
        let share = bucket_value / daily.len().max(1) as f64;
        for (d, _) in &daily {
            out.insert(*d, share);
        }
    } else {
        for (d, q) in &daily {
            out.insert(*d, bucket_value * (q / total));
        }
    }
    out
}

/// Build a forecast entry list from a bucket-level plan, used to validate
/// the round-trip law of spec §8: `disaggregate(aggregate(f)) == f` in
/// total, exactly, for every bucket.
pub fn round_trip_total_preserved(original: &Forecast, buckets: &[TimeBucket]) -> bool {
    let aggregated = aggregate_forecast(original, buckets);
    let bucket_total: f64 = aggregated.quantities.values().sum();
    (bucket_total - original.total_quantity()).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_mode_yields_one_bucket_per_day() {
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 5));
        let buckets = build_buckets(&horizon, None);
        assert_eq!(buckets.len(), 5);
        assert!(buckets.iter().all(|b| b.start == b.end));
    }

    #[test]
    fn variable_granularity_groups_far_term() {
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 21));
        let cfg = GranularityConfig {
            near_term_days: 7,
            far_granularity: 7,
        };
        let buckets = build_buckets(&horizon, Some(cfg));
        // 7 daily buckets + 2 weekly buckets covering the remaining 14 days.
        assert_eq!(buckets.len(), 9);
        assert_eq!(buckets[7].start, d(2026, 7, 8));
        assert_eq!(buckets[7].end, d(2026, 7, 14));
    }

    #[test]
    fn aggregation_preserves_total_demand_bit_for_bit() {
        let horizon = Horizon::new(d(2026, 7, 1), d(2026, 7, 14));
        let cfg = GranularityConfig {
            near_term_days: 3,
            far_granularity: 3,
        };
        let buckets = build_buckets(&horizon, Some(cfg));
        let forecast = Forecast::new(vec![
            ForecastEntry { location_id: "Dn".into(), product_id: "P".into(), date: d(2026, 7, 1), quantity: 100.0 },
            ForecastEntry { location_id: "Dn".into(), product_id: "P".into(), date: d(2026, 7, 5), quantity: 200.0 },
            ForecastEntry { location_id: "Dn".into(), product_id: "P".into(), date: d(2026, 7, 10), quantity: 50.0 },
        ]);
        assert!(round_trip_total_preserved(&forecast, &buckets));
    }

    #[test]
    fn disaggregation_splits_proportionally_to_original_daily_demand() {
        let bucket = TimeBucket { start: d(2026, 7, 8), end: d(2026, 7, 14) };
        let forecast = Forecast::new(vec![
            ForecastEntry { location_id: "Dn".into(), product_id: "P".into(), date: d(2026, 7, 8), quantity: 30.0 },
            ForecastEntry { location_id: "Dn".into(), product_id: "P".into(), date: d(2026, 7, 10), quantity: 70.0 },
        ]);
        let daily = disaggregate_bucket(&bucket, 100.0, &forecast, &"Dn".into(), &"P".into());
        assert!((daily[&d(2026, 7, 8)] - 30.0).abs() < 1e-9);
        assert!((daily[&d(2026, 7, 10)] - 70.0).abs() < 1e-9);
        let sum: f64 = daily.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }
}
