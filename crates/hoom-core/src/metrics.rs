//! Market summary over an in-memory slice of listings.
//!
//! Everything here is pure. The caller decides which listings are relevant
//! and which [`MarketScope`] they belong to; this module only reduces them.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::{ListingRecord, MarketScope};

const MILLIS_PER_DAY: u64 = 86_400_000;

/// Reduced figures for one set of listings. Every field is `0` when nothing
/// was eligible for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub count: usize,
    pub median_price: f64,
    pub median_price_per_area: f64,
    pub average_days_on_market: f64,
    pub average_price: f64,
    pub average_price_per_area: f64,
}

/// Summarizes `records` using the current instant as "today".
#[must_use]
pub fn summarize(records: &[ListingRecord], scope: MarketScope) -> MetricsSummary {
    summarize_as_of(records, scope, Utc::now())
}

/// Summarizes `records` as seen at `as_of`.
///
/// Unpriced listings still count toward `count`. Price per area uses the
/// scope's area base and skips listings whose area is missing or not
/// positive, so no division by zero can happen.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_as_of(
    records: &[ListingRecord],
    scope: MarketScope,
    as_of: DateTime<Utc>,
) -> MetricsSummary {
    let mut prices: Vec<f64> = records
        .iter()
        .filter_map(|r| r.price)
        .filter(|p| p.is_finite())
        .collect();

    let mut per_area: Vec<f64> = records
        .iter()
        .filter_map(|r| {
            let price = r.price.filter(|p| p.is_finite())?;
            let area = scope.area_of(r).filter(|a| a.is_finite() && *a > 0.0)?;
            Some(price / area).filter(|v| v.is_finite())
        })
        .collect();

    let days: Vec<f64> = records
        .iter()
        .filter_map(|r| days_on_market(r, as_of))
        .map(|d| d as f64)
        .collect();

    MetricsSummary {
        count: records.len(),
        average_price: mean(&prices).unwrap_or(0.0),
        median_price: median(&mut prices).unwrap_or(0.0),
        average_price_per_area: mean(&per_area).unwrap_or(0.0),
        median_price_per_area: median(&mut per_area).unwrap_or(0.0),
        average_days_on_market: mean(&days).unwrap_or(0.0),
    }
}

/// Sorts `values` in place and returns the middle element, or the mean of the
/// two middle elements for an even count. Halves before adding so finite
/// inputs never overflow.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some(values[mid - 1] / 2.0 + values[mid] / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Arithmetic mean, summed as `v / n` so finite inputs stay finite.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    Some(values.iter().map(|v| v / n).sum())
}

/// Whole days between two instants, partial days rounded up. Symmetric.
#[must_use]
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> u64 {
    (b - a)
        .num_milliseconds()
        .unsigned_abs()
        .div_ceil(MILLIS_PER_DAY)
}

/// Current age of a listing in days.
///
/// A stored `days_on_market` is the age on the day the listing was captured
/// and keeps growing from `created_at`. Without it the age is counted from
/// `publication_date`. Listings with neither have no age.
#[must_use]
pub fn days_on_market(record: &ListingRecord, as_of: DateTime<Utc>) -> Option<u64> {
    if let Some(stored) = record.days_on_market {
        return Some(u64::from(stored) + days_between(record.created_at, as_of));
    }
    record
        .publication_date
        .map(|date| days_between(start_of_day(date), as_of))
}

/// Publication date implied by a listing that is `days` old at `as_of`.
/// `None` only when the subtraction leaves chrono's date range.
#[must_use]
pub fn publication_date_from_days(days: u32, as_of: DateTime<Utc>) -> Option<NaiveDate> {
    as_of
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days)))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
