//! Commands that work on local input only.

use std::path::Path;

use anyhow::Context;
use hoom_core::{ListingFilters, ListingRecord, MarketScope, MetricsSummary};

/// Prints the criteria for `prompt` as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn run_parse(prompt: &str, scope: MarketScope) -> anyhow::Result<()> {
    let criteria = hoom_core::parse_in_scope(prompt, scope);
    println!("{}", serde_json::to_string_pretty(&criteria)?);
    Ok(())
}

/// Loads records from `input`, applies the optional prompt, prints a summary.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of
/// listing records.
pub(crate) fn run_summarize(
    input: &Path,
    scope: MarketScope,
    prompt: Option<&str>,
) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let records: Vec<ListingRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of listings", input.display()))?;

    let filters = filters_for(prompt, scope);
    let matching = select(&records, &filters);
    tracing::debug!(total = records.len(), matching = matching.len(), "records filtered");

    print_summary(scope, &hoom_core::summarize(&matching, scope));
    Ok(())
}

/// Filter state for a CLI prompt in `scope`.
pub(crate) fn filters_for(prompt: Option<&str>, scope: MarketScope) -> ListingFilters {
    let filters = ListingFilters::for_scope(scope);
    match prompt {
        Some(p) => filters.merged(&hoom_core::parse_in_scope(p, scope)),
        None => filters,
    }
}

fn select(records: &[ListingRecord], filters: &ListingFilters) -> Vec<ListingRecord> {
    filters.apply(records).into_iter().cloned().collect()
}

pub(crate) fn print_summary(scope: MarketScope, summary: &MetricsSummary) {
    println!("scope:                   {scope}");
    println!("listings:                {}", summary.count);
    println!("median price:            {:.2}", summary.median_price);
    println!("average price:           {:.2}", summary.average_price);
    println!("median price per m2:     {:.2}", summary.median_price_per_area);
    println!("average price per m2:    {:.2}", summary.average_price_per_area);
    println!("average days on market:  {:.1}", summary.average_days_on_market);
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use hoom_core::{ListingType, PropertyType};

    use super::*;

    fn house(id: i64, price: f64, bedrooms: u32) -> ListingRecord {
        let mut r = ListingRecord::new(id, PropertyType::House, ListingType::Sale, Utc::now());
        r.price = Some(price);
        r.bedrooms = Some(bedrooms);
        r
    }

    #[test]
    fn prompt_narrows_the_selection() {
        let records = vec![house(1, 1_500_000.0, 2), house(2, 1_800_000.0, 4)];
        let filters = filters_for(Some("con 3 recámaras"), MarketScope::General);
        let selected = select(&records, &filters);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 2);
    }

    #[test]
    fn land_scope_without_prompt_keeps_only_land() {
        let mut land = ListingRecord::new(3, PropertyType::Land, ListingType::Sale, Utc::now());
        land.price = Some(900_000.0);
        let records = vec![house(1, 1_000_000.0, 3), land];
        let selected = select(&records, &filters_for(None, MarketScope::Land));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].property_type, PropertyType::Land);
    }

    #[test]
    fn summarize_rejects_missing_file() {
        let err = run_summarize(Path::new("/nonexistent/listings.json"), MarketScope::General, None)
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
