//! Database-backed read commands.

use chrono::Utc;
use hoom_core::MarketScope;

use crate::offline::{filters_for, print_summary};

const TITLE_WIDTH: usize = 40;

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), |v| v.to_string())
}

fn table_header() -> String {
    format!(
        "{:<8}{:<16}{:<7}{:>15}  {:<6}{:>10}  {:<6}TITLE",
        "ID", "TYPE", "OP", "PRICE", "BEDS", "PRICE/M2", "DAYS"
    )
}

/// Prints a table of the newest listings matching `prompt`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub(crate) async fn run_listings(
    pool: &sqlx::PgPool,
    prompt: Option<&str>,
    scope: MarketScope,
    limit: i64,
) -> anyhow::Result<()> {
    let filters = filters_for(prompt, scope);
    let rows = hoom_db::list_listings(pool, &filters, limit.max(1), 0).await?;

    if rows.is_empty() {
        println!("no listings match");
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", table_header());
    for row in rows {
        let record = row.into_record()?;
        let title = record.title.as_deref().unwrap_or("");
        let title_display = if title.chars().count() > TITLE_WIDTH {
            format!("{}...", title.chars().take(TITLE_WIDTH).collect::<String>())
        } else {
            title.to_string()
        };
        println!(
            "{:<8}{:<16}{:<7}{:>15}  {:<6}{:>10}  {:<6}{}",
            record.id,
            record.property_type,
            record.listing_type,
            fmt_opt(record.price.map(|p| format!("{p:.0}"))),
            fmt_opt(record.bedrooms),
            fmt_opt(record.price_per_area().map(|p| format!("{p:.0}"))),
            fmt_opt(hoom_core::days_on_market(&record, now)),
            title_display
        );
    }

    Ok(())
}

/// Prints the market summary over every stored listing matching `prompt`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is malformed.
pub(crate) async fn run_analysis(
    pool: &sqlx::PgPool,
    prompt: Option<&str>,
    scope: MarketScope,
) -> anyhow::Result<()> {
    let filters = filters_for(prompt, scope);
    let records = hoom_db::list_all_listings(pool, &filters)
        .await?
        .into_iter()
        .map(hoom_db::ListingRow::into_record)
        .collect::<Result<Vec<_>, _>>()?;

    print_summary(scope, &hoom_core::summarize(&records, scope));
    Ok(())
}
