//! Offline tests for hoom-db pool configuration and row types.
//! These tests do not require a live database connection.

use hoom_core::{AppConfig, Environment, ListingType, PropertyType};
use hoom_db::{InventoryCounts, ListingUpdate, NewListing, PoolConfig, PromoterRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        rate_limit_per_minute: 120,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn new_listing_starts_with_every_optional_field_unset() {
    let listing = NewListing::new(PropertyType::Land, ListingType::Sale);
    assert_eq!(listing.property_type, PropertyType::Land);
    assert!(listing.price.is_none());
    assert!(listing.days_on_market.is_none());
    assert!(!listing.is_new_property);
    assert!(listing.photos.is_empty());
}

#[test]
fn default_listing_update_touches_nothing() {
    let update = ListingUpdate::default();
    assert!(update.price.is_none());
    assert!(update.promoter_id.is_none());
    assert!(update.photos.is_none());
}

#[test]
fn promoter_row_has_expected_fields() {
    use chrono::Utc;

    let row = PromoterRow {
        id: 3,
        name: "Laura Garza".to_string(),
        company: Some("Inmobiliaria Norte".to_string()),
        phone: None,
        email: Some("laura@example.com".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 3);
    assert_eq!(row.company.as_deref(), Some("Inmobiliaria Norte"));
    assert!(row.phone.is_none());
}

#[test]
fn inventory_counts_default_to_zero() {
    let counts = InventoryCounts::default();
    assert_eq!(counts.total_listings, 0);
    assert_eq!(counts.promoters, 0);
}
