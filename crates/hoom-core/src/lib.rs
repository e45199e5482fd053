pub mod app_config;
pub mod config;
pub mod filter;
pub mod listing;
pub mod metrics;
pub mod prompt;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filter::{FilterCriteria, ListingFilters};
pub use listing::{ListingRecord, ListingType, MarketScope, PropertyType};
pub use metrics::{
    days_between, days_on_market, publication_date_from_days, summarize, summarize_as_of,
    MetricsSummary,
};
pub use prompt::{parse, parse_in_scope};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("invalid listing type: {0}")]
    InvalidListingType(String),
    #[error("invalid scope: {0}")]
    InvalidScope(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
