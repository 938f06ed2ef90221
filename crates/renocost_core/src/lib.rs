//! Core catalog-pricing logic for renovation cost categories.
//! This crate is the single source of truth for catalog invariants.

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use api::{
    catalog_response, handle_update_price, parse_update_payload, update_price_response,
    ApiResponse, UpdatePricePayload,
};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::category::{Category, DefaultItem, UnknownCategory};
pub use model::item::{Catalog, CatalogGroup, CatalogItem};
pub use service::catalog_service::{CatalogService, PriceUpdate, ServiceError};
pub use store::catalog_store::{CatalogStore, XmlCatalogStore};
pub use store::{format_price, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
