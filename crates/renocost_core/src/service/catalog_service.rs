//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide list / set-price entry points for one category.
//! - Reject invalid input before it reaches the store.
//!
//! # Invariants
//! - `set_price` never calls the store with a non-positive or non-finite price.
//! - Service layer remains storage-agnostic.

use crate::model::category::Category;
use crate::model::item::{Catalog, CatalogItem};
use crate::store::catalog_store::{CatalogStore, XmlCatalogStore};
use crate::store::{StoreError, StoreResult};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub const STATUS_OK: &str = "ok";

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Price is not a finite number greater than zero.
    InvalidPrice(f64),
    /// No item in the document carries this key.
    ItemNotFound(String),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrice(value) => {
                write!(f, "latest_price must be a number greater than 0, got {value}")
            }
            Self::ItemNotFound(key) => write!(f, "Item with key '{key}' not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(key) => Self::ItemNotFound(key),
            other => Self::Store(other),
        }
    }
}

impl ServiceError {
    /// Whether the caller sent bad input (as opposed to a server-side failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPrice(_))
    }
}

/// Successful price update envelope: `{status: "ok", item}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceUpdate {
    pub status: &'static str,
    pub item: CatalogItem,
}

/// Catalog service facade over one category's store.
pub struct CatalogService<S: CatalogStore> {
    store: S,
}

impl CatalogService<XmlCatalogStore> {
    /// Service over the XML document for `category` under `data_dir`.
    pub fn open(category: Category, data_dir: impl AsRef<Path>) -> Self {
        Self::new(XmlCatalogStore::new(category, data_dir))
    }
}

impl<S: CatalogStore> CatalogService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn category(&self) -> Category {
        self.store.category()
    }

    /// Loads (and heals) the current catalog.
    pub fn list(&self) -> StoreResult<Catalog> {
        self.store.load()
    }

    /// Validates input and persists one item's new price.
    ///
    /// # Contract
    /// - `key` is matched exactly as given; an empty or padded key that no
    ///   item carries is `ItemNotFound`.
    /// - `price` must be finite and greater than zero.
    pub fn set_price(&self, key: &str, price: f64) -> Result<PriceUpdate, ServiceError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(ServiceError::InvalidPrice(price));
        }

        let item = self.store.update_price(key, price)?;
        Ok(PriceUpdate {
            status: STATUS_OK,
            item,
        })
    }

    /// Creates and heals the backing document without returning it.
    pub fn prepare(&self) -> StoreResult<()> {
        self.store.load().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogService, ServiceError};
    use crate::model::category::Category;
    use crate::model::item::{Catalog, CatalogItem};
    use crate::store::catalog_store::CatalogStore;
    use crate::store::{StoreError, StoreResult};
    use std::cell::Cell;

    struct FakeStore {
        update_calls: Cell<u32>,
    }

    impl CatalogStore for FakeStore {
        fn category(&self) -> Category {
            Category::Tiling
        }

        fn ensure_exists(&self) -> StoreResult<bool> {
            Ok(false)
        }

        fn load(&self) -> StoreResult<Catalog> {
            Ok(Catalog::default())
        }

        fn update_price(&self, key: &str, new_price: f64) -> StoreResult<CatalogItem> {
            self.update_calls.set(self.update_calls.get() + 1);
            if key != "tile" {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Ok(CatalogItem {
                key: Some(key.to_string()),
                name: String::new(),
                unit: String::new(),
                latest_price: new_price,
                consumption: None,
            })
        }
    }

    fn service() -> CatalogService<FakeStore> {
        CatalogService::new(FakeStore {
            update_calls: Cell::new(0),
        })
    }

    #[test]
    fn set_price_rejects_non_positive_and_non_finite_prices() {
        let service = service();
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = service.set_price("tile", price).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidPrice(_)));
            assert!(err.is_validation());
        }
        assert_eq!(service.store.update_calls.get(), 0);
    }

    #[test]
    fn set_price_wraps_item() {
        let update = service().set_price("tile", 3.0).unwrap();
        assert_eq!(update.status, "ok");
        assert_eq!(update.item.key.as_deref(), Some("tile"));
    }

    #[test]
    fn set_price_passes_key_through_unchanged() {
        let service = service();
        for key in ["", "   ", " tile "] {
            let err = service.set_price(key, 3.0).unwrap_err();
            assert!(matches!(err, ServiceError::ItemNotFound(ref missing) if missing == key));
            assert!(!err.is_validation());
        }
        assert_eq!(service.store.update_calls.get(), 3);
    }

    #[test]
    fn store_not_found_maps_to_item_not_found() {
        let err = service().set_price("missing", 3.0).unwrap_err();
        assert!(matches!(err, ServiceError::ItemNotFound(ref key) if key == "missing"));
        assert!(!err.is_validation());
    }
}
