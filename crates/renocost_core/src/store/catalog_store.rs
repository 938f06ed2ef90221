//! Catalog store contract and XML file implementation.
//!
//! # Responsibility
//! - Provide load (with healing) and single-price update over one category's
//!   document.
//! - Keep the on-disk file complete at all times: writes go to a sibling
//!   temp file which is then renamed over the document.
//!
//! # Invariants
//! - `load` persists only when healing inserted something.
//! - `update_price` with an unknown key never writes.
//! - A rewrite changes only the healed or updated nodes; everything else in
//!   the document is written back as read.
//! - Prices are written as two-decimal text.

use super::document::{CatalogDocument, Element, FIELD_LATEST_PRICE, ITEM_TAG};
use super::healing::apply_healing;
use super::{format_price, StoreError, StoreResult};
use crate::model::category::Category;
use crate::model::item::{Catalog, CatalogGroup, CatalogItem};
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const TEMP_SUFFIX: &str = "tmp";

/// Store interface for one category's catalog document.
pub trait CatalogStore {
    fn category(&self) -> Category;
    /// Creates a minimal document when none exists. Returns whether it did.
    fn ensure_exists(&self) -> StoreResult<bool>;
    fn load(&self) -> StoreResult<Catalog>;
    fn update_price(&self, key: &str, new_price: f64) -> StoreResult<CatalogItem>;
}

/// XML-file-backed catalog store.
#[derive(Debug, Clone)]
pub struct XmlCatalogStore {
    category: Category,
    path: PathBuf,
}

impl XmlCatalogStore {
    /// Store for `category` at `<data_dir>/<slug>.xml`.
    pub fn new(category: Category, data_dir: impl AsRef<Path>) -> Self {
        Self::with_path(category, data_dir.as_ref().join(category.file_name()))
    }

    pub fn with_path(category: Category, path: impl Into<PathBuf>) -> Self {
        Self {
            category,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StoreResult<CatalogDocument> {
        let xml = fs::read_to_string(&self.path).map_err(|err| StoreError::io(&self.path, err))?;
        CatalogDocument::parse(&xml).map_err(|err| StoreError::document(&self.path, err))
    }

    fn write_document(&self, document: &CatalogDocument) -> StoreResult<()> {
        let xml = document
            .to_xml()
            .map_err(|err| StoreError::document(&self.path, err))?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, xml).map_err(|err| StoreError::io(&temp_path, err))?;
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&self.path, err));
        }

        debug!(
            "event=catalog_write module=store status=ok category={} path={}",
            self.category,
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Reads, heals in memory and reports whether healing changed anything.
    fn read_healed(&self) -> StoreResult<(CatalogDocument, bool)> {
        self.ensure_exists()?;
        let mut document = self.read_document()?;
        let report = apply_healing(&mut document, self.category);
        if report.changed() {
            info!(
                "event=catalog_heal module=store status=ok category={} groups_added={} items_added={}",
                self.category,
                report.groups_added.join(","),
                report.items_added.join(",")
            );
        }
        Ok((document, report.changed()))
    }

    fn load_inner(&self) -> StoreResult<Catalog> {
        let (document, healed) = self.read_healed()?;
        if healed {
            self.write_document(&document)?;
        }

        let mut groups = Vec::with_capacity(self.category.groups().len());
        for &tag in self.category.groups() {
            let items = match document.group(tag) {
                Some(group) => group
                    .elements()
                    .filter(|element| element.name == ITEM_TAG)
                    .map(Element::to_catalog_item)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|err| StoreError::document(&self.path, err))?,
                None => Vec::new(),
            };
            groups.push(CatalogGroup {
                name: tag.to_string(),
                items,
            });
        }

        Ok(Catalog::new(groups))
    }

    fn update_price_inner(&self, key: &str, new_price: f64) -> StoreResult<CatalogItem> {
        let (mut document, _) = self.read_healed()?;

        let Some(item) = document.find_item_mut(self.category.groups(), key) else {
            return Err(StoreError::NotFound(key.to_string()));
        };

        item.set_field(FIELD_LATEST_PRICE, &format_price(new_price));
        let snapshot = item
            .to_catalog_item()
            .map_err(|err| StoreError::document(&self.path, err))?;

        self.write_document(&document)?;
        Ok(snapshot)
    }
}

impl CatalogStore for XmlCatalogStore {
    fn category(&self) -> Category {
        self.category
    }

    fn ensure_exists(&self) -> StoreResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        self.write_document(&CatalogDocument::empty(self.category))?;

        info!(
            "event=catalog_create module=store status=ok category={} path={}",
            self.category,
            self.path.display()
        );
        Ok(true)
    }

    fn load(&self) -> StoreResult<Catalog> {
        let started_at = Instant::now();
        match self.load_inner() {
            Ok(catalog) => {
                debug!(
                    "event=catalog_load module=store status=ok category={} items={} duration_ms={}",
                    self.category,
                    catalog.item_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(catalog)
            }
            Err(err) => {
                error!(
                    "event=catalog_load module=store status=error category={} duration_ms={} error_code={} error={}",
                    self.category,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn update_price(&self, key: &str, new_price: f64) -> StoreResult<CatalogItem> {
        let started_at = Instant::now();
        match self.update_price_inner(key, new_price) {
            Ok(item) => {
                info!(
                    "event=price_update module=store status=ok category={} key={} price={} duration_ms={}",
                    self.category,
                    key,
                    format_price(item.latest_price),
                    started_at.elapsed().as_millis()
                );
                Ok(item)
            }
            Err(err) => {
                error!(
                    "event=price_update module=store status=error category={} key={} duration_ms={} error_code={} error={}",
                    self.category,
                    key,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}
