//! Catalog item records returned to callers.
//!
//! # Responsibility
//! - Define the typed snapshot of one priced catalog entry.
//! - Define the ordered group-name -> items view returned by `load()`.
//!
//! # Invariants
//! - `consumption` is omitted from serialized output when `None`.
//! - An item stored without a key serializes its key as `null`.
//! - `Catalog` serializes as a JSON object whose key order matches the
//!   category's group order.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Typed snapshot of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub key: Option<String>,
    pub name: String,
    pub unit: String,
    pub latest_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<String>,
}

/// Named, ordered bucket of items.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogGroup {
    pub name: String,
    pub items: Vec<CatalogItem>,
}

/// Parsed, healed catalog of one category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    groups: Vec<CatalogGroup>,
}

impl Catalog {
    pub fn new(groups: Vec<CatalogGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// Items of one group, or `None` when the group is not part of the view.
    pub fn group(&self, name: &str) -> Option<&[CatalogItem]> {
        self.groups
            .iter()
            .find(|group| group.name == name)
            .map(|group| group.items.as_slice())
    }

    /// First item with `key`, scanning groups in order. Keyless items never match.
    pub fn find(&self, key: &str) -> Option<&CatalogItem> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| item.key.as_deref() == Some(key))
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, &group.items)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, CatalogGroup, CatalogItem};

    fn item(key: &str, consumption: Option<&str>) -> CatalogItem {
        CatalogItem {
            key: Some(key.to_string()),
            name: "Name".to_string(),
            unit: "m2".to_string(),
            latest_price: 7.5,
            consumption: consumption.map(str::to_string),
        }
    }

    #[test]
    fn consumption_is_omitted_when_absent() {
        let json = serde_json::to_value(item("a", None)).unwrap();
        assert!(json.get("consumption").is_none());

        let json = serde_json::to_value(item("b", Some("4 kg/m2"))).unwrap();
        assert_eq!(json["consumption"], "4 kg/m2");
    }

    #[test]
    fn keyless_item_serializes_null_key_and_is_never_found() {
        let mut keyless = item("unused", None);
        keyless.key = None;
        assert_eq!(serde_json::to_value(&keyless).unwrap()["key"], serde_json::Value::Null);

        let catalog = Catalog::new(vec![CatalogGroup {
            name: "extras".to_string(),
            items: vec![keyless],
        }]);
        assert!(catalog.find("").is_none());
        assert_eq!(catalog.item_count(), 1);
    }

    #[test]
    fn catalog_serializes_groups_in_declared_order() {
        let catalog = Catalog::new(vec![
            CatalogGroup {
                name: "workers".to_string(),
                items: vec![item("w", None)],
            },
            CatalogGroup {
                name: "extras".to_string(),
                items: Vec::new(),
            },
        ]);

        let text = serde_json::to_string(&catalog).unwrap();
        assert!(text.find("\"workers\"").unwrap() < text.find("\"extras\"").unwrap());
        assert_eq!(catalog.find("w").map(|i| i.latest_price), Some(7.5));
        assert_eq!(catalog.item_count(), 1);
        assert_eq!(catalog.group("extras").map(<[_]>::len), Some(0));
    }
}
