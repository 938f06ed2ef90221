//! Load-time healing of catalog documents.
//!
//! # Responsibility
//! - Insert required groups a document is missing.
//! - Insert default items whose key appears nowhere in the document.
//!
//! # Invariants
//! - Healing only appends; existing groups, items and prices are never changed.
//! - Healing an already healed document reports no changes.

use super::document::{CatalogDocument, Element};
use crate::model::category::Category;

/// Summary of one healing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealReport {
    pub groups_added: Vec<&'static str>,
    pub items_added: Vec<&'static str>,
}

impl HealReport {
    pub fn changed(&self) -> bool {
        !self.groups_added.is_empty() || !self.items_added.is_empty()
    }
}

/// Applies the category's healing rules to `document` in place.
pub fn apply_healing(document: &mut CatalogDocument, category: Category) -> HealReport {
    let mut report = HealReport::default();

    for &tag in category.groups() {
        if document.group(tag).is_none() {
            document.add_group(tag);
            report.groups_added.push(tag);
        }
    }

    for default in category.default_items() {
        if document.contains_key(default.key) {
            continue;
        }
        if document.push_item(default.group, Element::from_default(default)) {
            report.items_added.push(default.key);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::apply_healing;
    use crate::model::category::Category;
    use crate::store::document::{CatalogDocument, Element, FIELD_LATEST_PRICE};

    fn prices(doc: &CatalogDocument, group: &str) -> Vec<(String, String)> {
        doc.group(group)
            .unwrap()
            .elements()
            .map(|item: &Element| {
                (
                    item.item_key().unwrap_or_default().to_string(),
                    item.child(FIELD_LATEST_PRICE).unwrap().text().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn healing_adds_missing_groups_and_defaults_once() {
        let mut doc = CatalogDocument::parse("<catalog><workers/></catalog>").unwrap();

        let first = apply_healing(&mut doc, Category::Painting);
        assert_eq!(first.groups_added, vec!["extras"]);
        assert_eq!(first.items_added.len(), 7);

        let second = apply_healing(&mut doc, Category::Painting);
        assert!(!second.changed());
    }

    #[test]
    fn healing_keeps_existing_default_prices() {
        let mut doc = CatalogDocument::parse(
            "<catalog><extras><item key=\"extra_kados\"><latest_price>99.00</latest_price></item></extras></catalog>",
        )
        .unwrap();

        let report = apply_healing(&mut doc, Category::ThermalInsulation);
        assert_eq!(report.items_added, vec!["extra_fatoura"]);

        assert_eq!(
            prices(&doc, "extras"),
            vec![
                ("extra_kados".to_string(), "99.00".to_string()),
                ("extra_fatoura".to_string(), "0.00".to_string()),
            ]
        );
    }

    #[test]
    fn healing_skips_defaults_present_in_another_group() {
        let mut doc = CatalogDocument::parse(
            "<catalog><areas/><linear/><workers><item key=\"extra_kados\"><latest_price>110.00</latest_price></item></workers><extras/></catalog>",
        )
        .unwrap();

        let report = apply_healing(&mut doc, Category::ThermalInsulation);
        assert_eq!(report.items_added, vec!["extra_fatoura"]);
        assert_eq!(
            prices(&doc, "extras"),
            vec![("extra_fatoura".to_string(), "0.00".to_string())]
        );
        assert_eq!(
            prices(&doc, "workers"),
            vec![("extra_kados".to_string(), "110.00".to_string())]
        );
    }

    #[test]
    fn healed_items_are_indented_like_their_siblings() {
        let mut doc = CatalogDocument::empty(Category::ThermalInsulation);
        apply_healing(&mut doc, Category::ThermalInsulation);

        let xml = doc.to_xml().unwrap();
        assert!(
            xml.contains("  <extras>\n    <item key=\"extra_kados\">\n      <name>Κάδος</name>\n"),
            "{xml}"
        );
        assert!(xml.ends_with("    </item>\n  </extras>\n</catalog>\n"), "{xml}");
    }
}
