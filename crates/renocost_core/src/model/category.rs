//! Renovation category configuration table.
//!
//! # Responsibility
//! - Name the four supported categories and their storage slugs.
//! - Declare each category's required groups and default (healed) items.
//!
//! # Invariants
//! - Group order is the lookup order used by price updates.
//! - Default item prices are stored as exact two-decimal text.
//! - A default item's `group` is always one of its category's groups.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const GROUP_AREAS: &str = "areas";
pub const GROUP_LINEAR: &str = "linear";
pub const GROUP_VOLUMES: &str = "volumes";
pub const GROUP_PIECES: &str = "pieces";
pub const GROUP_WORKERS: &str = "workers";
pub const GROUP_EXTRAS: &str = "extras";

/// Item inserted by load-time healing when missing from its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultItem {
    pub group: &'static str,
    pub key: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    /// Exact persisted text, always two decimals.
    pub price: &'static str,
}

const fn extra(
    key: &'static str,
    name: &'static str,
    unit: &'static str,
    price: &'static str,
) -> DefaultItem {
    DefaultItem {
        group: GROUP_EXTRAS,
        key,
        name,
        unit,
        price,
    }
}

const fn worker(key: &'static str, name: &'static str, price: &'static str) -> DefaultItem {
    DefaultItem {
        group: GROUP_WORKERS,
        key,
        name,
        unit: "day",
        price,
    }
}

const COMMON_EXTRAS: &[DefaultItem] = &[
    extra("extra_kados", "Κάδος", "unit", "120.00"),
    extra("extra_fatoura", "Φατούρα", "m2", "0.00"),
];

const PAINTING_DEFAULTS: &[DefaultItem] = &[
    worker("technitis", "Τεχνίτης", "80.00"),
    worker("voithos", "Βοηθός Τεχνίτη", "60.00"),
    extra("extra_kouvas", "Κουβάς", "unit", "55.00"),
    extra("extra_astari", "Αστάρι", "unit", "50.00"),
    extra("extra_stokos", "Στόκος", "unit", "15.00"),
    extra("extra_kados", "Κάδος", "unit", "120.00"),
    extra("extra_fatoura", "Φατούρα", "m2", "0.00"),
];

/// Renovation cost category. Each one owns exactly one catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ThermalInsulation,
    Tiling,
    Plasterboard,
    Painting,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::ThermalInsulation,
        Category::Tiling,
        Category::Plasterboard,
        Category::Painting,
    ];

    /// Storage slug; also the document file stem.
    pub fn slug(self) -> &'static str {
        match self {
            Self::ThermalInsulation => "thermal-insulation",
            Self::Tiling => "tiling",
            Self::Plasterboard => "plasterboard",
            Self::Painting => "painting",
        }
    }

    /// Legacy URL segment used by the web front end (`/api/<alias>/catalog`).
    pub fn route_alias(self) -> &'static str {
        match self {
            Self::ThermalInsulation => "thermoprosopsi",
            Self::Tiling => "plakakia",
            Self::Plasterboard => "gypsosanida",
            Self::Painting => "elaioxromatismoi",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ThermalInsulation => "Θερμοπρόσοψη",
            Self::Tiling => "Πλακάκια",
            Self::Plasterboard => "Γυψοσανίδα",
            Self::Painting => "Ελαιοχρωματισμοί",
        }
    }

    /// Required groups, in update lookup order.
    pub fn groups(self) -> &'static [&'static str] {
        match self {
            Self::ThermalInsulation => &[GROUP_AREAS, GROUP_LINEAR, GROUP_WORKERS, GROUP_EXTRAS],
            Self::Tiling => &[GROUP_AREAS, GROUP_VOLUMES, GROUP_WORKERS, GROUP_EXTRAS],
            Self::Plasterboard => &[
                GROUP_AREAS,
                GROUP_LINEAR,
                GROUP_PIECES,
                GROUP_WORKERS,
                GROUP_EXTRAS,
            ],
            Self::Painting => &[GROUP_WORKERS, GROUP_EXTRAS],
        }
    }

    /// Items that load-time healing guarantees to exist.
    pub fn default_items(self) -> &'static [DefaultItem] {
        match self {
            Self::Painting => PAINTING_DEFAULTS,
            _ => COMMON_EXTRAS,
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.xml", self.slug())
    }

    /// Resolves either the storage slug or the legacy route alias.
    pub fn from_slug(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|category| {
            category.slug() == normalized || category.route_alias() == normalized
        })
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Returned when a category slug matches neither a slug nor an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl Display for UnknownCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown category `{}`", self.0)
    }
}

impl Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, GROUP_EXTRAS, GROUP_WORKERS};

    #[test]
    fn slug_and_alias_both_resolve() {
        assert_eq!(
            Category::from_slug("thermal-insulation"),
            Some(Category::ThermalInsulation)
        );
        assert_eq!(
            Category::from_slug(" Elaioxromatismoi "),
            Some(Category::Painting)
        );
        assert!("roofing".parse::<Category>().is_err());
    }

    #[test]
    fn default_items_belong_to_declared_groups() {
        for category in Category::ALL {
            for item in category.default_items() {
                assert!(
                    category.groups().contains(&item.group),
                    "{category}: default `{}` targets undeclared group `{}`",
                    item.key,
                    item.group
                );
            }
        }
    }

    #[test]
    fn painting_has_worker_and_extra_defaults() {
        let defaults = Category::Painting.default_items();
        let workers = defaults.iter().filter(|d| d.group == GROUP_WORKERS).count();
        let extras = defaults.iter().filter(|d| d.group == GROUP_EXTRAS).count();
        assert_eq!(workers, 2);
        assert_eq!(extras, 5);
    }

    #[test]
    fn every_category_ends_with_extras() {
        for category in Category::ALL {
            assert_eq!(category.groups().last(), Some(&GROUP_EXTRAS));
        }
    }
}
