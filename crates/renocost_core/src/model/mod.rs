//! Catalog domain model for renovation cost categories.
//!
//! # Responsibility
//! - Define the per-category configuration table (groups, default items).
//! - Define the typed item records returned to service/API callers.
//!
//! # Invariants
//! - Every catalog item is identified by a `key` unique within its document.
//! - Prices are non-negative and carry at most two decimal digits once stored.

pub mod category;
pub mod item;
