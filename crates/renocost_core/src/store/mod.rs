//! Catalog persistence layer.
//!
//! # Responsibility
//! - Define the per-category store contract used by services.
//! - Keep XML parsing/serialization details inside the persistence boundary.
//!
//! # Invariants
//! - Every read goes to storage; nothing is cached between calls.
//! - Store APIs return semantic errors (`NotFound`) in addition to I/O and
//!   document errors.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod catalog_store;
pub mod document;
pub mod healing;

use document::DocumentError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for catalog load and update operations.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Document {
        path: PathBuf,
        source: DocumentError,
    },
    NotFound(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, source: DocumentError) -> Self {
        Self::Document {
            path: path.into(),
            source,
        }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io_failed",
            Self::Document { .. } => "document_invalid",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Document { path, source } => write!(f, "{}: {source}", path.display()),
            Self::NotFound(key) => write!(f, "Item with key '{key}' not found"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Document { source, .. } => Some(source),
            Self::NotFound(_) => None,
        }
    }
}

/// Canonical persisted price text: exactly two decimals.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

#[cfg(test)]
mod tests {
    use super::{format_price, StoreError};

    #[test]
    fn format_price_uses_two_decimals() {
        assert_eq!(format_price(7.5), "7.50");
        assert_eq!(format_price(120.0), "120.00");
        assert_eq!(format_price(12.346), "12.35");
    }

    #[test]
    fn not_found_message_names_the_key() {
        let err = StoreError::NotFound("wool_50mm".to_string());
        assert_eq!(err.to_string(), "Item with key 'wool_50mm' not found");
        assert_eq!(err.code(), "not_found");
    }
}
