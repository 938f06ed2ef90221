//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep API/CLI layers decoupled from storage details.

pub mod catalog_service;
