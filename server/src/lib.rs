//! Dynamic query filters compiled to backend-neutral predicates
//!
//! - `domain` - filter compiler and sample record catalog
//! - `data` - SQL rendering and in-memory execution of compiled filters
//! - `api` - HTTP listing and query-plan endpoints
//! - `core` - CLI, configuration and application bootstrap

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
