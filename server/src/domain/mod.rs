//! Domain logic
//!
//! - `filters` - dynamic filter compilation to a predicate tree
//! - `catalog` - sample record schemas and seed data

pub mod catalog;
pub mod filters;
