//! Data storage layer
//!
//! Backend adapters for compiled filter queries:
//! - `sql` - Renders predicate trees to parameterised SQL (PostgreSQL, SQLite)
//! - `memory` - Evaluates predicate trees over in-memory JSON records
//! - `traits` - Repository traits for query execution
//! - `error` - Unified error type for all backends

pub mod error;
pub mod memory;
pub mod sql;
pub mod traits;

pub use error::DataError;
pub use memory::MemoryDatabase;
pub use traits::{PageRequest, RecordPage, RecordRepository};
