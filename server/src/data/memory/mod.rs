//! In-memory record backend
//!
//! Evaluates compiled predicate trees directly against JSON records. Serves
//! the HTTP listing endpoint and doubles as a reference executor for the SQL
//! rendering.

mod eval;
mod store;

pub use eval::{matches, operand_text, operand_value};
pub use store::{MemoryDatabase, MemoryStore};
