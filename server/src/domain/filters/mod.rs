//! Dynamic filter compilation
//!
//! Compiles open-ended `key=value` query filters into a backend-neutral
//! [`PredicateNode`] tree against a declared [`RecordSchema`].
//!
//! - `schema` - record schemas, precomputed field paths, field resolution
//! - `json_path` - paths into JSON document columns
//! - `operator` - `op:literal` value tokens
//! - `convert` - literal to typed value conversion
//! - `range` - bound merging for numeric and date fields
//! - `builder` - top-level compilation, OR-groups, alternation
//! - `sort` - dynamic ordering clause
//! - `accent` - accent and case folding for text matching
//!
//! Compilation is synchronous and reads nothing but the schema and the
//! request, so one schema can serve any number of concurrent requests.

pub mod accent;
pub mod builder;
pub mod convert;
pub mod error;
pub mod json_path;
pub mod operator;
pub mod options;
pub mod predicate;
pub mod range;
pub mod request;
pub mod schema;
pub mod sort;
pub mod value;

pub use builder::{CompiledQuery, PredicateBuilder, SkippedBranch};
pub use error::FilterError;
pub use json_path::JsonPath;
pub use operator::Operator;
pub use options::{
    CompileOptions, DateFallback, GroupCombinator, JsonValueCombinator, OrGroupErrors,
};
pub use predicate::{Bound, PredicateNode};
pub use request::FilterRequest;
pub use schema::{
    EnumType, FieldPath, FieldResolver, Operand, RecordSchema, SchemaRegistry, SemanticType,
};
pub use sort::{OrderClause, SortDirection};
pub use value::Value;

/// Compile `request` against `resolver`
pub fn compile<R: FieldResolver + ?Sized>(
    resolver: &R,
    request: &FilterRequest,
    options: CompileOptions,
) -> Result<CompiledQuery, FilterError> {
    PredicateBuilder::new(resolver, options).compile(request)
}
