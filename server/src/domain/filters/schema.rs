//! Record schemas and field resolution
//!
//! A [`RecordSchema`] is declared once at startup. Building it precomputes
//! every scalar path reachable through relations, so resolving a filter key
//! is a map lookup instead of per-request introspection. Keys that reach into
//! a JSON column are walked segment by segment and become a [`JsonPath`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::error::FilterError;
use super::json_path::JsonPath;

/// Separator between path segments in a filter key
pub const PATH_SEPARATOR: char = '.';

/// Enum type with its declared members
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EnumType {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumType {
    /// Exact, case-sensitive member lookup
    pub fn member(&self, name: &str) -> Option<&'static str> {
        self.members.iter().copied().find(|m| *m == name)
    }
}

/// Semantic type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Text,
    Int16,
    Integer32,
    Integer64,
    Float32,
    Float64,
    DecimalExact,
    IntegerBig,
    Boolean,
    Date,
    DateTime,
    Enum(&'static EnumType),
    JsonDocument,
    /// Type without a declared conversion; literals pass through untouched
    Other(&'static str),
}

impl SemanticType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int16 => "int16",
            Self::Integer32 => "integer32",
            Self::Integer64 => "integer64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::DecimalExact => "decimal",
            Self::IntegerBig => "bigint",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Enum(e) => e.name,
            Self::JsonDocument => "json",
            Self::Other(name) => name,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int16
                | Self::Integer32
                | Self::Integer64
                | Self::Float32
                | Self::Float64
                | Self::DecimalExact
                | Self::IntegerBig
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Whether `operator:literal` values are merged into range bounds
    pub fn supports_range(&self) -> bool {
        self.is_numeric() || self.is_temporal()
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolved scalar field: relation traversal segments plus terminal type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldPath {
    pub segments: Vec<String>,
    #[serde(rename = "type")]
    pub ty: SemanticType,
}

impl FieldPath {
    pub fn new(segments: Vec<String>, ty: SemanticType) -> Self {
        Self { segments, ty }
    }

    /// Dotted key, e.g. `fornecedor.nome`
    pub fn key(&self) -> String {
        self.segments.join(".")
    }

    /// Terminal column name
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Relation segments leading to the terminal column
    pub fn relations(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }
}

/// Left-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    Field(FieldPath),
    Json(JsonPath),
}

impl Operand {
    pub fn key(&self) -> String {
        match self {
            Self::Field(path) => path.key(),
            Self::Json(path) => path.key(),
        }
    }

    /// Type the operand evaluates to (JSON extractions are text)
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Field(path) => path.ty,
            Self::Json(_) => SemanticType::Text,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Field resolution capability consumed by the predicate builder
pub trait FieldResolver: Send + Sync {
    /// Record type name, used in error messages
    fn record_name(&self) -> &str;

    /// Resolve a dotted filter key to an operand
    fn resolve(&self, key: &str) -> Result<Operand, FilterError>;

    /// Every declared scalar path with its type, sorted by key
    fn declared_fields(&self) -> Vec<(String, SemanticType)>;
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(SemanticType),
    Relation(Arc<RecordSchema>),
}

/// Declared record type
#[derive(Debug)]
pub struct RecordSchema {
    name: String,
    fields: Vec<(String, FieldKind)>,
    paths: HashMap<String, FieldPath>,
}

impl RecordSchema {
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldKind> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, kind)| kind)
    }

    /// Slow path: keys that are not precomputed scalar paths
    fn walk(&self, key: &str) -> Result<Operand, FilterError> {
        let segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
        let mut schema = self;
        let mut walked = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let has_more = i + 1 < segments.len();
            let Some(kind) = schema.field(segment) else {
                return Err(FilterError::unresolved(key, *segment, schema.name()));
            };
            walked.push(segment.to_string());

            match kind {
                FieldKind::Relation(target) if has_more => schema = target.as_ref(),
                FieldKind::Scalar(SemanticType::JsonDocument) if has_more => {
                    let column = FieldPath::new(walked, SemanticType::JsonDocument);
                    let path = JsonPath::parse(column, &segments[i + 1..].join("."));
                    if path.keys.is_empty() {
                        return Ok(Operand::Field(path.column));
                    }
                    return Ok(Operand::Json(path));
                }
                FieldKind::Scalar(_) if has_more => {
                    return Err(FilterError::unresolved(key, segments[i + 1], schema.name()));
                }
                _ => break,
            }
        }

        // Terminal relation: nothing comparable at this path
        Err(FilterError::unresolved(
            key,
            segments.last().copied().unwrap_or_default(),
            schema.name(),
        ))
    }
}

impl FieldResolver for RecordSchema {
    fn record_name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, key: &str) -> Result<Operand, FilterError> {
        match self.paths.get(key) {
            Some(path) => Ok(Operand::Field(path.clone())),
            None => self.walk(key),
        }
    }

    fn declared_fields(&self) -> Vec<(String, SemanticType)> {
        let mut fields: Vec<_> = self
            .paths
            .iter()
            .map(|(key, path)| (key.clone(), path.ty))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields
    }
}

pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<(String, FieldKind)>,
}

impl RecordSchemaBuilder {
    pub fn field(self, name: &str, ty: SemanticType) -> Self {
        self.with(name, FieldKind::Scalar(ty))
    }

    pub fn relation(self, name: &str, target: Arc<RecordSchema>) -> Self {
        self.with(name, FieldKind::Relation(target))
    }

    fn with(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.retain(|(field, _)| field != name);
        self.fields.push((name.to_string(), kind));
        self
    }

    pub fn build(self) -> RecordSchema {
        let mut paths = HashMap::new();
        for (name, kind) in &self.fields {
            match kind {
                FieldKind::Scalar(ty) => {
                    paths.insert(name.clone(), FieldPath::new(vec![name.clone()], *ty));
                }
                FieldKind::Relation(target) => {
                    for (nested_key, nested) in &target.paths {
                        let mut segments = Vec::with_capacity(nested.segments.len() + 1);
                        segments.push(name.clone());
                        segments.extend(nested.segments.iter().cloned());
                        paths.insert(
                            format!("{}{}{}", name, PATH_SEPARATOR, nested_key),
                            FieldPath::new(segments, nested.ty),
                        );
                    }
                }
            }
        }

        RecordSchema {
            name: self.name,
            fields: self.fields,
            paths,
        }
    }
}

/// Record schemas keyed by record type name, built once at startup
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: Arc<RecordSchema>) {
        tracing::debug!(record = schema.name(), "Registered record schema");
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, record: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(record)
    }

    pub fn record_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
