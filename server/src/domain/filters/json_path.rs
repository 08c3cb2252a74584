//! JSON column sub-field access
//!
//! A JSON path names a JSON-typed column plus literal keys inside the
//! document. The extraction always evaluates to text, so JSON comparisons are
//! folded substring matches and never typed or ranged.

use std::borrow::Cow;

use serde::Serialize;

use super::schema::FieldPath;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonPath {
    pub column: FieldPath,
    pub keys: Vec<String>,
}

impl JsonPath {
    pub fn new(column: FieldPath, keys: Vec<String>) -> Self {
        Self { column, keys }
    }

    /// Build from a dotted document path, e.g. `endereco.cidade`
    pub fn parse(column: FieldPath, path: &str) -> Self {
        let keys = path
            .split('.')
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(column, keys)
    }

    pub fn key(&self) -> String {
        let mut key = self.column.key();
        for k in &self.keys {
            key.push('.');
            key.push_str(k);
        }
        key
    }

    /// Extract the addressed value from `document` as text.
    ///
    /// Objects are walked by key and arrays by numeric index. Strings come back
    /// unquoted, other scalars and containers as their JSON text. Missing keys
    /// and JSON `null` yield `None`.
    pub fn extract_text<'a>(&self, document: &'a serde_json::Value) -> Option<Cow<'a, str>> {
        let mut current = document;
        for key in &self.keys {
            current = match current {
                serde_json::Value::Object(map) => map.get(key)?,
                serde_json::Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        match current {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}
