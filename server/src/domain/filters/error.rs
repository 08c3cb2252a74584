//! Filter compilation errors

use thiserror::Error;

use super::schema::SemanticType;

/// Error raised while compiling a filter request
///
/// Every variant names the offending field so callers can report it back as
/// a client-input error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Key or path does not exist on the record schema
    #[error("Unknown filter field '{key}': '{segment}' is not declared on '{record}'")]
    UnresolvedField {
        key: String,
        segment: String,
        record: String,
    },

    /// Literal does not parse as the field's semantic type
    #[error("Invalid value '{literal}' for field '{field}' (expected {target})")]
    ValueConversion {
        field: String,
        literal: String,
        target: &'static str,
    },

    /// Field type has no value conversion
    #[error("Field '{field}' of type {ty} cannot be compared to a value")]
    UnsupportedType { field: String, ty: &'static str },
}

impl FilterError {
    pub fn unresolved(
        key: impl Into<String>,
        segment: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        Self::UnresolvedField {
            key: key.into(),
            segment: segment.into(),
            record: record.into(),
        }
    }

    pub fn conversion(
        field: impl Into<String>,
        literal: impl Into<String>,
        target: SemanticType,
    ) -> Self {
        Self::ValueConversion {
            field: field.into(),
            literal: literal.into(),
            target: target.name(),
        }
    }

    pub fn unsupported(field: impl Into<String>, ty: SemanticType) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            ty: ty.name(),
        }
    }

    /// Field (or filter key) the error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::UnresolvedField { key, .. } => key,
            Self::ValueConversion { field, .. } => field,
            Self::UnsupportedType { field, .. } => field,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedField { .. } => "UNKNOWN_FILTER_FIELD",
            Self::ValueConversion { .. } => "INVALID_FILTER_VALUE",
            Self::UnsupportedType { .. } => "UNSUPPORTED_FILTER_TYPE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_message_names_field_and_literal() {
        let err = FilterError::conversion("preco", "abc", SemanticType::DecimalExact);
        assert_eq!(err.field(), "preco");
        assert_eq!(err.code(), "INVALID_FILTER_VALUE");
        assert_eq!(
            err.to_string(),
            "Invalid value 'abc' for field 'preco' (expected decimal)"
        );
    }

    #[test]
    fn test_unresolved_message() {
        let err = FilterError::unresolved("fornecedor.pais", "pais", "fornecedores");
        assert_eq!(err.field(), "fornecedor.pais");
        assert_eq!(err.code(), "UNKNOWN_FILTER_FIELD");
        assert!(err.to_string().contains("'pais' is not declared on 'fornecedores'"));
    }
}
