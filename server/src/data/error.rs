//! Unified error type for data layer

use thiserror::Error;

/// Error raised while loading or querying record stores
#[derive(Error, Debug)]
pub enum DataError {
    /// Seed file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed data is not valid JSON
    #[error("Invalid seed data for '{record}': {source}")]
    Seed {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    /// Seed data parsed but has the wrong shape
    #[error("Invalid seed data for '{record}': {reason}")]
    SeedShape { record: String, reason: String },

    /// No store for this record type
    #[error("Unknown record type: {0}")]
    UnknownRecord(String),
}

impl DataError {
    pub fn seed(record: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Seed {
            record: record.into(),
            source,
        }
    }

    pub fn seed_shape(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SeedShape {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller asked for something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownRecord(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DataError::seed_shape("produtos", "expected a JSON array");
        assert_eq!(
            err.to_string(),
            "Invalid seed data for 'produtos': expected a JSON array"
        );
        assert!(!err.is_not_found());
        assert!(DataError::UnknownRecord("x".into()).is_not_found());
    }
}
