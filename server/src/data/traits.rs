//! Repository traits for record backends
//!
//! The filter compiler only produces a [`CompiledQuery`]; executing it and
//! paging the result belongs to whatever implements [`RecordRepository`].

use async_trait::async_trait;
use serde::Serialize;

use crate::data::error::DataError;
use crate::domain::filters::CompiledQuery;

/// Zero-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

/// Records on one page plus the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    pub rows: Vec<serde_json::Value>,
    pub total: u64,
}

/// Repository trait for filtered record listing
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Record types this repository can serve
    fn record_names(&self) -> Vec<&str>;

    /// Rows of `record` matching `query`, ordered and paged
    async fn find_page(
        &self,
        record: &str,
        query: &CompiledQuery,
        page: PageRequest,
    ) -> Result<RecordPage, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 75);
        assert_eq!(
            PageRequest::new(u32::MAX, u32::MAX).offset(),
            u32::MAX as u64 * u32::MAX as u64
        );
    }
}
