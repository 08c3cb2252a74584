//! Filter request model
//!
//! Raw query parameters grouped by key. Repeated keys keep every value in
//! arrival order; keys keep first-seen order.

/// Keys that control paging and ordering and never become filters
pub const RESERVED_KEYS: &[&str] = &["page", "size", "sort", "sortBy", "sortDirection"];

pub const PAGE_KEY: &str = "page";
pub const SIZE_KEY: &str = "size";
pub const SORT_BY_KEY: &str = "sortBy";
pub const SORT_DIRECTION_KEY: &str = "sortDirection";
/// Pageable-style `sort=field[,direction]`, used when `sortBy` is absent
pub const SORT_KEY: &str = "sort";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    entries: Vec<(String, Vec<String>)>,
}

/// Requested ordering, still unresolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Option<String>,
    pub direction: Option<String>,
}

impl FilterRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new();
        for (key, value) in pairs {
            request.push(key, value);
        }
        request
    }

    /// Append a value under `key`
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)?.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filter entries with reserved keys stripped
    pub fn filters(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Ordering requested via `sortBy`/`sortDirection`, or `sort=field,dir`
    pub fn sort_spec(&self) -> SortSpec {
        if let Some(field) = self.first(SORT_BY_KEY) {
            return SortSpec {
                field: Some(field.to_string()),
                direction: self.first(SORT_DIRECTION_KEY).map(str::to_string),
            };
        }

        match self.first(SORT_KEY) {
            Some(sort) => {
                let (field, direction) = match sort.split_once(',') {
                    Some((field, direction)) => (field, Some(direction.trim().to_string())),
                    None => (sort, None),
                };
                SortSpec {
                    field: Some(field.trim().to_string()),
                    direction,
                }
            }
            None => SortSpec::default(),
        }
    }
}
