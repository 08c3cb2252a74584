//! In-memory record stores

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value as Json;

use super::eval::{matches, operand_value};
use crate::data::error::DataError;
use crate::data::traits::{PageRequest, RecordPage, RecordRepository};
use crate::domain::catalog;
use crate::domain::filters::{CompiledQuery, OrderClause, Value};

/// Rows of one record type
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Vec<Json>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Json>) -> Self {
        Self { rows }
    }

    /// Parse a JSON array of objects
    pub fn from_json(record: &str, json: &str) -> Result<Self, DataError> {
        let value: Json = serde_json::from_str(json).map_err(|e| DataError::seed(record, e))?;
        let Json::Array(rows) = value else {
            return Err(DataError::seed_shape(record, "expected a JSON array"));
        };
        if let Some(i) = rows.iter().position(|row| !row.is_object()) {
            return Err(DataError::seed_shape(
                record,
                format!("element {} is not an object", i),
            ));
        }
        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Filter, order and page. Ordering is stable and puts missing values last.
    pub fn query(&self, compiled: &CompiledQuery, page: PageRequest) -> RecordPage {
        let mut hits: Vec<&Json> = self
            .rows
            .iter()
            .filter(|row| matches(&compiled.predicate, row))
            .collect();

        if let Some(order) = &compiled.order {
            sort_rows(&mut hits, order);
        }

        let total = hits.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let rows = hits
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .cloned()
            .collect();

        RecordPage { rows, total }
    }
}

fn sort_rows(rows: &mut [&Json], order: &OrderClause) {
    let desc = order.direction.is_desc();
    rows.sort_by_cached_key(|row| SortKey {
        value: operand_value(&order.operand, row).filter(|value| !is_nan(value)),
        desc,
    });
}

/// NaN has no place in a total order; it sorts with the missing values
fn is_nan(value: &Value) -> bool {
    match value {
        Value::Float32(v) => v.is_nan(),
        Value::Float64(v) => v.is_nan(),
        _ => false,
    }
}

/// Missing values sort last in either direction
struct SortKey {
    value: Option<Value>,
    desc: bool,
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.value, &other.value) {
            (Some(a), Some(b)) => {
                let ord = match (a, b) {
                    (Value::Float32(x), Value::Float32(y)) => x.total_cmp(y),
                    (Value::Float64(x), Value::Float64(y)) => x.total_cmp(y),
                    _ => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                };
                if self.desc { ord.reverse() } else { ord }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Stores for every catalog record type
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    stores: HashMap<String, MemoryStore>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: impl Into<String>, store: MemoryStore) {
        self.stores.insert(record.into(), store);
    }

    pub fn store(&self, record: &str) -> Option<&MemoryStore> {
        self.stores.get(record)
    }

    /// Load the built-in catalog seed. `produtos_seed` replaces the built-in
    /// product rows.
    pub fn seeded(produtos_seed: Option<&Path>) -> Result<Self, DataError> {
        let mut db = Self::new();
        for (record, json) in catalog::seed() {
            let store = match produtos_seed {
                Some(path) if record == catalog::PRODUTOS => {
                    let json = std::fs::read_to_string(path)?;
                    tracing::debug!(path = %path.display(), "Loading product seed file");
                    MemoryStore::from_json(record, &json)?
                }
                _ => MemoryStore::from_json(record, json)?,
            };
            tracing::debug!(record, rows = store.len(), "Seeded record store");
            db.insert(record, store);
        }
        Ok(db)
    }
}

#[async_trait]
impl RecordRepository for MemoryDatabase {
    fn record_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    async fn find_page(
        &self,
        record: &str,
        query: &CompiledQuery,
        page: PageRequest,
    ) -> Result<RecordPage, DataError> {
        let store = self
            .store(record)
            .ok_or_else(|| DataError::UnknownRecord(record.to_string()))?;
        Ok(store.query(query, page))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::filters::{CompileOptions, FilterRequest, PredicateNode, compile};

    fn query(pairs: &[(&str, &str)], page: PageRequest) -> RecordPage {
        let registry = catalog::registry();
        let produtos = registry.get(catalog::PRODUTOS).unwrap();
        let request = FilterRequest::from_pairs(pairs.iter().copied());
        let compiled = compile(produtos.as_ref(), &request, CompileOptions::default()).unwrap();
        let db = MemoryDatabase::seeded(None).unwrap();
        db.store(catalog::PRODUTOS).unwrap().query(&compiled, page)
    }

    fn ids(page: &RecordPage) -> Vec<i64> {
        page.rows
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_unfiltered_returns_all_rows() {
        let page = query(&[], PageRequest::new(0, 20));
        assert_eq!(page.total, 6);
        assert_eq!(ids(&page), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_or_group_over_catalog() {
        let page = query(&[("categoria!subcategoria", "queijo")], PageRequest::new(0, 20));
        assert_eq!(ids(&page), vec![3]);

        let page = query(&[("nome!subcategoria", "queijo")], PageRequest::new(0, 20));
        assert_eq!(ids(&page), vec![3, 4]);
    }

    #[test]
    fn test_sort_desc_with_paging() {
        let page = query(
            &[("sortBy", "preco"), ("sortDirection", "desc")],
            PageRequest::new(1, 2),
        );
        assert_eq!(page.total, 6);
        assert_eq!(ids(&page), vec![4, 2]);
    }

    #[test]
    fn test_sort_puts_nulls_last() {
        let page = query(&[("sort", "avaliacao,asc")], PageRequest::new(0, 20));
        assert_eq!(ids(&page).last(), Some(&6));

        let page = query(&[("sort", "avaliacao,desc")], PageRequest::new(0, 20));
        assert_eq!(ids(&page), vec![4, 1, 3, 2, 5, 6]);
    }

    #[test]
    fn test_sort_puts_nan_with_missing_values() {
        let store = MemoryStore::from_json(
            catalog::PRODUTOS,
            r#"[{"id": 1, "peso": "NaN"}, {"id": 2, "peso": 1.5}, {"id": 3, "peso": 0.5},
                {"id": 4, "peso": null}, {"id": 5, "peso": "-inf"}]"#,
        )
        .unwrap();
        let registry = catalog::registry();
        let produtos = registry.get(catalog::PRODUTOS).unwrap();
        let sorted = |pairs: &[(&str, &str)]| {
            let request = FilterRequest::from_pairs(pairs.iter().copied());
            let compiled =
                compile(produtos.as_ref(), &request, CompileOptions::default()).unwrap();
            ids(&store.query(&compiled, PageRequest::new(0, 20)))
        };

        assert_eq!(sorted(&[("sortBy", "peso")]), vec![5, 3, 2, 1, 4]);
        assert_eq!(
            sorted(&[("sortBy", "peso"), ("sortDirection", "desc")]),
            vec![2, 3, 5, 1, 4]
        );
    }

    #[test]
    fn test_date_range_and_relation() {
        let page = query(
            &[
                ("dataCriacao", "gte:2023-01-01"),
                ("dataCriacao", "lte:2023-12-31"),
                ("fornecedor.cidade", "belo"),
            ],
            PageRequest::new(0, 20),
        );
        assert_eq!(ids(&page), vec![6]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = query(&[], PageRequest::new(5, 20));
        assert_eq!(page.total, 6);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(matches!(
            MemoryStore::from_json("x", "{}"),
            Err(DataError::SeedShape { .. })
        ));
        assert!(matches!(
            MemoryStore::from_json("x", "[1]"),
            Err(DataError::SeedShape { .. })
        ));
        assert!(matches!(
            MemoryStore::from_json("x", "[oops"),
            Err(DataError::Seed { .. })
        ));
    }

    #[test]
    fn test_seed_path_replaces_products() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 99, "nome": "Mel Silvestre"}}]"#).unwrap();

        let db = MemoryDatabase::seeded(Some(file.path())).unwrap();
        assert_eq!(db.store(catalog::PRODUTOS).unwrap().len(), 1);
        assert_eq!(db.store(catalog::FORNECEDORES).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_repository_unknown_record() {
        let db = MemoryDatabase::seeded(None).unwrap();
        let compiled = CompiledQuery {
            predicate: PredicateNode::True,
            order: None,
            skipped: Vec::new(),
        };
        let err = db
            .find_page("pedidos", &compiled, PageRequest::new(0, 10))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(db.record_names(), vec!["fornecedores", "produtos"]);
    }
}
