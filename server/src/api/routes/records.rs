//! Record listing endpoints
//!
//! Every query parameter that is not a paging or ordering key is a filter.
//! `GET /api/v1/records/{record}` runs the compiled filter against the
//! repository; `GET /api/v1/records/{record}/query-plan` only compiles it and
//! shows the predicate tree and its SQL rendering.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::types::{ApiError, PageResponse, page_request};
use crate::data::RecordRepository;
use crate::data::sql::{Backend, RenderedSql, SqlRenderer};
use crate::domain::filters::{
    CompileOptions, CompiledQuery, FilterRequest, OrderClause, PredicateNode, RecordSchema,
    SchemaRegistry, SkippedBranch, compile,
};

/// Shared state for record endpoints
#[derive(Clone)]
pub struct RecordsApiState {
    pub registry: Arc<SchemaRegistry>,
    pub repository: Arc<dyn RecordRepository>,
    pub options: CompileOptions,
    pub backend: Backend,
}

impl RecordsApiState {
    fn schema(&self, record: &str) -> Result<&Arc<RecordSchema>, ApiError> {
        self.registry
            .get(record)
            .ok_or_else(|| ApiError::unknown_record(record))
    }

    fn compile(&self, record: &str, request: &FilterRequest) -> Result<CompiledQuery, ApiError> {
        let schema = self.schema(record)?;
        Ok(compile(schema.as_ref(), request, self.options)?)
    }
}

/// Build record API routes
pub fn routes(state: RecordsApiState) -> Router<()> {
    Router::new()
        .route("/", get(list_record_types))
        .route("/{record}", get(list_records))
        .route("/{record}/query-plan", get(query_plan))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct RecordTypesResponse {
    pub records: Vec<String>,
}

pub async fn list_record_types(State(state): State<RecordsApiState>) -> Json<RecordTypesResponse> {
    Json(RecordTypesResponse {
        records: state
            .registry
            .record_names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// Filtered, ordered, paged records
pub async fn list_records(
    State(state): State<RecordsApiState>,
    Path(record): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<PageResponse<serde_json::Value>>, ApiError> {
    let request = FilterRequest::from_pairs(params);
    let page = page_request(&request)?;
    let compiled = state.compile(&record, &request)?;

    let result = state.repository.find_page(&record, &compiled, page).await?;
    tracing::debug!(
        record = %record,
        total = result.total,
        returned = result.rows.len(),
        "Listed records"
    );

    Ok(Json(PageResponse::new(result.rows, page, result.total)))
}

#[derive(Debug, Serialize)]
pub struct QueryPlanResponse {
    pub record: String,
    pub options: CompileOptions,
    /// Human-readable form of `predicate`
    pub filter: String,
    pub predicate: PredicateNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderClause>,
    pub sql: RenderedSql,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedBranch>,
}

/// Compiled predicate and its SQL rendering, without executing anything
pub async fn query_plan(
    State(state): State<RecordsApiState>,
    Path(record): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<QueryPlanResponse>, ApiError> {
    let request = FilterRequest::from_pairs(params);
    let page = page_request(&request)?;
    let compiled = state.compile(&record, &request)?;

    let sql = SqlRenderer::new(state.backend.dialect()).render(
        &record,
        &compiled,
        Some((page.size, page.offset())),
    );

    let CompiledQuery {
        predicate,
        order,
        skipped,
    } = compiled;

    Ok(Json(QueryPlanResponse {
        record,
        options: state.options,
        filter: predicate.to_string(),
        predicate,
        order,
        sql,
        skipped,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value as Json;
    use tower::ServiceExt;

    use super::*;
    use crate::data::MemoryDatabase;
    use crate::domain::catalog;

    fn app(backend: Backend) -> Router {
        let state = RecordsApiState {
            registry: Arc::new(catalog::registry()),
            repository: Arc::new(MemoryDatabase::seeded(None).unwrap()),
            options: CompileOptions::default(),
            backend,
        };
        routes(state)
    }

    async fn get_json(backend: Backend, uri: &str) -> (StatusCode, Json) {
        let response = app(backend)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn ids(body: &Json) -> Vec<i64> {
        body["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_list_unfiltered() {
        let (status, body) = get_json(Backend::Postgres, "/produtos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_elements"], 6);
        assert_eq!(body["total_pages"], 1);
        assert_eq!(body["page"], 0);
        assert_eq!(body["size"], 20);
        assert_eq!(ids(&body).len(), 6);
    }

    #[tokio::test]
    async fn test_list_with_or_group() {
        let (status, body) = get_json(Backend::Postgres, "/produtos?categoria!subcategoria=queijo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![3]);
    }

    #[tokio::test]
    async fn test_list_sorted_and_paged() {
        let (status, body) = get_json(
            Backend::Postgres,
            "/produtos?sortBy=preco&sortDirection=desc&page=1&size=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![4, 2]);
        assert_eq!(body["total_pages"], 3);
    }

    #[tokio::test]
    async fn test_list_relation_filter() {
        let (status, body) = get_json(Backend::Postgres, "/produtos?fornecedor.cidade=belo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![3, 6]);
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let (status, body) = get_json(Backend::Postgres, "/produtos?cor=azul").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNKNOWN_FILTER_FIELD");
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_invalid_value_is_bad_request() {
        let (status, body) = get_json(Backend::Postgres, "/produtos?estoque=muitos").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER_VALUE");
    }

    #[tokio::test]
    async fn test_invalid_size_is_bad_request() {
        let (status, body) = get_json(Backend::Postgres, "/produtos?size=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAGE_SIZE");
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let (status, body) = get_json(Backend::Postgres, "/pedidos").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "RECORD_NOT_FOUND");

        let (status, _) = get_json(Backend::Postgres, "/pedidos/query-plan").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_record_types() {
        let (status, body) = get_json(Backend::Postgres, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], serde_json::json!(["fornecedores", "produtos"]));
    }

    #[tokio::test]
    async fn test_query_plan_postgres() {
        let (status, body) = get_json(
            Backend::Postgres,
            "/produtos/query-plan?nome=cafe&sortBy=preco&sortDirection=desc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["record"], "produtos");
        assert_eq!(body["predicate"]["op"], "contains");
        assert_eq!(body["sql"]["dialect"], "postgres");
        assert_eq!(
            body["sql"]["where_clause"],
            "unaccent(lower(\"nome\")) LIKE $1 ESCAPE '\\'"
        );
        assert_eq!(body["sql"]["params"], serde_json::json!(["%cafe%"]));
        assert_eq!(body["sql"]["order_by"], "\"preco\" DESC NULLS LAST");
        assert!(body.get("skipped").is_none());
    }

    #[tokio::test]
    async fn test_query_plan_sqlite_reports_skipped_branch() {
        let (status, body) = get_json(
            Backend::Sqlite,
            "/produtos/query-plan?nome!estoque=cafe",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sql"]["dialect"], "sqlite");
        assert_eq!(body["skipped"][0]["key"], "estoque");
        assert_eq!(body["skipped"][0]["code"], "INVALID_FILTER_VALUE");
        assert_eq!(body["sql"]["params"], serde_json::json!(["%cafe%"]));
    }
}
