//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::routes::records::{self, RecordsApiState};
use super::routes::health;
use crate::core::CoreApp;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Full application router
    pub fn router(&self) -> Router {
        let state = RecordsApiState {
            registry: self.app.registry.clone(),
            repository: self.app.repository.clone(),
            options: self.app.config.filters,
            backend: self.app.config.sql.dialect,
        };

        Router::new()
            .route("/api/v1/health", get(health::health))
            .nest("/api/v1/records", records::routes(state))
            .fallback(middleware::handle_404)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::cors(&self.allowed_origins))
    }

    /// Returns CoreApp once the server has shut down
    pub async fn start(self) -> Result<CoreApp> {
        let router = self.router();
        let app = self.app;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "Listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::core::cli::CliConfig;

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = CoreApp::init(&CliConfig::default()).unwrap();
        let router = ApiServer::new(app).router();
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_records_are_nested() {
        let (status, body) = get("/api/v1/records/fornecedores?cidade=curitiba").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_elements"], 1);
        assert_eq!(body["content"][0]["id"], 4);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get("/api/v2/produtos").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
