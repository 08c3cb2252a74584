//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::sql::SqlRenderer;
use crate::data::{MemoryDatabase, RecordRepository};
use crate::domain::catalog;
use crate::domain::filters::{self, CompiledQuery, FilterRequest, SchemaRegistry};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub registry: Arc<SchemaRegistry>,
    pub repository: Arc<dyn RecordRepository>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Compile { record, query }) => {
                let config = AppConfig::load(&cli_config)?;
                let output = Self::compile_command(&config, &record, &query)?;
                println!("{}", output);
                Ok(())
            }
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config)?;
                Self::start_server(app).await
            }
        }
    }

    /// Load configuration, schemas and record stores
    pub fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let registry = Arc::new(catalog::registry());

        let database = MemoryDatabase::seeded(config.catalog.seed_path.as_deref())
            .context("Failed to load record seed data")?;
        tracing::debug!(records = ?database.record_names(), "Record stores ready");

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            registry,
            repository: Arc::new(database),
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config, &app.registry.record_names());

        let server = ApiServer::new(app);
        server.start().await?;
        tracing::debug!("Shutdown complete");

        Ok(())
    }

    /// Compile `query` against `record` and describe the result
    fn compile_command(config: &AppConfig, record: &str, query: &str) -> Result<String> {
        let registry = catalog::registry();
        let schema = registry.get(record).with_context(|| {
            format!(
                "Unknown record type '{}'. Known: {}",
                record,
                registry.record_names().join(", ")
            )
        })?;

        let request = parse_query_string(query)?;
        let compiled = filters::compile(schema.as_ref(), &request, config.filters)
            .with_context(|| format!("Failed to compile filter for '{}'", record))?;

        describe(config, record, &compiled)
    }
}

/// Decode an `application/x-www-form-urlencoded` query string
fn parse_query_string(query: &str) -> Result<FilterRequest> {
    let query = query.trim().trim_start_matches('?');
    let mut request = FilterRequest::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        request.push(decode_component(key)?, decode_component(value)?);
    }
    Ok(request)
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .with_context(|| format!("Invalid percent-encoding in '{}'", raw))?;
    Ok(decoded.into_owned())
}

fn describe(config: &AppConfig, record: &str, compiled: &CompiledQuery) -> Result<String> {
    let sql = SqlRenderer::new(config.sql.dialect.dialect()).render(record, compiled, None);

    let mut out = String::new();
    out.push_str(&format!("Filter:    {}\n", compiled.predicate));
    if let Some(order) = &compiled.order {
        out.push_str(&format!("Order:     {}\n", order));
    }
    for branch in &compiled.skipped {
        out.push_str(&format!(
            "Skipped:   {} in {} ({})\n",
            branch.key, branch.group, branch.message
        ));
    }
    out.push_str(&format!("SQL ({}): {}\n", sql.dialect, sql.statement));
    let params = serde_json::to_string(&sql.params)?;
    out.push_str(&format!("Params:    {}\n", params));
    out.push_str("Predicate:\n");
    out.push_str(&serde_json::to_string_pretty(&compiled.predicate)?);
    Ok(out)
}
