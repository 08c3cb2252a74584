use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_OR_GROUP_ERRORS, ENV_PORT, ENV_SEED_PATH, ENV_SQL_DIALECT,
};
use crate::data::sql::Backend;
use crate::domain::filters::OrGroupErrors;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(version, about = "Dynamic query filters for record listings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQL dialect for query plans (postgres or sqlite)
    #[arg(long, global = true, env = ENV_SQL_DIALECT, value_parser = parse_sql_dialect)]
    pub dialect: Option<Backend>,

    /// What to do when an OR-group branch fails (skip or fail)
    #[arg(long, global = true, env = ENV_OR_GROUP_ERRORS, value_parser = parse_or_group_errors)]
    pub or_group_errors: Option<OrGroupErrors>,

    /// JSON array of product records replacing the built-in seed
    #[arg(long, global = true, env = ENV_SEED_PATH)]
    pub seed_path: Option<PathBuf>,
}

/// Parse SQL dialect from CLI/env string
fn parse_sql_dialect(s: &str) -> Result<Backend, String> {
    s.parse()
}

/// Parse OR-group error handling from CLI/env string
fn parse_or_group_errors(s: &str) -> Result<OrGroupErrors, String> {
    match s.to_lowercase().as_str() {
        "skip" => Ok(OrGroupErrors::Skip),
        "fail" => Ok(OrGroupErrors::Fail),
        _ => Err(format!(
            "Invalid OR-group error mode '{}'. Valid options: skip, fail",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Compile a query string and print the predicate tree and its SQL
    Compile {
        /// Record type to compile against (e.g. produtos)
        record: String,
        /// URL query string, e.g. "nome=cafe&preco=gte:10&sortBy=preco"
        #[arg(default_value = "")]
        query: String,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub dialect: Option<Backend>,
    pub or_group_errors: Option<OrGroupErrors>,
    pub seed_path: Option<PathBuf>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        dialect: cli.dialect,
        or_group_errors: cli.or_group_errors,
        seed_path: cli.seed_path,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sql_dialect() {
        assert_eq!(parse_sql_dialect("SQLite"), Ok(Backend::Sqlite));
        assert_eq!(parse_sql_dialect("postgresql"), Ok(Backend::Postgres));
        assert!(parse_sql_dialect("oracle").unwrap_err().contains("Valid options"));
    }

    #[test]
    fn test_parse_or_group_errors() {
        assert_eq!(parse_or_group_errors("FAIL"), Ok(OrGroupErrors::Fail));
        assert_eq!(parse_or_group_errors("skip"), Ok(OrGroupErrors::Skip));
        assert!(parse_or_group_errors("ignore").is_err());
    }

    #[test]
    fn test_compile_subcommand() {
        let cli = Cli::try_parse_from([
            "sieve",
            "--dialect",
            "sqlite",
            "compile",
            "produtos",
            "nome=cafe",
        ])
        .unwrap();
        assert_eq!(cli.dialect, Some(Backend::Sqlite));
        match cli.command {
            Some(Commands::Compile { record, query }) => {
                assert_eq!(record, "produtos");
                assert_eq!(query, "nome=cafe");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
