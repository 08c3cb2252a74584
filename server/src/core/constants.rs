// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Sieve";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "sieve";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".sieve";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "sieve.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SIEVE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "SIEVE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "SIEVE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SIEVE_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

// =============================================================================
// Environment Variables - Filters
// =============================================================================

/// Environment variable for the SQL dialect used in query plans
pub const ENV_SQL_DIALECT: &str = "SIEVE_SQL_DIALECT";

/// Environment variable for OR-group branch error handling (skip or fail)
pub const ENV_OR_GROUP_ERRORS: &str = "SIEVE_OR_GROUP_ERRORS";

/// Environment variable for the product seed file
pub const ENV_SEED_PATH: &str = "SIEVE_SEED_PATH";

// =============================================================================
// Pagination
// =============================================================================

/// Default records per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum records per page
pub const MAX_PAGE_SIZE: u32 = 500;
