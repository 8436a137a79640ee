//! Runtime configuration
//!
//! Every setting can be given as a flag or through the environment; `.env`
//! files are loaded by the binary before parsing.

use std::time::Duration;

use clap::Args;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level or filter directives, used when `RUST_LOG` does not parse
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Primary store settings.
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Cache tier settings.
#[derive(Debug, Clone, Args)]
pub struct CacheConfig {
    /// Redis connection string for the distributed cache and item events
    #[arg(long, env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: String,

    /// TTL of distributed cache entries in seconds
    #[arg(long, env = "REDIS_CACHE_TTL_SECONDS", default_value_t = 300)]
    pub redis_cache_ttl_seconds: u64,

    /// TTL of in-process cache entries in seconds
    #[arg(long, env = "LOCAL_CACHE_TTL_SECONDS", default_value_t = 30)]
    pub local_cache_ttl_seconds: u64,
}

impl CacheConfig {
    #[must_use]
    pub const fn redis_ttl(&self) -> Duration {
        Duration::from_secs(self.redis_cache_ttl_seconds)
    }

    #[must_use]
    pub const fn local_ttl(&self) -> Duration {
        Duration::from_secs(self.local_cache_ttl_seconds)
    }
}

/// Users API settings.
#[derive(Debug, Clone, Args)]
pub struct UsersApiArgs {
    /// Base URL of the users API that verifies tokens
    #[arg(long, env = "USERS_API_URL", default_value = "http://localhost:8080")]
    pub users_api_url: String,

    /// Timeout for one token verification in seconds
    #[arg(long, env = "USERS_API_TIMEOUT_SECONDS", default_value_t = 5)]
    pub users_api_timeout_seconds: u64,
}

/// Everything needed to build an [`crate::context::AppContext`].
#[derive(Debug, Clone, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Primary store settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Cache tier settings.
    #[command(flatten)]
    pub cache: CacheConfig,

    /// Users API settings.
    #[command(flatten)]
    pub users_api: UsersApiArgs,

    /// Pub/sub channel that receives item change events
    #[arg(long, env = "ITEM_EVENTS_CHANNEL", default_value = "items")]
    pub item_events_channel: String,

    /// Deadline for one command, covering every downstream call
    #[arg(long, env = "REQUEST_TIMEOUT_SECONDS", default_value_t = 10)]
    pub request_timeout_seconds: u64,
}

impl AppConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
