//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::{CacheBackend, DEFAULT_KEY_NAMESPACE};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "reelshelf";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CACHE_PAGE_TTL_SECS: u64 = 3600;
const MAX_CACHE_PAGE_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 50;
const DEFAULT_CACHE_MEMORY_CAPACITY: u64 = 1024;
const MAX_KEY_NAMESPACE_LEN: usize = 64;
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_SAMPLE_SIZE: u32 = 5;

/// Command-line arguments for the reelshelf binary.
#[derive(Debug, Parser)]
#[command(name = "reelshelf", version, about = "Cache-fronted catalog service")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "REELSHELF_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Create the catalog schema if it does not exist yet, then exit.
    #[command(name = "migrate")]
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the cache backend (memory|redis).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the Redis endpoint, e.g. redis://127.0.0.1:6379/0.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,

    /// Override the lifetime of cached pages.
    #[arg(long = "cache-page-ttl-seconds", value_name = "SECONDS")]
    pub cache_page_ttl_seconds: Option<u64>,

    /// Override the per-call cache timeout.
    #[arg(long = "cache-op-timeout-ms", value_name = "MILLISECONDS")]
    pub cache_op_timeout_ms: Option<u64>,

    /// Drop cached item pages after every rating write.
    #[arg(
        long = "cache-invalidate-on-rating",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_invalidate_on_rating: Option<bool>,

    /// Override the largest accepted page size.
    #[arg(long = "catalog-max-page-size", value_name = "COUNT")]
    pub catalog_max_page_size: Option<u32>,

    /// Override the largest recommendation sample.
    #[arg(long = "catalog-max-sample-size", value_name = "COUNT")]
    pub catalog_max_sample_size: Option<u32>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub page_ttl: Duration,
    pub op_timeout: Duration,
    pub memory_capacity: NonZeroUsize,
    pub key_namespace: String,
    pub invalidate_on_rating: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub default_page_size: NonZeroU32,
    pub max_page_size: NonZeroU32,
    pub max_sample_size: NonZeroU32,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("REELSHELF").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    catalog: RawCatalogSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(backend) = overrides.cache_backend.as_ref() {
            self.cache.backend = Some(backend.clone());
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.cache_page_ttl_seconds {
            self.cache.page_ttl_seconds = Some(seconds);
        }
        if let Some(millis) = overrides.cache_op_timeout_ms {
            self.cache.op_timeout_ms = Some(millis);
        }
        if let Some(enabled) = overrides.cache_invalidate_on_rating {
            self.cache.invalidate_on_rating = Some(enabled);
        }
        if let Some(max) = overrides.catalog_max_page_size {
            self.catalog.max_page_size = Some(max);
        }
        if let Some(max) = overrides.catalog_max_sample_size {
            self.catalog.max_sample_size = Some(max);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            catalog,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            cache: build_cache_settings(cache)?,
            catalog: build_catalog_settings(catalog)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let redis_url = cache.redis_url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let backend = match cache
        .backend
        .as_deref()
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        None | Some("memory") => CacheBackend::Memory,
        Some("redis") => {
            let url = redis_url.ok_or_else(|| {
                LoadError::invalid("cache.redis_url", "required when cache.backend is `redis`")
            })?;
            CacheBackend::Redis { url }
        }
        Some(other) => {
            return Err(LoadError::invalid(
                "cache.backend",
                format!("unknown backend `{other}`, expected `memory` or `redis`"),
            ));
        }
    };

    let ttl_secs = cache
        .page_ttl_seconds
        .unwrap_or(DEFAULT_CACHE_PAGE_TTL_SECS);
    if ttl_secs == 0 || ttl_secs > MAX_CACHE_PAGE_TTL_SECS {
        return Err(LoadError::invalid(
            "cache.page_ttl_seconds",
            format!("must be between 1 and {MAX_CACHE_PAGE_TTL_SECS}"),
        ));
    }

    let timeout_ms = cache.op_timeout_ms.unwrap_or(DEFAULT_CACHE_OP_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "cache.op_timeout_ms",
            "must be greater than zero",
        ));
    }

    let capacity_value = cache
        .memory_capacity
        .unwrap_or(DEFAULT_CACHE_MEMORY_CAPACITY);
    let memory_capacity = usize::try_from(capacity_value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid(
                "cache.memory_capacity",
                "must be greater than zero and fit in usize",
            )
        })?;

    let key_namespace = cache
        .key_namespace
        .unwrap_or_else(|| DEFAULT_KEY_NAMESPACE.to_string());
    validate_key_namespace(&key_namespace)?;

    Ok(CacheSettings {
        backend,
        page_ttl: Duration::from_secs(ttl_secs),
        op_timeout: Duration::from_millis(timeout_ms),
        memory_capacity,
        key_namespace,
        invalidate_on_rating: cache.invalidate_on_rating.unwrap_or(false),
    })
}

fn validate_key_namespace(namespace: &str) -> Result<(), LoadError> {
    if namespace.is_empty() || namespace.len() > MAX_KEY_NAMESPACE_LEN {
        return Err(LoadError::invalid(
            "cache.key_namespace",
            format!("must be 1 to {MAX_KEY_NAMESPACE_LEN} characters"),
        ));
    }
    if !namespace
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-'))
    {
        return Err(LoadError::invalid(
            "cache.key_namespace",
            "only ASCII letters, digits, `.`, `_` and `-` are allowed",
        ));
    }
    Ok(())
}

fn build_catalog_settings(catalog: RawCatalogSettings) -> Result<CatalogSettings, LoadError> {
    let default_page_size = non_zero_u32(
        catalog.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE).into(),
        "catalog.default_page_size",
    )?;
    let max_page_size = non_zero_u32(
        catalog.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE).into(),
        "catalog.max_page_size",
    )?;
    let max_sample_size = non_zero_u32(
        catalog
            .max_sample_size
            .unwrap_or(DEFAULT_MAX_SAMPLE_SIZE)
            .into(),
        "catalog.max_sample_size",
    )?;

    if default_page_size > max_page_size {
        return Err(LoadError::invalid(
            "catalog.default_page_size",
            format!("must not exceed catalog.max_page_size ({max_page_size})"),
        ));
    }

    Ok(CatalogSettings {
        default_page_size,
        max_page_size,
        max_sample_size,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    backend: Option<String>,
    redis_url: Option<String>,
    page_ttl_seconds: Option<u64>,
    op_timeout_ms: Option<u64>,
    memory_capacity: Option<u64>,
    key_namespace: Option<String>,
    invalidate_on_rating: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCatalogSettings {
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
    max_sample_size: Option<u32>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
