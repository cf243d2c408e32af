//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vitrina";
const ENV_PREFIX: &str = "VITRINA";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_SPA_ROOT_ID: &str = "root";
const DEFAULT_SPA_FETCH_TIMEOUT_MS: u64 = 1500;
const DEFAULT_SPA_ENTRY_TTL_SECS: u64 = 3600;
const DEFAULT_CACHE_CONNECT_TIMEOUT_MS: u64 = 500;
const DEFAULT_CACHE_TTL_SECS: u64 = 21_600;
const DEFAULT_CACHE_MEMORY_LIMIT: usize = 1000;
const DEFAULT_SNAPSHOT_PATH: &str = "data/directory.json";

/// Command-line arguments for the vitrina binary.
#[derive(Debug, Parser)]
#[command(
    name = "vitrina",
    version,
    about = "Crawlable storefront pages for public business profiles"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VITRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve public storefront pages over HTTP.
    Serve(Box<ServeArgs>),
    /// Render one storefront page to stdout.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DirectoryOverrides {
    /// Override the directory backend (snapshot|stub).
    #[arg(long = "directory-mode", value_name = "MODE")]
    pub directory_mode: Option<String>,

    /// Override the directory snapshot file.
    #[arg(long = "directory-snapshot", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub directory: DirectoryOverrides,

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

    /// Override the public base URL used for canonical links.
    #[arg(long = "public-base-url", value_name = "URL")]
    pub public_base_url: Option<String>,

    /// Allow a request host to become the page origin (repeatable).
    #[arg(long = "public-allowed-host", value_name = "HOST")]
    pub public_allowed_hosts: Vec<String>,

    /// Override the SPA bootstrap script path.
    #[arg(long = "spa-entry-path", value_name = "PATH")]
    pub spa_entry_path: Option<String>,

    /// Override the Redis connection URL for the SEO cache.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub directory: DirectoryOverrides,

    /// Company slug to render.
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// Render the detail page of this service instead of the overview.
    #[arg(long = "service", value_name = "SLUG")]
    pub service: Option<String>,

    /// Storefront category.
    #[arg(long = "category", value_name = "CATEGORY", default_value = "barberias")]
    pub category: String,

    /// Origin used for canonical links, e.g. https://example.com.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Page locale.
    #[arg(long = "locale", value_name = "LOCALE", default_value = "es")]
    pub locale: String,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub public: PublicSettings,
    pub cache: CacheSettings,
    pub directory: DirectorySettings,
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
pub struct PublicSettings {
    /// Origin override; when absent the origin comes from request headers.
    pub base_url: Option<String>,
    /// Lowercased hosts (`name` or `name:port`) trusted from request headers.
    pub allowed_hosts: Vec<String>,
    /// Fixed SPA bootstrap script; when absent it is discovered.
    pub spa_entry_path: Option<String>,
    pub spa_root_id: String,
    /// Where the SPA index is fetched from; defaults to `base_url`.
    pub spa_origin: Option<String>,
    pub spa_fetch_timeout: Duration,
    pub spa_entry_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub redis_host: Option<String>,
    pub redis_port: Option<u16>,
    pub redis_password: Option<String>,
    pub connect_timeout_ms: u64,
    pub ttl_seconds: u64,
    pub memory_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryMode {
    /// Companies and services loaded from a JSON snapshot.
    Snapshot,
    /// Empty directory; every lookup is a miss.
    Stub,
}

impl FromStr for DirectoryMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "stub" => Ok(Self::Stub),
            other => Err(format!("unknown directory mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub mode: DirectoryMode,
    pub snapshot_path: PathBuf,
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

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_directory_overrides(&args.directory),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    public: RawPublicSettings,
    cache: RawCacheSettings,
    directory: RawDirectorySettings,
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
        if let Some(url) = overrides.public_base_url.as_ref() {
            self.public.base_url = Some(url.clone());
        }
        if !overrides.public_allowed_hosts.is_empty() {
            self.public.allowed_hosts =
                Some(HostList::Many(overrides.public_allowed_hosts.clone()));
        }
        if let Some(path) = overrides.spa_entry_path.as_ref() {
            self.public.spa_entry_path = Some(path.clone());
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }

        self.apply_directory_overrides(&overrides.directory);
    }

    fn apply_directory_overrides(&mut self, overrides: &DirectoryOverrides) {
        if let Some(mode) = overrides.directory_mode.as_ref() {
            self.directory.mode = Some(mode.clone());
        }
        if let Some(path) = overrides.snapshot_path.as_ref() {
            self.directory.snapshot_path = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            public,
            cache,
            directory,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let public = build_public_settings(public)?;
        let cache = build_cache_settings(cache)?;
        let directory = build_directory_settings(directory)?;

        Ok(Self {
            server,
            logging,
            public,
            cache,
            directory,
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

fn build_public_settings(public: RawPublicSettings) -> Result<PublicSettings, LoadError> {
    let base_url = non_blank(public.base_url)
        .map(|url| validate_origin(&url, "public.base_url"))
        .transpose()?;
    let spa_origin = non_blank(public.spa_origin)
        .map(|url| validate_origin(&url, "public.spa_origin"))
        .transpose()?;
    let allowed_hosts = public
        .allowed_hosts
        .map(HostList::into_hosts)
        .unwrap_or_default()
        .iter()
        .filter(|host| !host.trim().is_empty())
        .map(|host| validate_host(host))
        .collect::<Result<Vec<_>, _>>()?;

    let spa_entry_path = non_blank(public.spa_entry_path);
    let spa_root_id =
        non_blank(public.spa_root_id).unwrap_or_else(|| DEFAULT_SPA_ROOT_ID.to_string());

    let timeout_ms = public
        .spa_fetch_timeout_ms
        .unwrap_or(DEFAULT_SPA_FETCH_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(LoadError::invalid(
            "public.spa_fetch_timeout_ms",
            "must be greater than zero",
        ));
    }

    let ttl_secs = public
        .spa_entry_ttl_seconds
        .unwrap_or(DEFAULT_SPA_ENTRY_TTL_SECS);

    Ok(PublicSettings {
        base_url,
        allowed_hosts,
        spa_entry_path,
        spa_root_id,
        spa_origin,
        spa_fetch_timeout: Duration::from_millis(timeout_ms),
        spa_entry_ttl: Duration::from_secs(ttl_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    if cache.redis_port == Some(0) {
        return Err(LoadError::invalid(
            "cache.redis_port",
            "port must be greater than zero",
        ));
    }

    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }

    let memory_limit = cache.memory_limit.unwrap_or(DEFAULT_CACHE_MEMORY_LIMIT);
    if memory_limit == 0 {
        return Err(LoadError::invalid(
            "cache.memory_limit",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        redis_url: non_blank(cache.redis_url),
        redis_host: non_blank(cache.redis_host),
        redis_port: cache.redis_port,
        redis_password: non_blank(cache.redis_password),
        connect_timeout_ms: cache
            .connect_timeout_ms
            .unwrap_or(DEFAULT_CACHE_CONNECT_TIMEOUT_MS),
        ttl_seconds,
        memory_limit,
    })
}

fn build_directory_settings(
    directory: RawDirectorySettings,
) -> Result<DirectorySettings, LoadError> {
    let mode = match non_blank(directory.mode) {
        Some(mode) => DirectoryMode::from_str(&mode)
            .map_err(|reason| LoadError::invalid("directory.mode", reason))?,
        None => DirectoryMode::Snapshot,
    };

    let snapshot_path = directory
        .snapshot_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));
    if snapshot_path.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "directory.snapshot_path",
            "path must not be empty",
        ));
    }

    Ok(DirectorySettings {
        mode,
        snapshot_path,
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
struct RawPublicSettings {
    base_url: Option<String>,
    allowed_hosts: Option<HostList>,
    spa_entry_path: Option<String>,
    spa_root_id: Option<String>,
    spa_origin: Option<String>,
    spa_fetch_timeout_ms: Option<u64>,
    spa_entry_ttl_seconds: Option<u64>,
}

/// A TOML array, or one comma-separated string as environment variables give.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum HostList {
    Many(Vec<String>),
    One(String),
}

impl HostList {
    fn into_hosts(self) -> Vec<String> {
        match self {
            Self::Many(hosts) => hosts,
            Self::One(joined) => joined.split(',').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    redis_url: Option<String>,
    redis_host: Option<String>,
    redis_port: Option<u16>,
    redis_password: Option<String>,
    connect_timeout_ms: Option<u64>,
    ttl_seconds: Option<u64>,
    memory_limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDirectorySettings {
    mode: Option<String>,
    snapshot_path: Option<PathBuf>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Accept absolute http(s) origins and drop any trailing slash.
fn validate_origin(value: &str, key: &'static str) -> Result<String, LoadError> {
    let parsed = url::Url::parse(value)
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{value}`: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LoadError::invalid(key, "scheme must be http or https"));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Accept a bare `host` or `host:port` and lowercase it.
fn validate_host(value: &str) -> Result<String, LoadError> {
    let host = value.trim().to_ascii_lowercase();
    let parsed = url::Url::parse(&format!("http://{host}")).map_err(|err| {
        LoadError::invalid("public.allowed_hosts", format!("invalid host `{value}`: {err}"))
    })?;
    let bare = parsed.path() == "/" && parsed.query().is_none() && parsed.fragment().is_none();
    if !bare || !parsed.username().is_empty() {
        return Err(LoadError::invalid(
            "public.allowed_hosts",
            format!("`{value}` is not a host name"),
        ));
    }
    Ok(host)
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
