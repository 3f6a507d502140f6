use clap::{Parser, ValueEnum};
use footfall_ledger::{DEFAULT_IP_API_URL, DEFAULT_MAX_RECORDS};
use footfall_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

pub const LISTEN_ADDR_ENV: &str = "FOOTFALL_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "FOOTFALL_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "FOOTFALL_REDIS_URL";
pub const REDIS_PREFIX_ENV: &str = "FOOTFALL_REDIS_PREFIX";
pub const MAX_RECORDS_ENV: &str = "FOOTFALL_MAX_RECORDS";
pub const CACHE_TTL_ENV: &str = "FOOTFALL_CACHE_TTL_SECS";
pub const IP_API_URL_ENV: &str = "FOOTFALL_IP_API_URL";
pub const IP_API_TIMEOUT_ENV: &str = "FOOTFALL_IP_API_TIMEOUT_MS";
pub const WRITINGS_DIR_ENV: &str = "FOOTFALL_WRITINGS_DIR";
pub const DEV_MODE_ENV: &str = "FOOTFALL_DEV_MODE";
pub const LOG_LEVEL_ENV: &str = "FOOTFALL_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "FOOTFALL_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "FOOTFALL_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REDIS_PREFIX: &str = "ff:";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_IP_API_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_WRITINGS_DIR: &str = "writings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "footfall-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_PREFIX_ENV, default_value = DEFAULT_REDIS_PREFIX)]
    pub redis_prefix: String,

    #[arg(long, env = MAX_RECORDS_ENV, default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,

    /// Lifetime in seconds of the cached visitor list; 0 disables the cache.
    #[arg(long, env = CACHE_TTL_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = IP_API_URL_ENV, default_value = DEFAULT_IP_API_URL)]
    pub ip_api_url: String,

    #[arg(long, env = IP_API_TIMEOUT_ENV, default_value_t = DEFAULT_IP_API_TIMEOUT_MS)]
    pub ip_api_timeout_ms: u64,

    #[arg(long, env = WRITINGS_DIR_ENV, default_value = DEFAULT_WRITINGS_DIR)]
    pub writings_dir: PathBuf,

    /// Answer tracking requests without touching storage or the network.
    #[arg(long, env = DEV_MODE_ENV)]
    pub dev_mode: bool,

    #[arg(long, env = LOG_LEVEL_ENV, default_value_t = Level::INFO)]
    pub log_level: Level,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
