use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use snip_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "SNIP_GATEWAY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "SNIP_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SNIP_GATEWAY_MYSQL_DSN";
pub const CODE_LENGTH_ENV: &str = "SNIP_GATEWAY_CODE_LENGTH";
pub const MAX_ATTEMPTS_ENV: &str = "SNIP_GATEWAY_MAX_ATTEMPTS";
pub const FETCH_TIMEOUT_ENV: &str = "SNIP_GATEWAY_FETCH_TIMEOUT_SECS";
pub const CORS_ORIGINS_ENV: &str = "SNIP_GATEWAY_CORS_ALLOW_ORIGINS";
pub const LOG_FORMAT_ENV: &str = "SNIP_GATEWAY_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CODE_LENGTH: &str = "6";
pub const DEFAULT_MAX_ATTEMPTS: &str = "16";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "snip-gateway", about = "URL shortener HTTP server")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Length of generated short codes.
    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value = DEFAULT_CODE_LENGTH,
        value_parser = clap::value_parser!(u16).range(3..=32)
    )]
    pub code_length: u16,

    /// Generated codes tried per request before giving up.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    /// Timeout for the title/favicon fetch. Unset means the HTTP client default.
    #[arg(long, env = FETCH_TIMEOUT_ENV)]
    pub fetch_timeout_secs: Option<u64>,

    /// Allowed CORS origins. Any origin is allowed when none are given.
    #[arg(long = "cors-allow-origin", env = CORS_ORIGINS_ENV, value_delimiter = ',')]
    pub cors_allow_origins: Vec<HeaderValue>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}
