//! Backend connection configuration loaded from environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use cachet_core::CacheError;
use thiserror::Error;

const DEFAULT_CLIENT_NAME: &str = "cache-service";

/// How the backing store is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// One node, one multiplexed connection.
    #[default]
    Standalone,
    /// Sharded cluster; commands are routed by key slot.
    Cluster,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Standalone => "standalone",
            Topology::Cluster => "cluster",
        }
    }
}

impl FromStr for Topology {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standalone" | "single" => Ok(Topology::Standalone),
            "cluster" | "clustered" => Ok(Topology::Cluster),
            other => Err(ConfigError::InvalidTopology(other.to_string())),
        }
    }
}

/// Problems found while reading or checking the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("VALKEY_PASSWORD is required")]
    MissingPassword,

    #[error("backend host cannot be empty")]
    MissingHost,

    #[error("backend port cannot be 0")]
    InvalidPort,

    #[error("unknown topology mode '{0}' (expected standalone or cluster)")]
    InvalidTopology(String),

    #[error("{var} has an invalid value '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("VALKEY_TLS_INSECURE requires VALKEY_TLS=true")]
    InsecureWithoutTls,
}

impl From<ConfigError> for CacheError {
    fn from(err: ConfigError) -> Self {
        CacheError::Configuration(err.to_string())
    }
}

/// Everything needed to open a connection to the backing store.
///
/// Immutable once the repository is opened.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// ACL user; `None` authenticates as the default user.
    pub username: Option<String>,
    pub password: String,
    pub topology: Topology,
    /// Connect over TLS (rustls, TLS 1.2 or newer).
    pub use_tls: bool,
    /// Skip certificate chain validation. Only for self-signed internal
    /// deployments; never enabled unless explicitly configured.
    pub tls_insecure: bool,
    /// Sent as CLIENT SETNAME right after connecting, in both topologies.
    /// A standalone connection that later reconnects on its own comes back
    /// unnamed; the name labels the initial connection only.
    pub client_name: Option<String>,
    /// Upper bound for every backend call.
    pub request_timeout: Duration,
    /// Upper bound for establishing the connection.
    pub connect_timeout: Duration,
    /// Deadline for the PING issued right after connecting.
    pub probe_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: String::new(),
            topology: Topology::Standalone,
            use_tls: false,
            tls_insecure: false,
            client_name: Some(DEFAULT_CLIENT_NAME.to_string()),
            request_timeout: Duration::from_millis(5000),
            connect_timeout: Duration::from_millis(5000),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

// The password never reaches the logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("topology", &self.topology)
            .field("use_tls", &self.use_tls)
            .field("tls_insecure", &self.tls_insecure)
            .field("client_name", &self.client_name)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl ConnectionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let topology = match var("VALKEY_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.topology,
        };

        Ok(Self {
            host: var("VALKEY_HOST").unwrap_or(defaults.host),
            port: parse_var(&var, "VALKEY_PORT")?.unwrap_or(defaults.port),
            username: var("VALKEY_USERNAME"),
            password: var("VALKEY_PASSWORD").unwrap_or_default(),
            topology,
            use_tls: parse_flag(&var, "VALKEY_TLS")?.unwrap_or(false),
            tls_insecure: parse_flag(&var, "VALKEY_TLS_INSECURE")?.unwrap_or(false),
            client_name: var("VALKEY_CLIENT_NAME").or(defaults.client_name),
            request_timeout: parse_var(&var, "VALKEY_REQUEST_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            connect_timeout: parse_var(&var, "VALKEY_CONNECT_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            probe_timeout: parse_var(&var, "VALKEY_PROBE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.probe_timeout),
        })
    }

    /// Check the invariants that must hold before any connection attempt.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.tls_insecure && !self.use_tls {
            return Err(ConfigError::InsecureWithoutTls);
        }
        for (name, value) in [
            ("VALKEY_REQUEST_TIMEOUT_MS", self.request_timeout),
            ("VALKEY_CONNECT_TIMEOUT_MS", self.connect_timeout),
            ("VALKEY_PROBE_TIMEOUT_MS", self.probe_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }
        Ok(())
    }

    /// `host:port` for logs.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(var: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var: name, value })
        })
        .transpose()
}

fn parse_flag<F>(var: &F, name: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { var: name, value }),
        })
        .transpose()
}
