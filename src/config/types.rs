//! Configuration types.
//!
//! This module defines the immutable configuration values consumed by the client
//! factory, plus the logging enums shared with the CLI.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_CONNECTION_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_PER_ROUTE,
    DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_TOTAL, DEFAULT_SOCKET_TIMEOUT,
    DEFAULT_VALIDATE_AFTER_INACTIVITY,
};
use crate::client::ProxyHost;
use crate::pool::ConnectionConfig;
use crate::tls::TlsContext;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Cookie handling policy applied to every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CookieSpec {
    /// Store cookies from responses and send them back on matching requests
    #[default]
    Default,
    /// Never send or store cookies
    Ignore,
}

/// Sizing and staleness policy of the connection pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoolSettings {
    /// Maximum leased connections per route
    pub max_per_route: usize,
    /// Maximum leased connections across all routes
    pub max_total: usize,
    /// Idle time after which a pooled connection is validated before reuse
    pub validate_after_inactivity: Duration,
    /// Whether idle connections are kept for reuse at all
    pub keep_alive: bool,
    /// Charset and decoding policy for response bodies
    pub connection_config: ConnectionConfig,
}

impl Default for ConnectionPoolSettings {
    fn default() -> Self {
        Self {
            max_per_route: DEFAULT_MAX_PER_ROUTE,
            max_total: DEFAULT_MAX_TOTAL,
            validate_after_inactivity: DEFAULT_VALIDATE_AFTER_INACTIVITY,
            keep_alive: true,
            connection_config: ConnectionConfig::default(),
        }
    }
}

/// Per-request timeout, redirect and cookie policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPolicy {
    pub cookie_spec: CookieSpec,
    /// Maximum inactivity between two consecutive reads
    pub socket_timeout: Duration,
    pub connect_timeout: Duration,
    /// Maximum wait for a pool slot before the request fails
    pub connection_request_timeout: Duration,
    pub circular_redirects_allowed: bool,
    pub redirects_enabled: bool,
    pub max_redirects: usize,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            cookie_spec: CookieSpec::Default,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            connection_request_timeout: DEFAULT_CONNECTION_REQUEST_TIMEOUT,
            circular_redirects_allowed: false,
            redirects_enabled: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Configuration of an [`HttpClientFactory`](crate::HttpClientFactory).
///
/// The value is immutable once handed to the factory. The `with_*` methods
/// consume the configuration and return an updated copy, so a configuration can
/// be assembled fluently and then frozen:
///
/// ```
/// use resilient_http::ClientConfiguration;
///
/// let config = ClientConfiguration::default()
///     .with_use_system_properties(true)
///     .with_max_total(50);
/// assert_eq!(config.pool.max_total, 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfiguration {
    /// Let environment variables override trust store, proxy, keep-alive,
    /// connection limits and user agent
    pub use_system_properties: bool,
    /// Seeds the custom TLS tier of the socket factory resolver
    pub default_tls_context: Option<TlsContext>,
    pub pool: ConnectionPoolSettings,
    pub request: RequestPolicy,
    /// Explicit proxy; `None` means direct connections
    pub proxy: Option<ProxyHost>,
    pub user_agent: Option<String>,
}

impl ClientConfiguration {
    pub fn with_use_system_properties(self, use_system_properties: bool) -> Self {
        Self {
            use_system_properties,
            ..self
        }
    }

    pub fn with_default_tls_context(self, context: TlsContext) -> Self {
        Self {
            default_tls_context: Some(context),
            ..self
        }
    }

    pub fn with_max_per_route(mut self, max_per_route: usize) -> Self {
        self.pool.max_per_route = max_per_route;
        self
    }

    pub fn with_max_total(mut self, max_total: usize) -> Self {
        self.pool.max_total = max_total;
        self
    }

    pub fn with_validate_after_inactivity(mut self, interval: Duration) -> Self {
        self.pool.validate_after_inactivity = interval;
        self
    }

    pub fn with_request_policy(self, request: RequestPolicy) -> Self {
        Self { request, ..self }
    }

    pub fn with_proxy(self, proxy: ProxyHost) -> Self {
        Self {
            proxy: Some(proxy),
            ..self
        }
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: Some(user_agent.into()),
            ..self
        }
    }
}
