//! Command-line options of the `resilient_http` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::client::{HttpClientFactory, ProxyHost};
use crate::config::constants::{
    DEFAULT_CONNECTION_REQUEST_TIMEOUT, DEFAULT_MAX_PER_ROUTE, DEFAULT_MAX_TOTAL,
};
use crate::config::{ClientConfiguration, LogFormat, LogLevel, RequestPolicy};
use crate::dns::NonCachingResolver;
use crate::tls::TrustStoreFile;

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Fetch through the default client
/// resilient_http get https://example.com/
///
/// # Resolve through the non-caching resolver and honour environment overrides
/// resilient_http get https://example.com/ --custom-dns --use-system-properties
///
/// # Inspect the resolver on its own
/// resilient_http resolve www.example.com
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "resilient_http",
    about = "Outbound HTTP client with TLS fallback, capped pooling and non-caching DNS."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a URL and print status, headers and body
    Get(GetArgs),
    /// Resolve a host name without caching
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// URL to fetch
    pub url: String,

    /// Let SSL_CERT_FILE, HTTP_KEEP_ALIVE, HTTP_MAX_CONNECTIONS, HTTP_AGENT
    /// and the proxy variables override the configuration
    #[arg(long)]
    pub use_system_properties: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_PER_ROUTE)]
    pub max_per_route: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_TOTAL)]
    pub max_total: usize,

    /// Milliseconds to wait for a free pool slot
    #[arg(long, default_value_t = DEFAULT_CONNECTION_REQUEST_TIMEOUT.as_millis() as u64)]
    pub connection_request_timeout_ms: u64,

    /// Proxy as scheme://host:port or host:port
    #[arg(long, value_parser = parse_proxy)]
    pub proxy: Option<ProxyHost>,

    /// Resolve host names with the non-caching resolver
    #[arg(long)]
    pub custom_dns: bool,

    /// PEM bundle used as the custom TLS trust store
    #[arg(long)]
    pub ca_file: Option<PathBuf>,

    /// User-Agent header value
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Do not follow redirects
    #[arg(long)]
    pub no_redirects: bool,

    /// Print only the status line and headers
    #[arg(long)]
    pub head_only: bool,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Host name to resolve
    pub host: String,

    /// Maximum CNAME chain length to follow
    #[arg(long)]
    pub max_cname_depth: Option<usize>,
}

fn parse_proxy(value: &str) -> Result<ProxyHost, String> {
    ProxyHost::parse(value).map_err(|e| e.to_string())
}

impl GetArgs {
    pub fn to_configuration(&self) -> ClientConfiguration {
        let request = RequestPolicy {
            redirects_enabled: !self.no_redirects,
            connection_request_timeout: Duration::from_millis(self.connection_request_timeout_ms),
            ..RequestPolicy::default()
        };

        let mut config = ClientConfiguration::default()
            .with_use_system_properties(self.use_system_properties)
            .with_max_per_route(self.max_per_route)
            .with_max_total(self.max_total)
            .with_request_policy(request);
        if let Some(proxy) = &self.proxy {
            config = config.with_proxy(proxy.clone());
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }

    /// Builds the factory. An unreadable `--ca-file` is not fatal: the
    /// platform trust tiers take over.
    pub fn to_factory(&self) -> HttpClientFactory {
        let mut factory = HttpClientFactory::new(self.to_configuration());
        if let Some(path) = &self.ca_file {
            factory = factory.with_tls_context_supplier(TrustStoreFile::new(path.clone()));
        }
        if self.custom_dns {
            factory = factory.with_dns_resolver(NonCachingResolver::new());
        }
        factory
    }
}

impl ResolveArgs {
    pub fn to_resolver(&self) -> NonCachingResolver {
        let resolver = NonCachingResolver::new();
        match self.max_cname_depth {
            Some(depth) => resolver.with_max_cname_depth(depth),
            None => resolver,
        }
    }
}
