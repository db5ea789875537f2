//! resilient_http library: outbound HTTP clients that keep working when
//! pieces of their environment do not.
//!
//! A client built by [`HttpClientFactory`] comes with:
//! - a TLS socket factory resolved through fallback tiers (custom context,
//!   platform trust store, bundled roots), so a broken keystore never blocks
//!   client construction
//! - a capped connection pool (100 per route, 200 in total by default)
//! - bounded timeouts, loop-free redirects, cookies and transparent
//!   decompression
//! - optionally, the [`NonCachingResolver`], which re-resolves every host
//!   name and follows CNAME chains itself
//!
//! # Example
//!
//! ```no_run
//! use resilient_http::{ClientConfiguration, HttpClientFactory, NonCachingResolver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfiguration::default().with_use_system_properties(true);
//! let client = HttpClientFactory::new(config)
//!     .with_dns_resolver(NonCachingResolver::new())
//!     .create_http_client()?;
//!
//! let response = client.get("https://example.com/").await?;
//! println!("{} via {}", response.status(), client.tls_tier());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Clients and the resolver need a Tokio runtime.

mod client;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod initialization;
pub mod pool;
pub mod tls;

// Re-export public API
pub use client::{
    redirect_policy, ConfiguredProxy, ConfiguredRequestPolicy, HttpClient, HttpClientFactory,
    Interceptor, PooledRequestBuilder, PooledResponse, ProxyHost, ProxySupplier,
    RequestPolicySupplier, SystemOverrides, ACCEPT_ENCODING_VALUE,
};
pub use config::{
    Cli, ClientConfiguration, Command, ConnectionPoolSettings, CookieSpec, GetArgs, LogFormat,
    LogLevel, RequestPolicy, ResolveArgs,
};
pub use dns::{NonCachingResolver, ResolvedAddresses};
pub use error_handling::{ClientBuildError, RequestError, ResolveError, TlsContextError};
pub use tls::{TlsContext, TlsContextSupplier, TlsTier};
