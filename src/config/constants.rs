//! Configuration constants.
//!
//! This module defines the defaults used by the client factory, the connection
//! pool and the DNS resolver. Every value here can be overridden through
//! [`ClientConfiguration`](crate::config::ClientConfiguration).

use std::time::Duration;

// Connection pool
/// Maximum pooled connections per route (scheme, host, port)
pub const DEFAULT_MAX_PER_ROUTE: usize = 100;
/// Maximum pooled connections across all routes
pub const DEFAULT_MAX_TOTAL: usize = 200;
/// Inactivity interval after which a pooled connection is checked before reuse
pub const DEFAULT_VALIDATE_AFTER_INACTIVITY: Duration = Duration::from_millis(1000);

// Request policy
/// Maximum time of inactivity between two data packets
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_millis(10_000);
/// TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Maximum time to wait for a free slot in the connection pool
pub const DEFAULT_CONNECTION_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Maximum number of redirect hops to follow
pub const DEFAULT_MAX_REDIRECTS: usize = 50;

// DNS resolution
/// Maximum depth of CNAME indirection followed by the non-caching resolver
pub const DEFAULT_MAX_CNAME_DEPTH: usize = 16;
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;

// System property overrides (only read when `use_system_properties` is enabled)
/// PEM bundle used as trust store
pub const ENV_SSL_CERT_FILE: &str = "SSL_CERT_FILE";
/// `true`/`false`: reuse idle connections
pub const ENV_HTTP_KEEP_ALIVE: &str = "HTTP_KEEP_ALIVE";
/// Per-route connection cap; the total cap becomes twice this value
pub const ENV_HTTP_MAX_CONNECTIONS: &str = "HTTP_MAX_CONNECTIONS";
/// User-Agent header value
pub const ENV_HTTP_AGENT: &str = "HTTP_AGENT";
