//! Connection pool management.
//!
//! The pool couples a `reqwest` transport (which keeps the idle connections)
//! with explicit lease accounting:
//! - `http` routes use plain sockets, `https` routes the resolved TLS factory
//! - at most `max_per_route` leases per route and `max_total` overall
//! - idle sockets get TCP keepalive checks after `validate_after_inactivity`
//! - address lookups can go through the [`NonCachingResolver`]
//!
//! Pooled sockets are released when the last handle to the pool is dropped.

mod connection_config;
mod limits;
mod route;

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;
use url::Url;

use crate::config::ConnectionPoolSettings;
use crate::dns::NonCachingResolver;
use crate::error_handling::RequestError;

// Re-export public API
pub use connection_config::{Charset, CodingErrorAction, ConnectionConfig};
pub use limits::{PoolLease, PoolStats};
pub use route::{Route, SocketFactory, SocketFactoryRegistry};

use limits::PoolLimits;

/// A pooled, capped connection manager shared by every clone of a client.
#[derive(Debug)]
pub struct ConnectionPool {
    transport: reqwest::Client,
    registry: SocketFactoryRegistry,
    limits: PoolLimits,
    settings: ConnectionPoolSettings,
    connection_request_timeout: Duration,
}

impl ConnectionPool {
    /// Starts a transport builder carrying the pool-level policy: the TLS
    /// registration, idle connection reuse, staleness probing and (optionally)
    /// the non-caching resolver.
    pub fn transport_builder(
        settings: &ConnectionPoolSettings,
        registry: &SocketFactoryRegistry,
        resolver: Option<NonCachingResolver>,
    ) -> ClientBuilder {
        let idle_per_route = if settings.keep_alive {
            settings.max_per_route
        } else {
            0
        };

        let mut builder = reqwest::Client::builder()
            .use_preconfigured_tls(registry.tls().client_config().clone())
            .pool_max_idle_per_host(idle_per_route)
            .tcp_keepalive(settings.validate_after_inactivity);

        if let Some(resolver) = resolver {
            builder = builder.dns_resolver(Arc::new(resolver));
        }
        builder
    }

    pub fn new(
        transport: reqwest::Client,
        registry: SocketFactoryRegistry,
        settings: ConnectionPoolSettings,
        connection_request_timeout: Duration,
    ) -> Self {
        let limits = PoolLimits::new(settings.max_per_route, settings.max_total);
        Self {
            transport,
            registry,
            limits,
            settings,
            connection_request_timeout,
        }
    }

    /// Leases a slot for the route of `url`.
    ///
    /// # Errors
    ///
    /// - `RequestError::UnsupportedScheme` / `MissingHost` if the URL has no route
    /// - `RequestError::PoolTimeout` if no slot freed up within the
    ///   connection request timeout
    pub async fn lease(&self, url: &Url) -> Result<PoolLease, RequestError> {
        let route = self.registry.route_for(url)?;
        self.acquire(&route).await
    }

    /// Leases a slot for an explicit route.
    pub async fn acquire(&self, route: &Route) -> Result<PoolLease, RequestError> {
        self.limits
            .acquire(route, self.connection_request_timeout)
            .await
    }

    pub fn stats(&self) -> PoolStats {
        self.limits.stats()
    }

    pub fn settings(&self) -> &ConnectionPoolSettings {
        &self.settings
    }

    pub fn registry(&self) -> &SocketFactoryRegistry {
        &self.registry
    }

    pub(crate) fn transport(&self) -> &reqwest::Client {
        &self.transport
    }
}
