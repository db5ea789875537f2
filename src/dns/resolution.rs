//! Recursive, non-caching hostname resolution.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, error, info, warn};
use reqwest::dns::{Addrs, Name as TransportName, Resolve, Resolving};

use crate::config::DEFAULT_MAX_CNAME_DEPTH;
use crate::dns::{DnsQuery, DnsRecord, HickoryQuery, PlatformLookup, ResolvedAddresses, SystemLookup};
use crate::error_handling::{QueryError, ResolveError};

/// Resolves hostnames by direct DNS query, bypassing every resolver cache.
///
/// Each call issues a fresh query. CNAME records are followed recursively and
/// their addresses appended in record order, duplicates included. When the
/// query yields no records at all (IP literals, parse failures, empty answers)
/// the platform resolver answers instead.
///
/// The resolver is a plain value: clone it wherever it is needed, or hand it
/// to the connection pool, which uses it through [`reqwest::dns::Resolve`].
#[derive(Clone)]
pub struct NonCachingResolver {
    query: Arc<dyn DnsQuery>,
    platform: Arc<dyn PlatformLookup>,
    max_cname_depth: usize,
}

impl NonCachingResolver {
    /// Creates a resolver querying through hickory with the system configuration.
    pub fn new() -> Self {
        Self::with_backends(Arc::new(HickoryQuery::new()), Arc::new(SystemLookup))
    }

    pub fn with_backends(query: Arc<dyn DnsQuery>, platform: Arc<dyn PlatformLookup>) -> Self {
        Self {
            query,
            platform,
            max_cname_depth: DEFAULT_MAX_CNAME_DEPTH,
        }
    }

    /// Limits how many CNAME hops are followed before giving up.
    pub fn with_max_cname_depth(self, max_cname_depth: usize) -> Self {
        Self {
            max_cname_depth,
            ..self
        }
    }

    pub fn max_cname_depth(&self) -> usize {
        self.max_cname_depth
    }

    /// Resolves `host` to its addresses.
    ///
    /// # Errors
    ///
    /// - `ResolveError::UnknownHost` if the platform fallback fails
    /// - `ResolveError::CnameDepthExceeded` if aliases nest deeper than the limit
    pub async fn resolve(&self, host: &str) -> Result<ResolvedAddresses, ResolveError> {
        debug!("DNS resolving host '{host}'");
        let addrs = self.resolve_at_depth(host.to_string(), 0).await?;
        debug!("Return: {addrs:?}");
        Ok(ResolvedAddresses::from(addrs))
    }

    fn resolve_at_depth(
        &self,
        host: String,
        depth: usize,
    ) -> BoxFuture<'_, Result<Vec<IpAddr>, ResolveError>> {
        async move {
            let records = self.query_records(&host).await;
            if records.is_empty() {
                // E.g. for IP addresses - use system resolution
                return self.platform_lookup(&host).await;
            }

            let mut addrs = Vec::new();
            for record in records {
                match record {
                    DnsRecord::Cname(alias) => {
                        if depth >= self.max_cname_depth {
                            warn!("Giving up on '{host}' after {depth} CNAME hops");
                            return Err(ResolveError::CnameDepthExceeded {
                                host,
                                max_depth: self.max_cname_depth,
                            });
                        }
                        debug!("'{host}' is an alias for '{alias}'");
                        let nested = self.resolve_at_depth(alias, depth + 1).await?;
                        addrs.extend(nested);
                    }
                    DnsRecord::A(addr) => addrs.push(IpAddr::V4(addr)),
                    DnsRecord::Other(record_type) => {
                        info!("Unknown record type found for '{host}': {record_type}");
                    }
                }
            }
            Ok(addrs)
        }
        .boxed()
    }

    async fn query_records(&self, host: &str) -> Vec<DnsRecord> {
        if host.parse::<IpAddr>().is_ok() {
            return Vec::new();
        }
        match self.query.query(host).await {
            Ok(records) => records,
            Err(e @ QueryError::Parse { .. }) => {
                error!("{e}");
                Vec::new()
            }
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        }
    }

    async fn platform_lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        self.platform
            .lookup(host)
            .await
            .map_err(|source| ResolveError::UnknownHost {
                host: host.to_string(),
                source,
            })
    }
}

impl Default for NonCachingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NonCachingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonCachingResolver")
            .field("max_cname_depth", &self.max_cname_depth)
            .finish_non_exhaustive()
    }
}

impl Resolve for NonCachingResolver {
    fn resolve(&self, name: TransportName) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs = NonCachingResolver::resolve(&resolver, name.as_str())
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?;
            let addrs: Addrs = Box::new(addrs.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}
