//! Platform address resolution used as the resolver's fallback.

use std::io;
use std::net::IpAddr;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Resolves a host through the operating system.
pub trait PlatformLookup: Send + Sync {
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>>;
}

/// `getaddrinfo` via `tokio::net::lookup_host`. IP literals resolve to themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl PlatformLookup for SystemLookup {
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        async move {
            let addrs = tokio::net::lookup_host((host, 0)).await?;
            Ok(addrs.map(|addr| addr.ip()).collect())
        }
        .boxed()
    }
}
