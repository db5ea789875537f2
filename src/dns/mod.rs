//! Non-caching DNS resolution.
//!
//! This module provides a resolver that defeats resolver-level caching:
//! - one `ANY` query per call through `hickory-resolver` with `cache_size = 0`
//! - CNAME records are resolved recursively, in record order
//! - platform resolution (`getaddrinfo`) when the query yields nothing
//!
//! The query and the platform fallback sit behind the [`DnsQuery`] and
//! [`PlatformLookup`] traits.

mod platform;
mod query;
mod records;
mod resolution;

// Re-export public API
pub use platform::{PlatformLookup, SystemLookup};
pub use query::{parse_host, DnsQuery, HickoryQuery};
pub use records::{DnsRecord, ResolvedAddresses};
pub use resolution::NonCachingResolver;

#[cfg(test)]
mod tests;
