//! Protocol-level DNS queries with caching disabled.

use std::net::IpAddr;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::{Name, RecordType};
use hickory_resolver::TokioAsyncResolver;

use crate::dns::DnsRecord;
use crate::error_handling::QueryError;

/// A single DNS query for a host, returning the records owned by that name.
///
/// An empty vector means the name exists but has no records of the queried
/// type (or does not exist at all); failures are reported as [`QueryError`].
pub trait DnsQuery: Send + Sync {
    fn query<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<DnsRecord>, QueryError>>;
}

/// Queries through `hickory-resolver` with its record cache turned off.
pub struct HickoryQuery {
    resolver: TokioAsyncResolver,
    record_type: RecordType,
}

impl HickoryQuery {
    /// Uses the system resolver configuration, or the hickory defaults if it
    /// cannot be read. Queries are of type `ANY`.
    pub fn new() -> Self {
        let (config, opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(system) => system,
            Err(e) => {
                log::warn!("Failed to read system DNS configuration, using defaults: {e}");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self::with_config(config, opts)
    }

    /// Uses an explicit configuration. Caching is disabled regardless of `opts`.
    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts) -> Self {
        opts.cache_size = 0;
        opts.timeout = Duration::from_secs(crate::config::DNS_TIMEOUT_SECS);
        opts.attempts = 2;
        // Set ndots to 0 to prevent search domain appending
        opts.ndots = 0;
        opts.preserve_intermediates = true;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            record_type: RecordType::ANY,
        }
    }

    /// Changes the queried record type (`ANY` by default).
    pub fn with_record_type(self, record_type: RecordType) -> Self {
        Self {
            record_type,
            ..self
        }
    }
}

impl Default for HickoryQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a host into a DNS name.
///
/// # Errors
///
/// Returns `QueryError::Parse` for IP literals and malformed names.
pub fn parse_host(host: &str) -> Result<Name, QueryError> {
    if host.parse::<IpAddr>().is_ok() {
        return Err(QueryError::Parse {
            host: host.to_string(),
            reason: "IP address literal".to_string(),
        });
    }
    Name::from_utf8(host).map_err(|e| QueryError::Parse {
        host: host.to_string(),
        reason: e.to_string(),
    })
}

fn same_owner(queried: &Name, owner: &Name) -> bool {
    queried.num_labels() == owner.num_labels() && queried.zone_of(owner)
}

impl DnsQuery for HickoryQuery {
    fn query<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<DnsRecord>, QueryError>> {
        async move {
            let name = parse_host(host)?;
            match self.resolver.lookup(name.clone(), self.record_type).await {
                Ok(lookup) => {
                    // hickory may chase aliases itself; keep only what the queried name owns
                    let records = lookup
                        .records()
                        .iter()
                        .filter(|record| same_owner(&name, record.name()))
                        .filter_map(|record| record.data())
                        .map(DnsRecord::from_rdata)
                        .collect();
                    Ok(records)
                }
                Err(e) => match e.kind() {
                    ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                    _ => Err(QueryError::Failed {
                        host: host.to_string(),
                        reason: e.to_string(),
                    }),
                },
            }
        }
        .boxed()
    }
}
