//! DNS module tests.
//!
//! The resolver is exercised against an in-memory zone and a scripted platform
//! lookup, so none of these tests touch the network.

use super::*;
use crate::error_handling::{QueryError, ResolveError};
use futures::future::BoxFuture;
use futures::FutureExt;
use hickory_resolver::proto::rr::RecordType;
use reqwest::dns::Resolve;
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory zone answering queries by exact name.
#[derive(Default)]
struct FakeZone {
    answers: HashMap<String, Result<Vec<DnsRecord>, QueryError>>,
    queries: AtomicUsize,
}

impl FakeZone {
    fn with(mut self, host: &str, records: Vec<DnsRecord>) -> Self {
        self.answers.insert(host.to_string(), Ok(records));
        self
    }

    fn failing(mut self, host: &str, error: QueryError) -> Self {
        self.answers.insert(host.to_string(), Err(error));
        self
    }
}

impl DnsQuery for FakeZone {
    fn query<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Vec<DnsRecord>, QueryError>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let answer = self.answers.get(host).cloned().unwrap_or(Ok(Vec::new()));
        async move { answer }.boxed()
    }
}

/// Platform lookup with fixed answers; unknown hosts fail like getaddrinfo.
#[derive(Default)]
struct FakePlatform {
    hosts: HashMap<String, Vec<IpAddr>>,
    lookups: AtomicUsize,
}

impl FakePlatform {
    fn with(mut self, host: &str, addrs: Vec<IpAddr>) -> Self {
        self.hosts.insert(host.to_string(), addrs);
        self
    }
}

impl PlatformLookup for FakePlatform {
    fn lookup<'a>(&'a self, host: &'a str) -> BoxFuture<'a, io::Result<Vec<IpAddr>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let answer = match self.hosts.get(host) {
            Some(addrs) => Ok(addrs.clone()),
            None => match IpAddr::from_str(host) {
                Ok(ip) => Ok(vec![ip]),
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("failed to lookup address information for {host}"),
                )),
            },
        };
        async move { answer }.boxed()
    }
}

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

fn a(a0: u8, a1: u8, a2: u8, a3: u8) -> DnsRecord {
    DnsRecord::A(Ipv4Addr::new(a0, a1, a2, a3))
}

fn cname(alias: &str) -> DnsRecord {
    DnsRecord::Cname(alias.to_string())
}

fn resolver(zone: FakeZone, platform: FakePlatform) -> (NonCachingResolver, Arc<FakeZone>, Arc<FakePlatform>) {
    let zone = Arc::new(zone);
    let platform = Arc::new(platform);
    let resolver = NonCachingResolver::with_backends(zone.clone(), platform.clone());
    (resolver, zone, platform)
}

#[tokio::test]
async fn test_a_records_returned_in_record_order() {
    let zone = FakeZone::default().with(
        "multi.example",
        vec![a(192, 0, 2, 3), a(192, 0, 2, 1), a(192, 0, 2, 2)],
    );
    let (resolver, _, platform) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("multi.example").await.unwrap();
    assert_eq!(
        addrs.into_vec(),
        vec![v4(192, 0, 2, 3), v4(192, 0, 2, 1), v4(192, 0, 2, 2)]
    );
    assert_eq!(platform.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cname_chain_is_followed() {
    let zone = FakeZone::default()
        .with("a.example", vec![cname("b.example")])
        .with("b.example", vec![a(203, 0, 113, 7)]);
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("a.example").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(203, 0, 113, 7)]);
}

#[tokio::test]
async fn test_deep_cname_chain_unions_addresses() {
    let zone = FakeZone::default()
        .with("l0.example", vec![a(198, 51, 100, 1), cname("l1.example")])
        .with("l1.example", vec![cname("l2.example"), a(198, 51, 100, 2)])
        .with("l2.example", vec![a(198, 51, 100, 3)]);
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("l0.example").await.unwrap();
    assert_eq!(
        addrs.into_vec(),
        vec![v4(198, 51, 100, 1), v4(198, 51, 100, 3), v4(198, 51, 100, 2)]
    );
}

#[tokio::test]
async fn test_duplicates_across_branches_are_preserved() {
    let zone = FakeZone::default()
        .with("x.example", vec![cname("y.example"), cname("z.example")])
        .with("y.example", vec![a(192, 0, 2, 10)])
        .with("z.example", vec![cname("y.example")]);
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("x.example").await.unwrap();
    assert_eq!(
        addrs.into_vec(),
        vec![v4(192, 0, 2, 10), v4(192, 0, 2, 10)]
    );
}

#[tokio::test]
async fn test_ip_literal_uses_platform_resolution() {
    let (resolver, zone, platform) = resolver(FakeZone::default(), FakePlatform::default());

    let addrs = resolver.resolve("203.0.113.7").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(203, 0, 113, 7)]);
    assert_eq!(zone.queries.load(Ordering::SeqCst), 0);
    assert_eq!(platform.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_records_and_platform_failure_is_lookup_error() {
    let (resolver, _, _) = resolver(FakeZone::default(), FakePlatform::default());

    let result = resolver.resolve("nothing.invalid").await;
    match result {
        Err(ResolveError::UnknownHost { host, .. }) => assert_eq!(host, "nothing.invalid"),
        other => panic!("expected UnknownHost, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_records_falls_back_to_platform() {
    let platform = FakePlatform::default().with("intranet", vec![v4(10, 0, 0, 5)]);
    let (resolver, zone, _) = resolver(FakeZone::default(), platform);

    let addrs = resolver.resolve("intranet").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(10, 0, 0, 5)]);
    assert_eq!(zone.queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_error_falls_back_to_platform() {
    let zone = FakeZone::default().failing(
        "bad_host",
        QueryError::Parse {
            host: "bad_host".to_string(),
            reason: "malformed label".to_string(),
        },
    );
    let platform = FakePlatform::default().with("bad_host", vec![v4(127, 0, 0, 1)]);
    let (resolver, _, _) = resolver(zone, platform);

    let addrs = resolver.resolve("bad_host").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(127, 0, 0, 1)]);
}

#[tokio::test]
async fn test_query_failure_falls_back_to_platform() {
    let zone = FakeZone::default().failing(
        "flaky.example",
        QueryError::Failed {
            host: "flaky.example".to_string(),
            reason: "request timed out".to_string(),
        },
    );
    let platform = FakePlatform::default().with("flaky.example", vec![v4(192, 0, 2, 99)]);
    let (resolver, _, _) = resolver(zone, platform);

    let addrs = resolver.resolve("flaky.example").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(192, 0, 2, 99)]);
}

#[tokio::test]
async fn test_only_unknown_record_types_yield_empty_set() {
    let zone = FakeZone::default().with(
        "mail.example",
        vec![
            DnsRecord::Other(RecordType::MX),
            DnsRecord::Other(RecordType::TXT),
        ],
    );
    let (resolver, _, platform) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("mail.example").await.unwrap();
    assert!(addrs.is_empty());
    assert_eq!(platform.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_record_types_are_skipped() {
    let zone = FakeZone::default().with(
        "mixed.example",
        vec![
            DnsRecord::Other(RecordType::AAAA),
            a(192, 0, 2, 7),
            DnsRecord::Other(RecordType::NS),
        ],
    );
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    let addrs = resolver.resolve("mixed.example").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(192, 0, 2, 7)]);
}

#[tokio::test]
async fn test_every_call_queries_again() {
    let zone = FakeZone::default().with("fresh.example", vec![a(192, 0, 2, 1)]);
    let (resolver, zone, _) = resolver(zone, FakePlatform::default());

    resolver.resolve("fresh.example").await.unwrap();
    resolver.resolve("fresh.example").await.unwrap();
    resolver.resolve("fresh.example").await.unwrap();
    assert_eq!(zone.queries.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cname_cycle_hits_depth_limit() {
    let zone = FakeZone::default()
        .with("ping.example", vec![cname("pong.example")])
        .with("pong.example", vec![cname("ping.example")]);
    let (resolver, zone, _) = resolver(zone, FakePlatform::default());
    let resolver = resolver.with_max_cname_depth(4);

    match resolver.resolve("ping.example").await {
        Err(ResolveError::CnameDepthExceeded { max_depth, .. }) => assert_eq!(max_depth, 4),
        other => panic!("expected CnameDepthExceeded, got {other:?}"),
    }
    assert_eq!(zone.queries.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_alias_without_records_uses_platform_for_alias() {
    let zone = FakeZone::default().with("www.example", vec![cname("edge.cdn.example")]);
    let platform = FakePlatform::default().with("edge.cdn.example", vec![v4(192, 0, 2, 50)]);
    let (resolver, _, _) = resolver(zone, platform);

    let addrs = resolver.resolve("www.example").await.unwrap();
    assert_eq!(addrs.into_vec(), vec![v4(192, 0, 2, 50)]);
}

#[tokio::test]
async fn test_alias_lookup_failure_is_surfaced() {
    let zone = FakeZone::default().with("www.example", vec![cname("gone.example")]);
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    match resolver.resolve("www.example").await {
        Err(ResolveError::UnknownHost { host, .. }) => assert_eq!(host, "gone.example"),
        other => panic!("expected UnknownHost, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_resolve_yields_socket_addrs() {
    let zone = FakeZone::default().with("api.example", vec![a(192, 0, 2, 1), a(192, 0, 2, 2)]);
    let (resolver, _, _) = resolver(zone, FakePlatform::default());

    let name = reqwest::dns::Name::from_str("api.example").unwrap();
    let addrs: Vec<_> = Resolve::resolve(&resolver, name).await.unwrap().collect();
    let ips: Vec<IpAddr> = addrs.iter().map(|addr| addr.ip()).collect();
    assert_eq!(ips, vec![v4(192, 0, 2, 1), v4(192, 0, 2, 2)]);
    assert!(addrs.iter().all(|addr| addr.port() == 0));
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_live_resolution_of_public_host() {
    let resolver = NonCachingResolver::new();
    let addrs = resolver.resolve("example.com").await.unwrap();
    assert!(!addrs.is_empty(), "example.com should resolve");
}
