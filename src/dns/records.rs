//! DNS records as seen by the resolver's folding step.

use std::net::{IpAddr, Ipv4Addr};

use hickory_resolver::proto::rr::{RData, RecordType};

/// A single answer record of a protocol-level query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecord {
    /// IPv4 address record
    A(Ipv4Addr),
    /// Alias pointing at another name
    Cname(String),
    /// Any other record type, kept for logging only
    Other(RecordType),
}

impl DnsRecord {
    pub fn from_rdata(rdata: &RData) -> Self {
        match rdata {
            RData::A(a) => DnsRecord::A(a.0),
            RData::CNAME(cname) => DnsRecord::Cname(cname.0.to_utf8()),
            other => DnsRecord::Other(other.record_type()),
        }
    }
}

/// Ordered addresses of a host. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddresses(Vec<IpAddr>);

impl ResolvedAddresses {
    pub fn as_slice(&self) -> &[IpAddr] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IpAddr> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<IpAddr> {
        self.0
    }
}

impl From<Vec<IpAddr>> for ResolvedAddresses {
    fn from(addrs: Vec<IpAddr>) -> Self {
        Self(addrs)
    }
}

impl IntoIterator for ResolvedAddresses {
    type Item = IpAddr;
    type IntoIter = std::vec::IntoIter<IpAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
