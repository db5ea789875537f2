//! Error type definitions.
//!
//! This module defines all error types used throughout the crate.

use std::path::PathBuf;
use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::pool::Route;
use crate::tls::TlsTier;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors raised while building a TLS context or a TLS socket factory tier.
///
/// These never escape client construction on their own: the socket factory
/// resolver records them and moves on to the next tier.
#[derive(Error, Debug)]
pub enum TlsContextError {
    /// A PEM file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A PEM file contained no certificate.
    #[error("No certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    /// A PEM file contained no private key.
    #[error("No private key found in {}", .0.display())]
    NoPrivateKey(PathBuf),

    /// None of the trust anchors could be added to the root store.
    #[error("Trust store has no usable anchors")]
    EmptyTrustStore,

    /// rustls rejected the configuration (protocol versions, key, chain).
    #[error("TLS configuration error: {0}")]
    Rustls(#[from] rustls::Error),

    /// The custom tier has no context to work with.
    #[error("No custom TLS context supplied")]
    NotConfigured,

    /// Free-form failure reported by a custom context supplier.
    #[error("{0}")]
    Supplier(String),
}

/// A TLS tier that did not produce a socket factory, captured as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    pub tier: TlsTier,
    pub reason: String,
}

impl std::fmt::Display for TierFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.tier, self.reason)
    }
}

fn join_failures(failures: &[TierFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error types for client construction.
#[derive(Error, Debug)]
pub enum ClientBuildError {
    /// No TLS tier produced a usable socket factory. This is the only
    /// condition that makes client construction fail on the TLS side.
    #[error("Failed to create a TLS socket factory ({})", join_failures(.failures))]
    TlsFactoryExhausted { failures: Vec<TierFailure> },

    /// The underlying transport could not be built.
    #[error("HTTP client initialization error: {0}")]
    HttpClient(#[from] ReqwestError),

    /// The configured proxy could not be turned into a transport proxy.
    #[error("Invalid proxy {proxy}: {reason}")]
    InvalidProxy { proxy: String, reason: String },
}

/// Error types for the non-caching DNS resolver.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Platform resolution found no address for the host.
    #[error("Unknown host '{host}': {source}")]
    UnknownHost {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The CNAME chain is longer than the configured limit (or cycles).
    #[error("CNAME chain for '{host}' exceeds {max_depth} levels")]
    CnameDepthExceeded { host: String, max_depth: usize },
}

/// Failure of a single protocol-level DNS query.
///
/// The resolver recovers from both variants by falling back to platform
/// resolution; they are only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The host is not a valid DNS name.
    #[error("Failed to parse host '{host}': {reason}")]
    Parse { host: String, reason: String },

    /// The query was sent but failed (timeout, refused, network error).
    #[error("DNS query for '{host}' failed: {reason}")]
    Failed { host: String, reason: String },
}

/// Error types for requests executed through an [`HttpClient`](crate::HttpClient).
#[derive(Error, Debug)]
pub enum RequestError {
    /// No pool slot became free within the connection request timeout.
    #[error("Timed out after {waited:?} waiting for a pooled connection to {route}")]
    PoolTimeout { route: Route, waited: Duration },

    /// The URL scheme has no registered socket factory.
    #[error("Unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// The URL has no host to route to.
    #[error("URL has no host: {0}")]
    MissingHost(String),

    /// The pool semaphores were closed.
    #[error("Connection pool is closed")]
    PoolClosed,

    /// The body could not be decoded under a `Report` coding action.
    #[error("Malformed {charset} input at byte {offset}")]
    MalformedInput { charset: &'static str, offset: usize },

    /// The transport failed.
    #[error("HTTP request error: {0}")]
    Http(#[from] ReqwestError),
}
