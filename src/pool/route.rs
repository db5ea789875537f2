//! Routes and the scheme -> socket factory registry.

use std::fmt;

use url::Url;

use crate::error_handling::RequestError;
use crate::tls::TlsSocketFactory;

/// A pooled-connection destination: scheme, host and port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    scheme: String,
    host: String,
    port: u16,
}

impl Route {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// How connections for a scheme are opened.
#[derive(Debug, Clone)]
pub enum SocketFactory {
    Plain,
    Tls(TlsSocketFactory),
}

/// Registry of the socket factories a pool accepts: `http` and `https`.
#[derive(Debug, Clone)]
pub struct SocketFactoryRegistry {
    tls: TlsSocketFactory,
}

impl SocketFactoryRegistry {
    pub fn new(tls: TlsSocketFactory) -> Self {
        Self { tls }
    }

    pub fn lookup(&self, scheme: &str) -> Option<SocketFactory> {
        match scheme {
            "http" => Some(SocketFactory::Plain),
            "https" => Some(SocketFactory::Tls(self.tls.clone())),
            _ => None,
        }
    }

    pub fn tls(&self) -> &TlsSocketFactory {
        &self.tls
    }

    /// Maps a request URL to its route, rejecting unregistered schemes.
    pub fn route_for(&self, url: &Url) -> Result<Route, RequestError> {
        if self.lookup(url.scheme()).is_none() {
            return Err(RequestError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| RequestError::MissingHost(url.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| RequestError::UnsupportedScheme(url.scheme().to_string()))?;
        Ok(Route::new(url.scheme(), host, port))
    }
}
