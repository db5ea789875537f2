//! Proxy hosts and the strategy that supplies them.

use std::fmt;

use url::Url;

use crate::error_handling::ClientBuildError;

/// An HTTP(S) proxy the client tunnels every request through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHost {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl ProxyHost {
    /// An `http` proxy at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
        }
    }

    /// Parses `scheme://host[:port]`; a bare `host:port` is taken as `http`.
    pub fn parse(value: &str) -> Result<Self, ClientBuildError> {
        let with_scheme = if value.contains("://") {
            value.to_string()
        } else {
            format!("http://{value}")
        };
        let invalid = |reason: &str| ClientBuildError::InvalidProxy {
            proxy: value.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(&with_scheme).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;
        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }

    pub(crate) fn to_transport_proxy(&self) -> Result<reqwest::Proxy, ClientBuildError> {
        reqwest::Proxy::all(self.to_string()).map_err(|e| ClientBuildError::InvalidProxy {
            proxy: self.to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for ProxyHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Supplies the proxy for newly built clients. `None` means direct connections.
pub trait ProxySupplier: Send + Sync {
    fn proxy_host(&self) -> Option<ProxyHost>;
}

impl<F> ProxySupplier for F
where
    F: Fn() -> Option<ProxyHost> + Send + Sync,
{
    fn proxy_host(&self) -> Option<ProxyHost> {
        self()
    }
}

/// Supplies the proxy fixed at configuration time.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredProxy(pub Option<ProxyHost>);

impl ProxySupplier for ConfiguredProxy {
    fn proxy_host(&self) -> Option<ProxyHost> {
        self.0.clone()
    }
}
