//! Responses that hold their pool lease until the body is consumed.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use crate::error_handling::RequestError;
use crate::pool::{ConnectionConfig, PoolLease, Route};

/// A response whose connection slot stays leased until the body is read or
/// the response is dropped.
#[derive(Debug)]
pub struct PooledResponse {
    response: reqwest::Response,
    lease: PoolLease,
    connection_config: ConnectionConfig,
}

impl PooledResponse {
    pub(crate) fn new(
        response: reqwest::Response,
        lease: PoolLease,
        connection_config: ConnectionConfig,
    ) -> Self {
        Self {
            response,
            lease,
            connection_config,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &Url {
        self.response.url()
    }

    pub fn route(&self) -> &Route {
        self.lease.route()
    }

    pub async fn bytes(self) -> Result<Vec<u8>, RequestError> {
        let PooledResponse { response, lease, .. } = self;
        let body = response.bytes().await?;
        drop(lease);
        Ok(body.to_vec())
    }

    /// Reads the body and decodes it with the pool's [`ConnectionConfig`].
    pub async fn text(self) -> Result<String, RequestError> {
        let connection_config = self.connection_config.clone();
        let body = self.bytes().await?;
        connection_config.decode(&body)
    }

    /// Returns the underlying response, releasing the lease.
    pub fn into_inner(self) -> reqwest::Response {
        self.response
    }
}
