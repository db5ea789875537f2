//! HTTP client construction and request execution.
//!
//! [`HttpClientFactory`] builds clients; [`HttpClient`] executes requests
//! against its own capped pool.

mod factory;
mod interceptors;
mod proxy;
mod redirect;
mod request;
mod response;
mod system;

use std::sync::Arc;

use log::debug;
use reqwest::{Method, Request};

use crate::config::RequestPolicy;
use crate::error_handling::RequestError;
use crate::pool::ConnectionPool;
use crate::tls::TlsTier;

// Re-export public API
pub use factory::{ConfiguredRequestPolicy, HttpClientFactory, RequestPolicySupplier};
pub use interceptors::{Interceptor, ACCEPT_ENCODING_VALUE};
pub use proxy::{ConfiguredProxy, ProxyHost, ProxySupplier};
pub use redirect::redirect_policy;
pub use request::PooledRequestBuilder;
pub use response::PooledResponse;
pub use system::SystemOverrides;

#[derive(Debug)]
struct ClientInner {
    pool: ConnectionPool,
    request_policy: RequestPolicy,
    proxy: Option<ProxyHost>,
}

/// A built client. Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    pub(crate) fn new(
        pool: ConnectionPool,
        request_policy: RequestPolicy,
        proxy: Option<ProxyHost>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                pool,
                request_policy,
                proxy,
            }),
        }
    }

    /// Starts a request. [`PooledRequestBuilder::send`] leases a pool slot
    /// before anything goes on the wire.
    pub fn request(&self, method: Method, url: &str) -> PooledRequestBuilder {
        PooledRequestBuilder::new(self.clone(), self.inner.pool.transport().request(method, url))
    }

    /// Sends a GET request to `url`.
    pub async fn get(&self, url: &str) -> Result<PooledResponse, RequestError> {
        self.request(Method::GET, url).send().await
    }

    /// Leases a pool slot for the request's route, then sends it.
    ///
    /// The slot is held by the returned response until its body is consumed
    /// or it is dropped. Redirects are followed inside the transport under
    /// this one lease: hops to other routes are not counted against their
    /// own per-route caps, though they stay within the total cap.
    ///
    /// # Errors
    ///
    /// - `RequestError::PoolTimeout` if the pool stayed full for the
    ///   connection request timeout
    /// - `RequestError::Http` for connect, TLS, timeout and redirect failures
    pub async fn execute(&self, request: Request) -> Result<PooledResponse, RequestError> {
        let lease = self.inner.pool.lease(request.url()).await?;
        debug!("{} {} via {}", request.method(), request.url(), lease.route());
        let response = self.inner.pool.transport().execute(request).await?;
        Ok(PooledResponse::new(
            response,
            lease,
            self.inner.pool.settings().connection_config.clone(),
        ))
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.inner.pool
    }

    /// Tier the TLS socket factory was resolved from.
    pub fn tls_tier(&self) -> TlsTier {
        self.inner.pool.registry().tls().tier()
    }

    pub fn request_policy(&self) -> &RequestPolicy {
        &self.inner.request_policy
    }

    pub fn proxy(&self) -> Option<&ProxyHost> {
        self.inner.proxy.as_ref()
    }
}
