//! Request builder bound to a client's pool.

use std::fmt::Display;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Body, Request, RequestBuilder};

use super::{HttpClient, PooledResponse};
use crate::error_handling::RequestError;

/// Builder returned by [`HttpClient::request`].
///
/// [`send`](Self::send) goes through [`HttpClient::execute`], so every
/// request built here waits for a pool slot like [`HttpClient::get`] does.
#[derive(Debug)]
pub struct PooledRequestBuilder {
    client: HttpClient,
    builder: RequestBuilder,
}

impl PooledRequestBuilder {
    pub(crate) fn new(client: HttpClient, builder: RequestBuilder) -> Self {
        Self { client, builder }
    }

    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            client: self.client,
            builder: f(self.builder),
        }
    }

    pub fn header(self, key: HeaderName, value: HeaderValue) -> Self {
        self.map(|builder| builder.header(key, value))
    }

    pub fn headers(self, headers: HeaderMap) -> Self {
        self.map(|builder| builder.headers(headers))
    }

    pub fn body<T: Into<Body>>(self, body: T) -> Self {
        self.map(|builder| builder.body(body))
    }

    /// Overrides the socket timeout for this request only.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.map(|builder| builder.timeout(timeout))
    }

    pub fn basic_auth<U: Display, P: Display>(self, username: U, password: Option<P>) -> Self {
        self.map(|builder| builder.basic_auth(username, password))
    }

    pub fn bearer_auth<T: Display>(self, token: T) -> Self {
        self.map(|builder| builder.bearer_auth(token))
    }

    /// Builds the request without sending it.
    pub fn build(self) -> Result<Request, RequestError> {
        Ok(self.builder.build()?)
    }

    /// Leases a pool slot for the request's route and sends it.
    pub async fn send(self) -> Result<PooledResponse, RequestError> {
        let client = self.client.clone();
        let request = self.build()?;
        client.execute(request).await
    }
}
