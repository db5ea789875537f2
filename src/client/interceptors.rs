//! Standard request/response interceptors.
//!
//! Interceptors are applied in declaration order:
//! 1. `AcceptEncoding`: advertise gzip, deflate and brotli
//! 2. `AddCookies`: attach stored cookies (per the cookie spec)
//! 3. `ContentDecoding`: transparently decompress response bodies

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::ClientBuilder;
use strum_macros::{Display, EnumIter};

use crate::config::CookieSpec;

/// Value of the `Accept-Encoding` header sent on every request.
pub const ACCEPT_ENCODING_VALUE: &str = "gzip, deflate, br";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Interceptor {
    AcceptEncoding,
    AddCookies,
    ContentDecoding,
}

/// Inputs the interceptors need from the factory.
pub(crate) struct InterceptorContext {
    pub(crate) cookie_spec: CookieSpec,
    pub(crate) cookie_jar: Arc<Jar>,
}

impl Interceptor {
    pub(crate) fn apply(self, builder: ClientBuilder, context: &InterceptorContext) -> ClientBuilder {
        match self {
            Interceptor::AcceptEncoding => {
                let mut headers = HeaderMap::new();
                headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING_VALUE));
                builder.default_headers(headers)
            }
            Interceptor::AddCookies => match context.cookie_spec {
                CookieSpec::Default => builder.cookie_provider(Arc::clone(&context.cookie_jar)),
                CookieSpec::Ignore => builder.cookie_store(false),
            },
            Interceptor::ContentDecoding => builder.gzip(true).deflate(true).brotli(true),
        }
    }
}
