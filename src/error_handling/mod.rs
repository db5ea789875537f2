//! Error handling.
//!
//! Errors are split by the operation that raises them:
//! - **Client construction**: [`ClientBuildError`], fatal only when every TLS tier failed
//! - **TLS contexts**: [`TlsContextError`], always recovered by the fallback chain
//! - **DNS resolution**: [`ResolveError`] (surfaced) and [`QueryError`] (recovered)
//! - **Requests**: [`RequestError`], including pool acquisition timeouts

mod types;

// Re-export public API
pub use types::{
    ClientBuildError, InitializationError, QueryError, RequestError, ResolveError, TierFailure,
    TlsContextError,
};
