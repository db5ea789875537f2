//! TLS contexts and socket factories.
//!
//! This module turns an optional caller-supplied [`TlsContext`] into a usable
//! [`TlsSocketFactory`] (a rustls client configuration), falling back to the
//! platform trust store and then to the bundled webpki roots.
//!
//! TLS itself is delegated to `rustls` with the `ring` crypto provider.

mod context;
mod factory;

// Re-export public API
pub use context::{
    ClientIdentity, ConfiguredTlsContext, TlsContext, TlsContextSupplier, TrustStoreFile,
    CUSTOM_CONTEXT_PROTOCOLS,
};
pub use factory::{
    resolve_tls_factory, standard_tiers, CustomContextTier, GenericTier, SystemTier,
    TlsFactoryStrategy, TlsSocketFactory, TlsTier,
};
