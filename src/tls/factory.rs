//! TLS socket factory resolution.
//!
//! A socket factory is obtained by walking an ordered list of tiers and
//! keeping the first one that succeeds:
//!
//! 1. **custom**: the context handed out by a [`TlsContextSupplier`]
//! 2. **system**: the platform trust store (`rustls-native-certs`)
//! 3. **generic**: the bundled Mozilla root program (`webpki-roots`)
//!
//! Tier failures are collected as [`TierFailure`] values. Only when every tier
//! failed does client construction fail.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use rustls::{ClientConfig, RootCertStore};
use strum_macros::{Display, EnumIter};

use crate::error_handling::{ClientBuildError, TierFailure, TlsContextError};
use crate::tls::TlsContextSupplier;

/// Origin of a TLS socket factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TlsTier {
    Custom,
    System,
    Generic,
}

/// A ready-to-use TLS client configuration and the tier it came from.
#[derive(Clone)]
pub struct TlsSocketFactory {
    config: Arc<ClientConfig>,
    tier: TlsTier,
}

impl TlsSocketFactory {
    pub fn new(config: ClientConfig, tier: TlsTier) -> Self {
        Self {
            config: Arc::new(config),
            tier,
        }
    }

    pub fn tier(&self) -> TlsTier {
        self.tier
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }
}

impl fmt::Debug for TlsSocketFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSocketFactory")
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

/// One fallible way of obtaining a TLS client configuration.
pub trait TlsFactoryStrategy: Send + Sync {
    fn tier(&self) -> TlsTier;

    fn build(&self) -> Result<ClientConfig, TlsContextError>;
}

/// Custom tier: builds from the supplied context, if any.
pub struct CustomContextTier {
    supplier: Arc<dyn TlsContextSupplier>,
}

impl CustomContextTier {
    pub fn new(supplier: Arc<dyn TlsContextSupplier>) -> Self {
        Self { supplier }
    }
}

impl TlsFactoryStrategy for CustomContextTier {
    fn tier(&self) -> TlsTier {
        TlsTier::Custom
    }

    fn build(&self) -> Result<ClientConfig, TlsContextError> {
        let context = self
            .supplier
            .tls_context()?
            .ok_or(TlsContextError::NotConfigured)?;
        context.client_config()
    }
}

/// System tier: trust anchors from the operating system store.
pub struct SystemTier;

impl TlsFactoryStrategy for SystemTier {
    fn tier(&self) -> TlsTier {
        TlsTier::System
    }

    fn build(&self) -> Result<ClientConfig, TlsContextError> {
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            warn!("Certificate load error: {err}");
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(result.certs);
        debug!("Loaded {added} system certificates ({ignored} ignored)");
        if added == 0 {
            return Err(TlsContextError::EmptyTrustStore);
        }
        default_protocol_config(roots)
    }
}

/// Generic tier: the bundled webpki root certificates.
pub struct GenericTier;

impl TlsFactoryStrategy for GenericTier {
    fn tier(&self) -> TlsTier {
        TlsTier::Generic
    }

    fn build(&self) -> Result<ClientConfig, TlsContextError> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        default_protocol_config(roots)
    }
}

fn default_protocol_config(roots: RootCertStore) -> Result<ClientConfig, TlsContextError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// The standard tier order: custom, system, generic.
pub fn standard_tiers(supplier: Arc<dyn TlsContextSupplier>) -> Vec<Box<dyn TlsFactoryStrategy>> {
    vec![
        Box::new(CustomContextTier::new(supplier)),
        Box::new(SystemTier),
        Box::new(GenericTier),
    ]
}

/// Returns the socket factory of the first tier that succeeds.
///
/// # Errors
///
/// Returns `ClientBuildError::TlsFactoryExhausted`, carrying the failure of
/// every tier, when none of them produced a configuration.
pub fn resolve_tls_factory(
    strategies: &[Box<dyn TlsFactoryStrategy>],
) -> Result<TlsSocketFactory, ClientBuildError> {
    let mut failures = Vec::new();
    for strategy in strategies {
        let tier = strategy.tier();
        match strategy.build() {
            Ok(config) => {
                info!("Using {tier} TLS socket factory");
                return Ok(TlsSocketFactory::new(config, tier));
            }
            Err(e) => {
                debug!("{tier} TLS tier unavailable: {e}");
                failures.push(TierFailure {
                    tier,
                    reason: e.to_string(),
                });
            }
        }
    }
    Err(ClientBuildError::TlsFactoryExhausted { failures })
}
