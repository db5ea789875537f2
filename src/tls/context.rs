//! Custom TLS contexts and the strategy that supplies them.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore, SupportedProtocolVersion};

use crate::error_handling::TlsContextError;

/// Protocol versions a custom context is restricted to.
///
/// Legacy deployments pin custom contexts to TLS 1.0 through 1.2; rustls only
/// implements 1.2 of that set.
pub const CUSTOM_CONTEXT_PROTOCOLS: &[&SupportedProtocolVersion] = &[&rustls::version::TLS12];

/// Client certificate chain and its private key.
pub struct ClientIdentity {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl Clone for ClientIdentity {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: self.key.clone_key(),
        }
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

/// Trust and identity material for the custom TLS tier.
#[derive(Debug, Clone)]
pub struct TlsContext {
    trust_anchors: Vec<CertificateDer<'static>>,
    identity: Option<ClientIdentity>,
}

impl TlsContext {
    /// Creates a context trusting exactly the given DER certificates.
    pub fn new(trust_anchors: Vec<CertificateDer<'static>>) -> Self {
        Self {
            trust_anchors,
            identity: None,
        }
    }

    /// Loads trust anchors from a PEM bundle.
    ///
    /// # Errors
    ///
    /// Returns `TlsContextError::Io` if the file cannot be read and
    /// `TlsContextError::NoCertificates` if it holds no certificate.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, TlsContextError> {
        let path = path.as_ref();
        let certs = read_certificates(path)?;
        Ok(Self::new(certs))
    }

    /// Adds a client identity (certificate chain and private key) from PEM files.
    pub fn with_identity_pem(
        self,
        chain_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, TlsContextError> {
        let chain = read_certificates(chain_path.as_ref())?;
        let key = read_private_key(key_path.as_ref())?;
        Ok(self.with_identity(chain, key))
    }

    pub fn with_identity(
        self,
        chain: Vec<CertificateDer<'static>>,
        key: PrivateKeyDer<'static>,
    ) -> Self {
        Self {
            identity: Some(ClientIdentity { chain, key }),
            ..self
        }
    }

    pub fn trust_anchors(&self) -> &[CertificateDer<'static>] {
        &self.trust_anchors
    }

    pub fn has_identity(&self) -> bool {
        self.identity.is_some()
    }

    /// Builds a rustls client configuration from this context.
    ///
    /// The configuration only speaks [`CUSTOM_CONTEXT_PROTOCOLS`] and verifies
    /// server names with the default webpki verifier.
    pub fn client_config(&self) -> Result<ClientConfig, TlsContextError> {
        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(self.trust_anchors.iter().cloned());
        if ignored > 0 {
            log::warn!("Ignored {ignored} unparsable trust anchor(s) in custom TLS context");
        }
        if added == 0 {
            return Err(TlsContextError::EmptyTrustStore);
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(CUSTOM_CONTEXT_PROTOCOLS)?
            .with_root_certificates(roots);

        let config = match &self.identity {
            Some(identity) => {
                builder.with_client_auth_cert(identity.chain.clone(), identity.key.clone_key())?
            }
            None => builder.with_no_client_auth(),
        };
        Ok(config)
    }
}

fn open(path: &Path) -> Result<BufReader<File>, TlsContextError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsContextError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsContextError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsContextError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsContextError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn read_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsContextError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsContextError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsContextError::NoPrivateKey(path.to_path_buf()))
}

/// Supplies the optional custom TLS context.
///
/// This is the override point for caller-provided trust and identity material.
/// Errors are swallowed by the socket factory resolver, which then falls back
/// to the platform tiers. Closures returning the same type implement it too.
pub trait TlsContextSupplier: Send + Sync {
    fn tls_context(&self) -> Result<Option<TlsContext>, TlsContextError>;
}

impl<F> TlsContextSupplier for F
where
    F: Fn() -> Result<Option<TlsContext>, TlsContextError> + Send + Sync,
{
    fn tls_context(&self) -> Result<Option<TlsContext>, TlsContextError> {
        self()
    }
}

/// Supplies the context fixed at configuration time (possibly none).
#[derive(Debug, Clone, Default)]
pub struct ConfiguredTlsContext(pub Option<TlsContext>);

impl TlsContextSupplier for ConfiguredTlsContext {
    fn tls_context(&self) -> Result<Option<TlsContext>, TlsContextError> {
        Ok(self.0.clone())
    }
}

/// Supplies a context read from a PEM trust store on every client build.
#[derive(Debug, Clone)]
pub struct TrustStoreFile {
    path: PathBuf,
}

impl TrustStoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TlsContextSupplier for TrustStoreFile {
    fn tls_context(&self) -> Result<Option<TlsContext>, TlsContextError> {
        TlsContext::from_pem_file(&self.path).map(Some)
    }
}
