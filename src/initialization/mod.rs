//! Process-level setup: logging and the TLS crypto provider.

mod logger;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;

/// Installs `ring` as the process-wide `rustls` crypto provider.
///
/// Client configs built by this crate name their provider explicitly, so this
/// only matters for other `rustls` users in the same process.
pub fn init_crypto_provider() {
    // Already installed is fine
    let _ = CryptoProvider::install_default(default_provider());
}
