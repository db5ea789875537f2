//! HTTP client factory.
//!
//! Assembles a client from independently replaceable parts: the TLS context
//! supplier, the request policy supplier and the proxy supplier. The assembly
//! order is fixed:
//!
//! 1. TLS socket factory (custom -> system -> generic)
//! 2. connection pool (caps, staleness policy, optional DNS resolver)
//! 3. request policy (timeouts, redirects, cookie spec)
//! 4. proxy (none by default)
//! 5. interceptors (accept-encoding, cookies, content decoding)
//!
//! With `use_system_properties`, environment overrides are folded in on top.

use std::sync::Arc;

use log::{debug, info};
use reqwest::cookie::Jar;
use strum::IntoEnumIterator;

use crate::client::interceptors::{Interceptor, InterceptorContext};
use crate::client::redirect::apply_request_policy;
use crate::client::{ConfiguredProxy, HttpClient, ProxySupplier, SystemOverrides};
use crate::config::{ClientConfiguration, RequestPolicy};
use crate::dns::NonCachingResolver;
use crate::error_handling::ClientBuildError;
use crate::pool::{ConnectionPool, SocketFactoryRegistry};
use crate::tls::{
    resolve_tls_factory, standard_tiers, ConfiguredTlsContext, TlsContextSupplier,
    TlsSocketFactory, TrustStoreFile,
};

/// Supplies the request policy for newly built clients.
pub trait RequestPolicySupplier: Send + Sync {
    fn request_policy(&self) -> RequestPolicy;
}

impl<F> RequestPolicySupplier for F
where
    F: Fn() -> RequestPolicy + Send + Sync,
{
    fn request_policy(&self) -> RequestPolicy {
        self()
    }
}

/// Supplies the request policy fixed at configuration time.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredRequestPolicy(pub RequestPolicy);

impl RequestPolicySupplier for ConfiguredRequestPolicy {
    fn request_policy(&self) -> RequestPolicy {
        self.0.clone()
    }
}

/// Builds [`HttpClient`]s.
///
/// Each call to [`create_http_client`](Self::create_http_client) yields a new
/// client with its own pool; earlier clients stay valid. Build one client and
/// share it rather than building per request.
///
/// # Example
///
/// ```no_run
/// use resilient_http::{ClientConfiguration, HttpClientFactory, NonCachingResolver};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let factory = HttpClientFactory::new(ClientConfiguration::default().with_max_total(50))
///     .with_dns_resolver(NonCachingResolver::new());
/// let client = factory.create_http_client()?;
/// let body = client.get("https://example.com/").await?.text().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClientFactory {
    config: ClientConfiguration,
    tls_context_supplier: Arc<dyn TlsContextSupplier>,
    request_policy_supplier: Arc<dyn RequestPolicySupplier>,
    proxy_supplier: Arc<dyn ProxySupplier>,
    resolver: Option<NonCachingResolver>,
    cookie_jar: Option<Arc<Jar>>,
    system_overrides: Option<SystemOverrides>,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfiguration) -> Self {
        Self {
            tls_context_supplier: Arc::new(ConfiguredTlsContext(
                config.default_tls_context.clone(),
            )),
            request_policy_supplier: Arc::new(ConfiguredRequestPolicy(config.request.clone())),
            proxy_supplier: Arc::new(ConfiguredProxy(config.proxy.clone())),
            resolver: None,
            cookie_jar: None,
            system_overrides: None,
            config,
        }
    }

    /// Replaces where the custom TLS context comes from.
    pub fn with_tls_context_supplier(self, supplier: impl TlsContextSupplier + 'static) -> Self {
        Self {
            tls_context_supplier: Arc::new(supplier),
            ..self
        }
    }

    pub fn with_request_policy_supplier(
        self,
        supplier: impl RequestPolicySupplier + 'static,
    ) -> Self {
        Self {
            request_policy_supplier: Arc::new(supplier),
            ..self
        }
    }

    pub fn with_proxy_supplier(self, supplier: impl ProxySupplier + 'static) -> Self {
        Self {
            proxy_supplier: Arc::new(supplier),
            ..self
        }
    }

    /// Routes every address lookup of built clients through `resolver`.
    pub fn with_dns_resolver(self, resolver: NonCachingResolver) -> Self {
        Self {
            resolver: Some(resolver),
            ..self
        }
    }

    /// Shares a cookie jar across clients instead of one fresh jar per client.
    pub fn with_cookie_jar(self, jar: Arc<Jar>) -> Self {
        Self {
            cookie_jar: Some(jar),
            ..self
        }
    }

    /// Uses fixed overrides instead of reading the process environment.
    /// Only relevant when `use_system_properties` is enabled.
    pub fn with_system_overrides(self, overrides: SystemOverrides) -> Self {
        Self {
            system_overrides: Some(overrides),
            ..self
        }
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    fn effective_overrides(&self) -> SystemOverrides {
        if !self.config.use_system_properties {
            return SystemOverrides::default();
        }
        self.system_overrides
            .clone()
            .unwrap_or_else(SystemOverrides::from_env)
    }

    /// Resolves the TLS socket factory through the standard tiers.
    ///
    /// # Errors
    ///
    /// Returns `ClientBuildError::TlsFactoryExhausted` if no tier succeeded.
    pub fn create_tls_factory(&self) -> Result<TlsSocketFactory, ClientBuildError> {
        self.tls_factory_with(&self.effective_overrides())
    }

    fn tls_factory_with(
        &self,
        overrides: &SystemOverrides,
    ) -> Result<TlsSocketFactory, ClientBuildError> {
        let supplier: Arc<dyn TlsContextSupplier> = match &overrides.trust_store {
            Some(path) => {
                debug!("Using trust store {} from the environment", path.display());
                Arc::new(TrustStoreFile::new(path.clone()))
            }
            None => Arc::clone(&self.tls_context_supplier),
        };
        resolve_tls_factory(&standard_tiers(supplier))
    }

    /// Builds a new client.
    ///
    /// # Errors
    ///
    /// - `ClientBuildError::TlsFactoryExhausted` if no TLS tier succeeded
    /// - `ClientBuildError::InvalidProxy` if the supplied proxy is unusable
    /// - `ClientBuildError::HttpClient` if the transport cannot be built
    pub fn create_http_client(&self) -> Result<HttpClient, ClientBuildError> {
        let overrides = self.effective_overrides();

        let tls_factory = self.tls_factory_with(&overrides)?;
        let tls_tier = tls_factory.tier();
        let registry = SocketFactoryRegistry::new(tls_factory);

        let mut pool_settings = self.config.pool.clone();
        overrides.apply_to_pool(&mut pool_settings);
        let mut builder =
            ConnectionPool::transport_builder(&pool_settings, &registry, self.resolver.clone());

        let request_policy = self.request_policy_supplier.request_policy();
        builder = apply_request_policy(builder, &request_policy);

        if !self.config.use_system_properties {
            builder = builder.no_proxy();
        }
        let proxy = self.proxy_supplier.proxy_host();
        if let Some(proxy) = &proxy {
            builder = builder.proxy(proxy.to_transport_proxy()?);
        }

        if let Some(user_agent) = overrides
            .user_agent
            .as_ref()
            .or(self.config.user_agent.as_ref())
        {
            builder = builder.user_agent(user_agent.clone());
        }

        let context = InterceptorContext {
            cookie_spec: request_policy.cookie_spec,
            cookie_jar: self.cookie_jar.clone().unwrap_or_default(),
        };
        for interceptor in Interceptor::iter() {
            builder = interceptor.apply(builder, &context);
        }

        let transport = builder.build()?;
        info!(
            "Built HTTP client (tls: {tls_tier}, max per route: {}, max total: {}, proxy: {}, custom dns: {})",
            pool_settings.max_per_route,
            pool_settings.max_total,
            proxy
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string()),
            self.resolver.is_some()
        );

        let pool = ConnectionPool::new(
            transport,
            registry,
            pool_settings,
            request_policy.connection_request_timeout,
        );
        Ok(HttpClient::new(pool, request_policy, proxy))
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new(ClientConfiguration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ProxyHost;
    use crate::config::CookieSpec;
    use crate::error_handling::TlsContextError;
    use crate::tls::{TlsContext, TlsTier};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_default_factory_builds_client() {
        let client = HttpClientFactory::default()
            .create_http_client()
            .expect("client should build");
        assert_ne!(client.tls_tier(), TlsTier::Custom);
        assert_eq!(client.pool().settings().max_per_route, 100);
        assert_eq!(client.pool().settings().max_total, 200);
        assert!(client.proxy().is_none());
    }

    #[test]
    fn test_broken_tls_supplier_still_builds() {
        let factory = HttpClientFactory::default().with_tls_context_supplier(
            || -> Result<Option<TlsContext>, TlsContextError> {
                Err(TlsContextError::Supplier("corrupt keystore".to_string()))
            },
        );
        let client = factory.create_http_client().expect("fallback should succeed");
        assert_ne!(client.tls_tier(), TlsTier::Custom);
    }

    #[test]
    fn test_request_policy_supplier_overrides_config() {
        let factory = HttpClientFactory::default().with_request_policy_supplier(|| RequestPolicy {
            cookie_spec: CookieSpec::Ignore,
            connection_request_timeout: Duration::from_millis(10),
            ..RequestPolicy::default()
        });
        let client = factory.create_http_client().unwrap();
        assert_eq!(client.request_policy().cookie_spec, CookieSpec::Ignore);
        assert_eq!(
            client.request_policy().connection_request_timeout,
            Duration::from_millis(10)
        );
    }

    #[test]
    fn test_proxy_supplier_is_used() {
        let factory = HttpClientFactory::default()
            .with_proxy_supplier(|| Some(ProxyHost::new("127.0.0.1", 3128)));
        let client = factory.create_http_client().unwrap();
        assert_eq!(client.proxy(), Some(&ProxyHost::new("127.0.0.1", 3128)));
    }

    #[test]
    fn test_system_overrides_ignored_when_disabled() {
        let factory = HttpClientFactory::default().with_system_overrides(SystemOverrides {
            max_connections: Some(3),
            ..Default::default()
        });
        let client = factory.create_http_client().unwrap();
        assert_eq!(client.pool().settings().max_per_route, 100);
        assert_eq!(client.pool().settings().max_total, 200);
    }

    #[test]
    fn test_system_overrides_applied_when_enabled() {
        let config = ClientConfiguration::default().with_use_system_properties(true);
        let factory = HttpClientFactory::new(config).with_system_overrides(SystemOverrides {
            max_connections: Some(3),
            keep_alive: Some(false),
            ..Default::default()
        });
        let client = factory.create_http_client().unwrap();
        assert_eq!(client.pool().settings().max_per_route, 3);
        assert_eq!(client.pool().settings().max_total, 6);
        assert!(!client.pool().settings().keep_alive);
    }

    #[test]
    fn test_unreadable_trust_store_override_falls_back() {
        let config = ClientConfiguration::default().with_use_system_properties(true);
        let factory = HttpClientFactory::new(config).with_system_overrides(SystemOverrides {
            trust_store: Some(PathBuf::from("/definitely/not/here.pem")),
            ..Default::default()
        });
        let tls = factory.create_tls_factory().expect("fallback should succeed");
        assert_ne!(tls.tier(), TlsTier::Custom);
    }

    #[test]
    fn test_each_client_owns_its_pool() {
        let factory = HttpClientFactory::default();
        let first = factory.create_http_client().unwrap();
        let second = factory.create_http_client().unwrap();
        assert!(!std::ptr::eq(first.pool(), second.pool()));
    }
}
