//! Turns an auth object into an initialized credential provider.
//!
//! Resolution is a pure table lookup followed by exactly one awaited call to the
//! provider's initialization. Errors from that call are returned as they are;
//! nothing here retries, logs, or keeps a reference to the provider.

use crate::auth::{AuthConfiguration, AuthKind, AuthObject};
use crate::catalog::ProviderCatalog;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{CredentialProvider, ProviderConstructor};

#[derive(Debug, Clone, Copy)]
pub struct ProviderResolver {
    catalog: &'static ProviderCatalog,
}

impl Default for ProviderResolver {
    fn default() -> Self {
        Self::new(ProviderCatalog::builtin())
    }
}

impl ProviderResolver {
    pub const fn new(catalog: &'static ProviderCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'static ProviderCatalog {
        self.catalog
    }

    /// Resolve an untyped auth object
    ///
    /// A supported pair whose spec fails to decode is rejected with
    /// [`CredentialError::InvalidSpec`] before any provider is constructed.
    pub async fn resolve(
        &self,
        ctx: &Context,
        client: &dyn ClusterClient,
        obj: &AuthObject,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        let kind =
            AuthKind::from_kind(&obj.kind).ok_or_else(|| CredentialError::UnsupportedAuthObject {
                kind: obj.kind.clone(),
            })?;
        let construct = self.lookup(kind, &obj.method())?;
        let config = AuthConfiguration::from_object(obj)?;

        construct()
            .init(ctx, client, &config, provider_namespace)
            .await
    }

    /// Resolve an already typed configuration
    pub async fn resolve_config(
        &self,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        let construct = self.lookup(config.kind(), config.method())?;

        construct()
            .init(ctx, client, config, provider_namespace)
            .await
    }

    fn lookup(&self, kind: AuthKind, method: &str) -> Result<ProviderConstructor, CredentialError> {
        self.catalog
            .constructor_for(kind, method)
            .ok_or_else(|| CredentialError::UnsupportedMethod {
                kind,
                method: method.to_string(),
            })
    }
}

/// Resolve `obj` against the built-in catalog
pub async fn resolve(
    ctx: &Context,
    client: &dyn ClusterClient,
    obj: &AuthObject,
    provider_namespace: &str,
) -> Result<Box<dyn CredentialProvider>, CredentialError> {
    ProviderResolver::default()
        .resolve(ctx, client, obj, provider_namespace)
        .await
}
