//! Credential providers and the contract they share.
//!
//! A provider starts as a zero value implementing [`ProviderInit`]. Initialization
//! consumes it and yields the ready [`CredentialProvider`], so an instance is
//! initialized at most once and a failed one cannot be reused.

pub mod hcp;
pub mod vault;

use async_trait::async_trait;

use crate::auth::{AuthConfiguration, HcpAuth, VaultAuth};
use crate::cluster::{ClusterClient, IssuedToken, Secret};
use crate::config::{MAX_TOKEN_EXPIRATION_SECONDS, MIN_TOKEN_EXPIRATION_SECONDS};
use crate::context::Context;
use crate::error::CredentialError;

pub use hcp::ServicePrincipalCredentialProvider;
pub use vault::{
    AppRoleCredentialProvider, AwsCredentialProvider, GcpCredentialProvider,
    JwtCredentialProvider, KubernetesCredentialProvider,
};

/// Login material returned by a provider
pub type Credentials = serde_json::Map<String, serde_json::Value>;

/// Builds the zero value of a provider
pub type ProviderConstructor = fn() -> Box<dyn ProviderInit>;

/// Capability of an initialized provider
#[async_trait]
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Method token this provider implements
    fn method(&self) -> &'static str;

    /// UID of the cluster object backing the credentials
    fn uid(&self) -> &str;

    /// Namespace the provider was initialized for
    fn namespace(&self) -> &str;

    /// Produce fresh login material for the secrets backend
    async fn get_creds(
        &self,
        ctx: &Context,
        client: &dyn ClusterClient,
    ) -> Result<Credentials, CredentialError>;
}

/// Initialization step of a provider
#[async_trait]
pub trait ProviderInit: Send {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError>;
}

pub(crate) fn construct<P>() -> Box<dyn ProviderInit>
where
    P: ProviderInit + Default + 'static,
{
    Box::<P>::default()
}

pub(crate) fn expect_vault<'a>(
    config: &'a AuthConfiguration,
    method: &str,
) -> Result<&'a VaultAuth, CredentialError> {
    config.as_vault().ok_or_else(|| {
        CredentialError::invalid_config(
            "kind",
            format!("{} provider requires VaultAuth, got {}", method, config.kind()),
        )
    })
}

pub(crate) fn expect_hcp<'a>(
    config: &'a AuthConfiguration,
    method: &str,
) -> Result<&'a HcpAuth, CredentialError> {
    config.as_hcp().ok_or_else(|| {
        CredentialError::invalid_config(
            "kind",
            format!("{} provider requires HCPAuth, got {}", method, config.kind()),
        )
    })
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), CredentialError> {
    if value.trim().is_empty() {
        return Err(CredentialError::invalid_config(field, "must not be empty"));
    }
    Ok(())
}

/// Read a secret key as trimmed UTF-8; absent or blank keys are errors
pub(crate) async fn read_secret_key(
    ctx: &Context,
    client: &dyn ClusterClient,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String, CredentialError> {
    let secret = ctx.run(client.get_secret(namespace, name)).await?;
    secret_key(&secret, key)
}

pub(crate) fn secret_key(secret: &Secret, key: &str) -> Result<String, CredentialError> {
    let missing = || CredentialError::MissingSecretKey {
        namespace: secret.namespace.clone(),
        name: secret.name.clone(),
        key: key.to_string(),
    };

    let raw = secret.value(key).ok_or_else(missing)?;
    let value = std::str::from_utf8(raw)
        .map_err(|_| CredentialError::invalid_config(key, "secret value is not valid UTF-8"))?
        .trim();
    if value.is_empty() {
        return Err(missing());
    }
    Ok(value.to_string())
}

/// Request a service account token, applying context defaults and the expiry bounds
pub(crate) async fn request_service_account_token(
    ctx: &Context,
    client: &dyn ClusterClient,
    namespace: &str,
    service_account: &str,
    audiences: &[String],
    expiration_seconds: Option<i64>,
) -> Result<IssuedToken, CredentialError> {
    let audiences = if audiences.is_empty() {
        ctx.defaults.audiences.as_slice()
    } else {
        audiences
    };
    let expiration = expiration_seconds
        .unwrap_or(ctx.defaults.token_expiration_seconds)
        .clamp(MIN_TOKEN_EXPIRATION_SECONDS, MAX_TOKEN_EXPIRATION_SECONDS);

    let token = ctx
        .run(client.request_token(namespace, service_account, audiences, expiration))
        .await?;

    tracing::trace!(
        namespace = %namespace,
        service_account = %service_account,
        expiration = %token.expiration,
        "Issued service account token"
    );

    Ok(token)
}
