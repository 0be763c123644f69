use async_trait::async_trait;

use super::insert_str;
use crate::auth::{AuthConfiguration, VaultAuthConfigJwt};
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_vault, read_secret_key, request_service_account_token, require_non_empty,
    CredentialProvider, Credentials, ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::Jwt;

/// Secret key holding a pre-issued JWT
pub const SECRET_KEY_JWT: &str = "jwt";

#[derive(Debug, Clone, PartialEq)]
enum TokenSource {
    ServiceAccount(String),
    Secret(String),
}

impl Default for TokenSource {
    fn default() -> Self {
        TokenSource::ServiceAccount(String::new())
    }
}

/// JWT auth: the token is minted for a service account or read from a secret
#[derive(Debug, Default)]
pub struct JwtCredentialProvider {
    spec: VaultAuthConfigJwt,
    source: TokenSource,
    namespace: String,
    uid: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl ProviderInit for JwtCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_vault(config, METHOD.as_str())?;
        let spec = auth.spec.jwt.clone().ok_or_else(|| {
            CredentialError::invalid_config("spec.jwt", "required for the jwt method")
        })?;
        require_non_empty("spec.jwt.role", &spec.role)?;

        let (source, uid) = match (non_empty(&spec.service_account), non_empty(&spec.secret_ref)) {
            (Some(sa), None) => {
                let sa = ctx.run(client.get_service_account(provider_namespace, sa)).await?;
                (TokenSource::ServiceAccount(sa.name), sa.uid)
            }
            (None, Some(secret)) => {
                let secret = ctx.run(client.get_secret(provider_namespace, secret)).await?;
                (TokenSource::Secret(secret.name), secret.uid)
            }
            _ => {
                return Err(CredentialError::invalid_config(
                    "spec.jwt",
                    "exactly one of serviceAccount or secretRef must be set",
                ))
            }
        };

        tracing::debug!(
            namespace = %provider_namespace,
            source = ?source,
            "Initialized jwt credential provider"
        );

        Ok(Box::new(Self {
            spec,
            source,
            namespace: provider_namespace.to_string(),
            uid,
        }))
    }
}

#[async_trait]
impl CredentialProvider for JwtCredentialProvider {
    fn method(&self) -> &'static str {
        METHOD.as_str()
    }

    fn uid(&self) -> &str {
        &self.uid
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_creds(
        &self,
        ctx: &Context,
        client: &dyn ClusterClient,
    ) -> Result<Credentials, CredentialError> {
        let jwt = match &self.source {
            TokenSource::ServiceAccount(sa) => {
                request_service_account_token(
                    ctx,
                    client,
                    &self.namespace,
                    sa,
                    &self.spec.audiences,
                    self.spec.token_expiration_seconds,
                )
                .await?
                .token
            }
            TokenSource::Secret(name) => {
                read_secret_key(ctx, client, &self.namespace, name, SECRET_KEY_JWT).await?
            }
        };

        let mut creds = Credentials::new();
        insert_str(&mut creds, "role", self.spec.role.as_str());
        insert_str(&mut creds, "jwt", jwt);
        Ok(creds)
    }
}
