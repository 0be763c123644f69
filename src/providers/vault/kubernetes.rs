use async_trait::async_trait;

use super::insert_str;
use crate::auth::{AuthConfiguration, VaultAuthConfigKubernetes};
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_vault, request_service_account_token, require_non_empty, CredentialProvider,
    Credentials, ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::Kubernetes;

/// Kubernetes auth: logs in with a freshly minted service account token
#[derive(Debug, Default)]
pub struct KubernetesCredentialProvider {
    spec: VaultAuthConfigKubernetes,
    namespace: String,
    uid: String,
}

#[async_trait]
impl ProviderInit for KubernetesCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_vault(config, METHOD.as_str())?;
        let spec = auth.spec.kubernetes.clone().ok_or_else(|| {
            CredentialError::invalid_config("spec.kubernetes", "required for the kubernetes method")
        })?;
        require_non_empty("spec.kubernetes.role", &spec.role)?;
        require_non_empty("spec.kubernetes.serviceAccount", &spec.service_account)?;

        let sa = ctx
            .run(client.get_service_account(provider_namespace, &spec.service_account))
            .await?;

        tracing::debug!(
            namespace = %provider_namespace,
            service_account = %sa.name,
            "Initialized kubernetes credential provider"
        );

        Ok(Box::new(Self {
            spec,
            namespace: provider_namespace.to_string(),
            uid: sa.uid,
        }))
    }
}

#[async_trait]
impl CredentialProvider for KubernetesCredentialProvider {
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
        let token = request_service_account_token(
            ctx,
            client,
            &self.namespace,
            &self.spec.service_account,
            &self.spec.audiences,
            self.spec.token_expiration_seconds,
        )
        .await?;

        let mut creds = Credentials::new();
        insert_str(&mut creds, "role", self.spec.role.as_str());
        insert_str(&mut creds, "jwt", token.token);
        Ok(creds)
    }
}
