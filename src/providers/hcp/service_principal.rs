use async_trait::async_trait;

use crate::auth::AuthConfiguration;
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_hcp, require_non_empty, secret_key, CredentialProvider, Credentials, ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::ServicePrincipal;

pub const SECRET_KEY_CLIENT_ID: &str = "clientID";
pub const SECRET_KEY_CLIENT_SECRET: &str = "clientSecret";

/// HCP service principal: client credentials kept in a secret
#[derive(Debug, Default)]
pub struct ServicePrincipalCredentialProvider {
    secret_ref: String,
    namespace: String,
    uid: String,
}

#[async_trait]
impl ProviderInit for ServicePrincipalCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_hcp(config, METHOD.as_str())?;
        let secret_ref = auth
            .spec
            .service_principal
            .as_ref()
            .map(|sp| sp.secret_ref.clone())
            .ok_or_else(|| {
                CredentialError::invalid_config(
                    "spec.servicePrincipal",
                    "required for the service-principal method",
                )
            })?;
        require_non_empty("spec.servicePrincipal.secretRef", &secret_ref)?;

        let secret = ctx
            .run(client.get_secret(provider_namespace, &secret_ref))
            .await?;

        tracing::debug!(
            namespace = %provider_namespace,
            secret = %secret.name,
            organization_id = %auth.spec.organization_id,
            project_id = %auth.spec.project_id,
            "Initialized service principal credential provider"
        );

        Ok(Box::new(Self {
            secret_ref,
            namespace: provider_namespace.to_string(),
            uid: secret.uid,
        }))
    }
}

#[async_trait]
impl CredentialProvider for ServicePrincipalCredentialProvider {
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
        let secret = ctx
            .run(client.get_secret(&self.namespace, &self.secret_ref))
            .await?;

        let mut creds = Credentials::new();
        creds.insert(
            SECRET_KEY_CLIENT_ID.to_string(),
            secret_key(&secret, SECRET_KEY_CLIENT_ID)?.into(),
        );
        creds.insert(
            SECRET_KEY_CLIENT_SECRET.to_string(),
            secret_key(&secret, SECRET_KEY_CLIENT_SECRET)?.into(),
        );
        Ok(creds)
    }
}
