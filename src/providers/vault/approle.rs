use async_trait::async_trait;

use super::insert_str;
use crate::auth::{AuthConfiguration, VaultAuthConfigAppRole};
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_vault, read_secret_key, require_non_empty, CredentialProvider, Credentials,
    ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::AppRole;

/// Secret key holding the AppRole secret ID
pub const SECRET_KEY_APPROLE: &str = "id";

#[derive(Debug, Default)]
pub struct AppRoleCredentialProvider {
    spec: VaultAuthConfigAppRole,
    namespace: String,
    uid: String,
}

#[async_trait]
impl ProviderInit for AppRoleCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_vault(config, METHOD.as_str())?;
        let spec = auth.spec.app_role.clone().ok_or_else(|| {
            CredentialError::invalid_config("spec.appRole", "required for the appRole method")
        })?;
        require_non_empty("spec.appRole.roleId", &spec.role_id)?;
        require_non_empty("spec.appRole.secretRef", &spec.secret_ref)?;

        let secret = ctx
            .run(client.get_secret(provider_namespace, &spec.secret_ref))
            .await?;

        tracing::debug!(
            namespace = %provider_namespace,
            secret = %secret.name,
            "Initialized appRole credential provider"
        );

        Ok(Box::new(Self {
            spec,
            namespace: provider_namespace.to_string(),
            uid: secret.uid,
        }))
    }
}

#[async_trait]
impl CredentialProvider for AppRoleCredentialProvider {
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
        let secret_id = read_secret_key(
            ctx,
            client,
            &self.namespace,
            &self.spec.secret_ref,
            SECRET_KEY_APPROLE,
        )
        .await?;

        let mut creds = Credentials::new();
        insert_str(&mut creds, "role_id", self.spec.role_id.as_str());
        insert_str(&mut creds, "secret_id", secret_id);
        Ok(creds)
    }
}
