use async_trait::async_trait;

use super::{insert_opt, insert_str};
use crate::auth::{AuthConfiguration, VaultAuthConfigGcp};
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_vault, request_service_account_token, require_non_empty, CredentialProvider,
    Credentials, ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::Gcp;

/// Service account annotation binding it to a GCP service account
pub const WORKLOAD_IDENTITY_ANNOTATION: &str = "iam.gke.io/gcp-service-account";

/// GCP IAM auth through GKE workload identity
#[derive(Debug, Default)]
pub struct GcpCredentialProvider {
    spec: VaultAuthConfigGcp,
    service_account_email: String,
    project_id: String,
    namespace: String,
    uid: String,
}

/// `name@PROJECT.iam.gserviceaccount.com` -> `PROJECT`
fn project_from_email(email: &str) -> Option<&str> {
    let (_, domain) = email.split_once('@')?;
    domain
        .strip_suffix(".iam.gserviceaccount.com")
        .filter(|project| !project.is_empty())
}

#[async_trait]
impl ProviderInit for GcpCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_vault(config, METHOD.as_str())?;
        let spec = auth.spec.gcp.clone().ok_or_else(|| {
            CredentialError::invalid_config("spec.gcp", "required for the gcp method")
        })?;
        require_non_empty("spec.gcp.role", &spec.role)?;
        require_non_empty(
            "spec.gcp.workloadIdentityServiceAccount",
            &spec.workload_identity_service_account,
        )?;

        let sa = ctx
            .run(client.get_service_account(
                provider_namespace,
                &spec.workload_identity_service_account,
            ))
            .await?;

        let service_account_email = sa
            .annotation(WORKLOAD_IDENTITY_ANNOTATION)
            .ok_or_else(|| {
                CredentialError::invalid_config(
                    "spec.gcp.workloadIdentityServiceAccount",
                    format!(
                        "service account {}/{} has no {} annotation",
                        sa.namespace, sa.name, WORKLOAD_IDENTITY_ANNOTATION
                    ),
                )
            })?
            .to_string();

        let project_id = spec
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| project_from_email(&service_account_email))
            .ok_or_else(|| {
                CredentialError::invalid_config(
                    "spec.gcp.projectID",
                    "not set and not derivable from the service account email",
                )
            })?
            .to_string();

        tracing::debug!(
            namespace = %provider_namespace,
            service_account = %sa.name,
            project_id = %project_id,
            "Initialized gcp credential provider"
        );

        Ok(Box::new(Self {
            spec,
            service_account_email,
            project_id,
            namespace: provider_namespace.to_string(),
            uid: sa.uid,
        }))
    }
}

#[async_trait]
impl CredentialProvider for GcpCredentialProvider {
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
        // Workload identity pool audience
        let audience = format!("{}.svc.id.goog", self.project_id);
        let token = request_service_account_token(
            ctx,
            client,
            &self.namespace,
            &self.spec.workload_identity_service_account,
            &[audience],
            None,
        )
        .await?;

        let mut creds = Credentials::new();
        insert_str(&mut creds, "role", self.spec.role.as_str());
        insert_str(&mut creds, "service_account_email", self.service_account_email.as_str());
        insert_str(&mut creds, "project_id", self.project_id.as_str());
        insert_opt(&mut creds, "region", self.spec.region.as_deref());
        insert_opt(&mut creds, "cluster_name", self.spec.cluster_name.as_deref());
        insert_str(&mut creds, "jwt", token.token);
        Ok(creds)
    }
}
