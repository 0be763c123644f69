use async_trait::async_trait;

use super::{insert_opt, insert_str};
use crate::auth::{AuthConfiguration, VaultAuthConfigAws};
use crate::catalog::ProviderMethod;
use crate::cluster::ClusterClient;
use crate::context::Context;
use crate::error::CredentialError;
use crate::providers::{
    expect_vault, request_service_account_token, require_non_empty, secret_key,
    CredentialProvider, Credentials, ProviderInit,
};

const METHOD: ProviderMethod = ProviderMethod::Aws;

pub const SECRET_KEY_ACCESS_KEY_ID: &str = "access_key_id";
pub const SECRET_KEY_SECRET_ACCESS_KEY: &str = "secret_access_key";
pub const SECRET_KEY_SESSION_TOKEN: &str = "session_token";

/// Service account annotation naming the IAM role for IRSA
pub const IRSA_ROLE_ARN_ANNOTATION: &str = "eks.amazonaws.com/role-arn";
const IRSA_AUDIENCE: &str = "sts.amazonaws.com";

/// Where the AWS credentials used for signing come from
#[derive(Debug, Clone, Default, PartialEq)]
enum CredentialSource {
    /// Static keys in a secret
    Secret(String),
    /// Web identity via an EKS service account
    Irsa {
        service_account: String,
        role_arn: String,
    },
    /// Whatever the node's instance profile provides
    #[default]
    Instance,
}

impl CredentialSource {
    fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Secret(_) => "secret",
            CredentialSource::Irsa { .. } => "irsa",
            CredentialSource::Instance => "instance",
        }
    }
}

/// AWS IAM auth
///
/// Produces the material needed to sign an STS GetCallerIdentity request for
/// Vault's `aws` auth engine. `secretRef` wins over `irsaServiceAccount`; with
/// neither set the node role is used.
#[derive(Debug, Default)]
pub struct AwsCredentialProvider {
    spec: VaultAuthConfigAws,
    source: CredentialSource,
    namespace: String,
    uid: String,
}

#[async_trait]
impl ProviderInit for AwsCredentialProvider {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        ctx.check()?;

        let auth = expect_vault(config, METHOD.as_str())?;
        let spec = auth.spec.aws.clone().ok_or_else(|| {
            CredentialError::invalid_config("spec.aws", "required for the aws method")
        })?;
        require_non_empty("spec.aws.role", &spec.role)?;

        let secret_ref = spec.secret_ref.as_deref().filter(|s| !s.is_empty());
        let irsa = spec.irsa_service_account.as_deref().filter(|s| !s.is_empty());

        let (source, uid) = if let Some(secret_ref) = secret_ref {
            let secret = ctx.run(client.get_secret(provider_namespace, secret_ref)).await?;
            (CredentialSource::Secret(secret.name), secret.uid)
        } else if let Some(irsa) = irsa {
            let sa = ctx.run(client.get_service_account(provider_namespace, irsa)).await?;
            let role_arn = sa
                .annotation(IRSA_ROLE_ARN_ANNOTATION)
                .ok_or_else(|| {
                    CredentialError::invalid_config(
                        "spec.aws.irsaServiceAccount",
                        format!(
                            "service account {}/{} has no {} annotation",
                            sa.namespace, sa.name, IRSA_ROLE_ARN_ANNOTATION
                        ),
                    )
                })?
                .to_string();
            (
                CredentialSource::Irsa {
                    service_account: sa.name,
                    role_arn,
                },
                sa.uid,
            )
        } else {
            (CredentialSource::Instance, config.metadata().uid.clone())
        };

        tracing::debug!(
            namespace = %provider_namespace,
            source = source.as_str(),
            "Initialized aws credential provider"
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
impl CredentialProvider for AwsCredentialProvider {
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
        let region = self
            .spec
            .region
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(ctx.defaults.aws_region.as_str());

        let mut creds = Credentials::new();
        insert_str(&mut creds, "role", self.spec.role.as_str());
        insert_str(&mut creds, "region", region);
        insert_opt(&mut creds, "header_value", self.spec.header_value.as_deref());
        insert_opt(&mut creds, "session_name", self.spec.session_name.as_deref());
        insert_opt(&mut creds, "sts_endpoint", self.spec.sts_endpoint.as_deref());
        insert_opt(&mut creds, "iam_endpoint", self.spec.iam_endpoint.as_deref());
        insert_str(&mut creds, "credential_source", self.source.as_str());

        match &self.source {
            CredentialSource::Secret(name) => {
                let secret = ctx.run(client.get_secret(&self.namespace, name)).await?;
                // optional key, but a present one must still be readable
                let session_token = match secret_key(&secret, SECRET_KEY_SESSION_TOKEN) {
                    Ok(token) => Some(token),
                    Err(CredentialError::MissingSecretKey { .. }) => None,
                    Err(e) => return Err(e),
                };

                insert_str(
                    &mut creds,
                    "access_key_id",
                    secret_key(&secret, SECRET_KEY_ACCESS_KEY_ID)?,
                );
                insert_str(
                    &mut creds,
                    "secret_access_key",
                    secret_key(&secret, SECRET_KEY_SECRET_ACCESS_KEY)?,
                );
                insert_opt(&mut creds, "session_token", session_token.as_deref());
            }
            CredentialSource::Irsa {
                service_account,
                role_arn,
            } => {
                let token = request_service_account_token(
                    ctx,
                    client,
                    &self.namespace,
                    service_account,
                    &[IRSA_AUDIENCE.to_string()],
                    None,
                )
                .await?;
                insert_str(&mut creds, "role_arn", role_arn.as_str());
                insert_str(&mut creds, "web_identity_token", token.token);
            }
            CredentialSource::Instance => {}
        }

        Ok(creds)
    }
}
