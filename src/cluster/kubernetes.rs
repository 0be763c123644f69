use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{TokenRequest, TokenRequestSpec};
use k8s_openapi::api::core::v1::{Secret as KubeSecret, ServiceAccount as KubeServiceAccount};
use kube::api::{Api, PostParams};
use kube::Client;

use super::{ClusterClient, IssuedToken, Secret, ServiceAccount};
use crate::error::ClusterError;

/// Cluster client backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Use in-cluster config, falling back to the local kubeconfig
    pub async fn try_default() -> Result<Self, ClusterError> {
        let client = Client::try_default().await.map_err(map_kube_error)?;
        Ok(Self::new(client))
    }
}

fn map_kube_error(e: kube::Error) -> ClusterError {
    match e {
        kube::Error::Api(resp) => ClusterError::Api {
            status: resp.code,
            message: resp.message,
        },
        other => ClusterError::Request(other.to_string()),
    }
}

fn not_found(kind: &'static str, namespace: &str, name: &str) -> ClusterError {
    ClusterError::NotFound {
        kind,
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ServiceAccount, ClusterError> {
        let api: Api<KubeServiceAccount> = Api::namespaced(self.client.clone(), namespace);
        let sa = api
            .get_opt(name)
            .await
            .map_err(map_kube_error)?
            .ok_or_else(|| not_found("ServiceAccount", namespace, name))?;

        tracing::trace!(namespace = %namespace, name = %name, "Fetched service account");

        Ok(ServiceAccount {
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid: sa.metadata.uid.unwrap_or_default(),
            annotations: sa.metadata.annotations.unwrap_or_default(),
        })
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        let api: Api<KubeSecret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get_opt(name)
            .await
            .map_err(map_kube_error)?
            .ok_or_else(|| not_found("Secret", namespace, name))?;

        tracing::trace!(namespace = %namespace, name = %name, "Fetched secret");

        Ok(Secret {
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid: secret.metadata.uid.unwrap_or_default(),
            data: secret
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.0))
                .collect(),
        })
    }

    async fn request_token(
        &self,
        namespace: &str,
        service_account: &str,
        audiences: &[String],
        expiration_seconds: i64,
    ) -> Result<IssuedToken, ClusterError> {
        let api: Api<KubeServiceAccount> = Api::namespaced(self.client.clone(), namespace);

        let request = TokenRequest {
            spec: TokenRequestSpec {
                audiences: audiences.to_vec(),
                expiration_seconds: Some(expiration_seconds),
                bound_object_ref: None,
            },
            ..Default::default()
        };
        let body = serde_json::to_vec(&request)
            .map_err(|e| ClusterError::Request(format!("Invalid token request: {}", e)))?;

        let issued: TokenRequest = api
            .create_subresource("token", service_account, &PostParams::default(), body)
            .await
            .map_err(|e| match e {
                kube::Error::Api(resp) if resp.code == 404 => {
                    not_found("ServiceAccount", namespace, service_account)
                }
                other => map_kube_error(other),
            })?;

        let status = issued
            .status
            .ok_or_else(|| ClusterError::Request("TokenRequest returned no status".to_string()))?;

        Ok(IssuedToken {
            token: status.token,
            expiration: status.expiration_timestamp.0,
        })
    }
}
