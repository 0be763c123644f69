use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;

use super::{ClusterClient, IssuedToken, Secret, ServiceAccount};
use crate::error::ClusterError;

/// A recorded TokenRequest
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRequest {
    pub namespace: String,
    pub service_account: String,
    pub audiences: Vec<String>,
    pub expiration_seconds: i64,
}

/// Cluster client over a fixed set of objects (for testing and local runs)
#[derive(Debug, Default)]
pub struct InMemoryClusterClient {
    service_accounts: HashMap<(String, String), ServiceAccount>,
    secrets: HashMap<(String, String), Secret>,
    token_requests: Mutex<Vec<TokenRequest>>,
}

impl InMemoryClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_account(mut self, sa: ServiceAccount) -> Self {
        self.service_accounts
            .insert((sa.namespace.clone(), sa.name.clone()), sa);
        self
    }

    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secrets
            .insert((secret.namespace.clone(), secret.name.clone()), secret);
        self
    }

    /// TokenRequests issued so far, oldest first
    pub async fn token_requests(&self) -> Vec<TokenRequest> {
        self.token_requests.lock().await.clone()
    }
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

#[async_trait]
impl ClusterClient for InMemoryClusterClient {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ServiceAccount, ClusterError> {
        self.service_accounts
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "ServiceAccount",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, ClusterError> {
        self.secrets
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "Secret",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn request_token(
        &self,
        namespace: &str,
        service_account: &str,
        audiences: &[String],
        expiration_seconds: i64,
    ) -> Result<IssuedToken, ClusterError> {
        let sa = self.get_service_account(namespace, service_account).await?;
        let expiration = TimeDelta::try_seconds(expiration_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                ClusterError::Request(format!(
                    "token expiration of {}s is out of range",
                    expiration_seconds
                ))
            })?;

        let mut requests = self.token_requests.lock().await;
        requests.push(TokenRequest {
            namespace: namespace.to_string(),
            service_account: service_account.to_string(),
            audiences: audiences.to_vec(),
            expiration_seconds,
        });

        Ok(IssuedToken {
            token: format!("{}.{}.{}", sa.namespace, sa.name, requests.len()),
            expiration,
        })
    }
}
