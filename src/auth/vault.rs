use serde::{Deserialize, Serialize};

use super::{deserialize_method, ObjectMeta};

/// VaultAuth object: how to log in to Vault
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultAuth {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: VaultAuthSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthSpec {
    #[serde(default, deserialize_with = "deserialize_method")]
    pub method: String,
    /// Auth engine mount path, defaults to the method name
    #[serde(default)]
    pub mount: Option<String>,
    /// Vault namespace (enterprise)
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub kubernetes: Option<VaultAuthConfigKubernetes>,
    #[serde(default)]
    pub jwt: Option<VaultAuthConfigJwt>,
    #[serde(default)]
    pub app_role: Option<VaultAuthConfigAppRole>,
    #[serde(default)]
    pub aws: Option<VaultAuthConfigAws>,
    #[serde(default)]
    pub gcp: Option<VaultAuthConfigGcp>,
}

impl VaultAuthSpec {
    pub fn mount(&self) -> &str {
        match &self.mount {
            Some(mount) if !mount.is_empty() => mount,
            _ => &self.method,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthConfigKubernetes {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub service_account: String,
    #[serde(default)]
    pub audiences: Vec<String>,
    #[serde(default)]
    pub token_expiration_seconds: Option<i64>,
}

/// JWT auth: the token comes from a service account or a secret, never both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthConfigJwt {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub secret_ref: Option<String>,
    #[serde(default)]
    pub service_account: Option<String>,
    #[serde(default)]
    pub audiences: Vec<String>,
    #[serde(default)]
    pub token_expiration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthConfigAppRole {
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub secret_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthConfigAws {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub header_value: Option<String>,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub sts_endpoint: Option<String>,
    #[serde(default)]
    pub iam_endpoint: Option<String>,
    #[serde(default)]
    pub secret_ref: Option<String>,
    #[serde(default)]
    pub irsa_service_account: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuthConfigGcp {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub workload_identity_service_account: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default, rename = "projectID")]
    pub project_id: Option<String>,
}
