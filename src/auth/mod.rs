//! Auth objects as they arrive from the cluster, and their typed form.
//!
//! An [`AuthObject`] is the semi-typed envelope (`kind` + JSON `spec`).
//! [`AuthConfiguration`] is the closed union the providers are initialized with.

pub mod hcp;
pub mod vault;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CredentialError;

pub use hcp::{HcpAuth, HcpAuthServicePrincipal, HcpAuthSpec};
pub use vault::{
    VaultAuth, VaultAuthConfigAppRole, VaultAuthConfigAws, VaultAuthConfigGcp,
    VaultAuthConfigJwt, VaultAuthConfigKubernetes, VaultAuthSpec,
};

/// Kinds of auth objects the resolver understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthKind {
    VaultAuth,
    HcpAuth,
}

impl AuthKind {
    pub const ALL: [AuthKind; 2] = [AuthKind::VaultAuth, AuthKind::HcpAuth];

    pub const fn as_str(self) -> &'static str {
        match self {
            AuthKind::VaultAuth => "VaultAuth",
            AuthKind::HcpAuth => "HCPAuth",
        }
    }

    /// Match an object `kind` exactly; anything else is not an auth object
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subset of Kubernetes object metadata the providers care about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub uid: String,
}

/// Untyped auth object envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthObject {
    #[serde(default)]
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl AuthObject {
    pub fn new(kind: impl Into<String>, metadata: ObjectMeta, spec: serde_json::Value) -> Self {
        Self {
            api_version: String::new(),
            kind: kind.into(),
            metadata,
            spec,
        }
    }

    /// `spec.method`, read leniently: absent or null is empty, non-strings keep their JSON text
    pub fn method(&self) -> String {
        self.spec
            .get("method")
            .map(method_token)
            .unwrap_or_default()
    }
}

/// Typed auth configuration, one variant per supported kind
#[derive(Debug, Clone, PartialEq)]
pub enum AuthConfiguration {
    Vault(VaultAuth),
    Hcp(HcpAuth),
}

impl AuthConfiguration {
    /// Discriminate an envelope by kind and decode its spec
    pub fn from_object(obj: &AuthObject) -> Result<Self, CredentialError> {
        let kind =
            AuthKind::from_kind(&obj.kind).ok_or_else(|| CredentialError::UnsupportedAuthObject {
                kind: obj.kind.clone(),
            })?;

        let spec = match &obj.spec {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            other => other.clone(),
        };

        Ok(match kind {
            AuthKind::VaultAuth => AuthConfiguration::Vault(VaultAuth {
                metadata: obj.metadata.clone(),
                spec: serde_json::from_value(spec)?,
            }),
            AuthKind::HcpAuth => AuthConfiguration::Hcp(HcpAuth {
                metadata: obj.metadata.clone(),
                spec: serde_json::from_value(spec)?,
            }),
        })
    }

    pub fn kind(&self) -> AuthKind {
        match self {
            AuthConfiguration::Vault(_) => AuthKind::VaultAuth,
            AuthConfiguration::Hcp(_) => AuthKind::HcpAuth,
        }
    }

    pub fn method(&self) -> &str {
        match self {
            AuthConfiguration::Vault(auth) => &auth.spec.method,
            AuthConfiguration::Hcp(auth) => &auth.spec.method,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            AuthConfiguration::Vault(auth) => &auth.metadata,
            AuthConfiguration::Hcp(auth) => &auth.metadata,
        }
    }

    pub fn as_vault(&self) -> Option<&VaultAuth> {
        match self {
            AuthConfiguration::Vault(auth) => Some(auth),
            _ => None,
        }
    }

    pub fn as_hcp(&self) -> Option<&HcpAuth> {
        match self {
            AuthConfiguration::Hcp(auth) => Some(auth),
            _ => None,
        }
    }
}

impl From<VaultAuth> for AuthConfiguration {
    fn from(auth: VaultAuth) -> Self {
        AuthConfiguration::Vault(auth)
    }
}

impl From<HcpAuth> for AuthConfiguration {
    fn from(auth: HcpAuth) -> Self {
        AuthConfiguration::Hcp(auth)
    }
}

fn method_token(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn deserialize_method<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(method_token(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_kind_from_kind() {
        assert_eq!(AuthKind::from_kind("VaultAuth"), Some(AuthKind::VaultAuth));
        assert_eq!(AuthKind::from_kind("HCPAuth"), Some(AuthKind::HcpAuth));
        assert_eq!(AuthKind::from_kind("vaultauth"), None);
        assert_eq!(AuthKind::from_kind("PlainTextSecret"), None);
    }

    #[test]
    fn test_method_lenient() {
        let obj = AuthObject::new("VaultAuth", ObjectMeta::default(), json!({"method": 42}));
        assert_eq!(obj.method(), "42");

        let obj = AuthObject::new("VaultAuth", ObjectMeta::default(), json!({}));
        assert_eq!(obj.method(), "");

        let obj = AuthObject::new("VaultAuth", ObjectMeta::default(), serde_json::Value::Null);
        assert_eq!(obj.method(), "");
    }

    #[test]
    fn test_from_object_vault() {
        let obj = AuthObject::new(
            "VaultAuth",
            ObjectMeta {
                name: "default".to_string(),
                namespace: Some("apps".to_string()),
                uid: "uid-1".to_string(),
            },
            json!({
                "method": "kubernetes",
                "mount": "k8s",
                "kubernetes": {"role": "app", "serviceAccount": "default"}
            }),
        );

        let config = AuthConfiguration::from_object(&obj).unwrap();
        assert_eq!(config.kind(), AuthKind::VaultAuth);
        assert_eq!(config.method(), "kubernetes");
        assert_eq!(config.metadata().uid, "uid-1");

        let vault = config.as_vault().unwrap();
        assert_eq!(vault.spec.mount(), "k8s");
        assert_eq!(vault.spec.kubernetes.as_ref().unwrap().service_account, "default");
        assert!(config.as_hcp().is_none());
    }

    #[test]
    fn test_from_object_null_spec() {
        let obj = AuthObject::new("HCPAuth", ObjectMeta::default(), serde_json::Value::Null);
        let config = AuthConfiguration::from_object(&obj).unwrap();
        assert_eq!(config.kind(), AuthKind::HcpAuth);
        assert_eq!(config.method(), "");
    }

    #[test]
    fn test_from_object_unknown_kind() {
        let obj = AuthObject::new("PlainTextSecret", ObjectMeta::default(), json!({}));
        let result = AuthConfiguration::from_object(&obj);
        assert!(matches!(
            result,
            Err(CredentialError::UnsupportedAuthObject { kind }) if kind == "PlainTextSecret"
        ));
    }

    #[test]
    fn test_from_object_invalid_spec() {
        let obj = AuthObject::new(
            "VaultAuth",
            ObjectMeta::default(),
            json!({"method": "kubernetes", "kubernetes": "not-an-object"}),
        );
        let result = AuthConfiguration::from_object(&obj);
        assert!(matches!(result, Err(CredentialError::InvalidSpec(_))));
    }

    #[test]
    fn test_auth_object_deserialize() {
        let obj: AuthObject = serde_json::from_value(json!({
            "apiVersion": "secrets.hashicorp.com/v1beta1",
            "kind": "VaultAuth",
            "metadata": {"name": "default", "namespace": "apps"},
            "spec": {"method": "jwt"}
        }))
        .unwrap();
        assert_eq!(obj.api_version, "secrets.hashicorp.com/v1beta1");
        assert_eq!(obj.metadata.namespace.as_deref(), Some("apps"));
        assert_eq!(obj.method(), "jwt");
    }
}
