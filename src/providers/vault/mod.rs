//! Providers for VaultAuth objects.

mod approle;
mod aws;
mod gcp;
mod jwt;
mod kubernetes;

pub use approle::AppRoleCredentialProvider;
pub use aws::AwsCredentialProvider;
pub use gcp::GcpCredentialProvider;
pub use jwt::JwtCredentialProvider;
pub use kubernetes::KubernetesCredentialProvider;

use super::Credentials;

fn insert_str(creds: &mut Credentials, key: &str, value: impl Into<String>) {
    creds.insert(key.to_string(), serde_json::Value::String(value.into()));
}

fn insert_opt(creds: &mut Credentials, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        insert_str(creds, key, value);
    }
}
