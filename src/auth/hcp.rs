use serde::{Deserialize, Serialize};

use super::{deserialize_method, ObjectMeta};

/// HCPAuth object: how to obtain HCP platform credentials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HcpAuth {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HcpAuthSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcpAuthSpec {
    #[serde(default, deserialize_with = "deserialize_method")]
    pub method: String,
    #[serde(default, rename = "organizationID")]
    pub organization_id: String,
    #[serde(default, rename = "projectID")]
    pub project_id: String,
    #[serde(default)]
    pub service_principal: Option<HcpAuthServicePrincipal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HcpAuthServicePrincipal {
    /// Secret holding `clientID` and `clientSecret`
    #[serde(default)]
    pub secret_ref: String,
}
