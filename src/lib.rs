//! vso-credentials - credential providers for Vault and HCP auth objects
//!
//! [`resolve`] picks the provider for an auth object's (kind, method) pair from a
//! closed catalog, initializes it against the cluster, and hands it back as a
//! [`CredentialProvider`]:
//!
//! | kind        | methods                                   |
//! |-------------|-------------------------------------------|
//! | `VaultAuth` | `kubernetes`, `jwt`, `appRole`, `aws`, `gcp` |
//! | `HCPAuth`   | `service-principal`                       |

pub mod auth;
pub mod catalog;
pub mod cluster;
pub mod config;
pub mod context;
pub mod error;
pub mod providers;
pub mod resolver;

pub use auth::{AuthConfiguration, AuthKind, AuthObject, ObjectMeta};
pub use catalog::{supported_methods, CatalogEntry, ProviderCatalog, ProviderMethod};
pub use cluster::{ClusterClient, InMemoryClusterClient};
#[cfg(feature = "kube")]
pub use cluster::KubeClusterClient;
pub use config::ProviderDefaults;
pub use context::Context;
pub use error::{ClusterError, CredentialError};
pub use providers::{CredentialProvider, Credentials, ProviderConstructor, ProviderInit};
pub use resolver::{resolve, ProviderResolver};
