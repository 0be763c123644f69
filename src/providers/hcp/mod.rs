//! Providers for HCPAuth objects.

mod service_principal;

pub use service_principal::ServicePrincipalCredentialProvider;
