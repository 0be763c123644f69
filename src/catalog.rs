//! The closed table of (auth kind, method) pairs and their providers.

use crate::auth::AuthKind;
use crate::providers::{
    construct, AppRoleCredentialProvider, AwsCredentialProvider, GcpCredentialProvider,
    JwtCredentialProvider, KubernetesCredentialProvider, ProviderConstructor,
    ServicePrincipalCredentialProvider,
};

/// Every authentication method with a built-in provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderMethod {
    Kubernetes,
    Jwt,
    AppRole,
    Aws,
    Gcp,
    ServicePrincipal,
}

impl ProviderMethod {
    pub const ALL: [ProviderMethod; 6] = [
        ProviderMethod::Kubernetes,
        ProviderMethod::Jwt,
        ProviderMethod::AppRole,
        ProviderMethod::Aws,
        ProviderMethod::Gcp,
        ProviderMethod::ServicePrincipal,
    ];

    /// Token as written in `spec.method`
    pub const fn as_str(self) -> &'static str {
        match self {
            ProviderMethod::Kubernetes => "kubernetes",
            ProviderMethod::Jwt => "jwt",
            ProviderMethod::AppRole => "appRole",
            ProviderMethod::Aws => "aws",
            ProviderMethod::Gcp => "gcp",
            ProviderMethod::ServicePrincipal => "service-principal",
        }
    }

    /// Auth kind the token is scoped to
    pub const fn kind(self) -> AuthKind {
        match self {
            ProviderMethod::Kubernetes
            | ProviderMethod::Jwt
            | ProviderMethod::AppRole
            | ProviderMethod::Aws
            | ProviderMethod::Gcp => AuthKind::VaultAuth,
            ProviderMethod::ServicePrincipal => AuthKind::HcpAuth,
        }
    }

    const fn constructor(self) -> ProviderConstructor {
        match self {
            ProviderMethod::Kubernetes => construct::<KubernetesCredentialProvider>,
            ProviderMethod::Jwt => construct::<JwtCredentialProvider>,
            ProviderMethod::AppRole => construct::<AppRoleCredentialProvider>,
            ProviderMethod::Aws => construct::<AwsCredentialProvider>,
            ProviderMethod::Gcp => construct::<GcpCredentialProvider>,
            ProviderMethod::ServicePrincipal => construct::<ServicePrincipalCredentialProvider>,
        }
    }

    pub const fn entry(self) -> CatalogEntry {
        CatalogEntry {
            kind: self.kind(),
            method: self.as_str(),
            construct: self.constructor(),
        }
    }
}

/// One supported (kind, method) pair
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub kind: AuthKind,
    pub method: &'static str,
    pub construct: ProviderConstructor,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("kind", &self.kind)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

static BUILTIN_ENTRIES: [CatalogEntry; ProviderMethod::ALL.len()] = [
    ProviderMethod::Kubernetes.entry(),
    ProviderMethod::Jwt.entry(),
    ProviderMethod::AppRole.entry(),
    ProviderMethod::Aws.entry(),
    ProviderMethod::Gcp.entry(),
    ProviderMethod::ServicePrincipal.entry(),
];

static BUILTIN: ProviderCatalog = ProviderCatalog::new(&BUILTIN_ENTRIES);

/// Immutable lookup table from (kind, method) to provider constructor
#[derive(Debug, Clone, Copy)]
pub struct ProviderCatalog {
    entries: &'static [CatalogEntry],
}

impl ProviderCatalog {
    /// Catalog over a custom table (e.g. fake providers in tests)
    pub const fn new(entries: &'static [CatalogEntry]) -> Self {
        Self { entries }
    }

    pub fn builtin() -> &'static ProviderCatalog {
        &BUILTIN
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    /// Method tokens accepted for `kind`, in table order
    pub fn supported_methods(&self, kind: AuthKind) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.method)
            .collect()
    }

    pub fn constructor_for(&self, kind: AuthKind, method: &str) -> Option<ProviderConstructor> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.method == method)
            .map(|e| e.construct)
    }
}

/// Method tokens the built-in catalog accepts for `kind`
pub fn supported_methods(kind: AuthKind) -> Vec<&'static str> {
    ProviderCatalog::builtin().supported_methods(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_method() {
        let catalog = ProviderCatalog::builtin();
        assert_eq!(catalog.entries().len(), ProviderMethod::ALL.len());
        for method in ProviderMethod::ALL {
            assert!(
                catalog.constructor_for(method.kind(), method.as_str()).is_some(),
                "{:?} missing from catalog",
                method
            );
        }
    }

    #[test]
    fn test_supported_methods() {
        assert_eq!(
            supported_methods(AuthKind::VaultAuth),
            vec!["kubernetes", "jwt", "appRole", "aws", "gcp"]
        );
        assert_eq!(supported_methods(AuthKind::HcpAuth), vec!["service-principal"]);
    }

    #[test]
    fn test_lookup_is_scoped_by_kind() {
        let catalog = ProviderCatalog::builtin();
        assert!(catalog.constructor_for(AuthKind::HcpAuth, "kubernetes").is_none());
        assert!(catalog.constructor_for(AuthKind::VaultAuth, "service-principal").is_none());
        assert!(catalog.constructor_for(AuthKind::VaultAuth, "").is_none());
        assert!(catalog.constructor_for(AuthKind::VaultAuth, "Kubernetes").is_none());
    }

    #[test]
    fn test_tokens_unique_within_kind() {
        for kind in AuthKind::ALL {
            let mut methods = supported_methods(kind);
            let count = methods.len();
            methods.sort_unstable();
            methods.dedup();
            assert_eq!(methods.len(), count, "duplicate method for {}", kind);
        }
    }
}
