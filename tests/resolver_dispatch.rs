// tests/resolver_dispatch.rs
//
// Resolver behaviour against a catalog of fake providers that count how often
// they are initialized.

use std::cell::Cell;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use vso_credentials::{
    AuthConfiguration, AuthKind, AuthObject, CatalogEntry, ClusterClient, ClusterError, Context,
    CredentialError, CredentialProvider, Credentials, InMemoryClusterClient, ObjectMeta,
    ProviderCatalog, ProviderInit, ProviderMethod, ProviderResolver,
};

thread_local! {
    // #[tokio::test] runs on a current-thread runtime, so each test sees its own counter
    static INIT_CALLS: Cell<usize> = Cell::new(0);
}

fn init_calls() -> usize {
    INIT_CALLS.with(Cell::get)
}

#[derive(Debug)]
struct FakeProvider {
    method: &'static str,
    namespace: String,
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    fn method(&self) -> &'static str {
        self.method
    }

    fn uid(&self) -> &str {
        "fake-uid"
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get_creds(
        &self,
        _ctx: &Context,
        _client: &dyn ClusterClient,
    ) -> Result<Credentials, CredentialError> {
        Ok(Credentials::new())
    }
}

/// Succeeds unless the context is already done
#[derive(Default)]
struct FakeInit;

#[async_trait]
impl ProviderInit for FakeInit {
    async fn init(
        self: Box<Self>,
        ctx: &Context,
        _client: &dyn ClusterClient,
        config: &AuthConfiguration,
        provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        INIT_CALLS.with(|c| c.set(c.get() + 1));
        ctx.check()?;

        let method = FAKE_ENTRIES
            .iter()
            .find(|e| e.kind == config.kind() && e.method == config.method())
            .map(|e| e.method)
            .expect("resolver handed over an unregistered method");

        Ok(Box::new(FakeProvider {
            method,
            namespace: provider_namespace.to_string(),
        }))
    }
}

/// Always fails with a downstream error
#[derive(Default)]
struct FailingInit;

#[async_trait]
impl ProviderInit for FailingInit {
    async fn init(
        self: Box<Self>,
        _ctx: &Context,
        _client: &dyn ClusterClient,
        _config: &AuthConfiguration,
        _provider_namespace: &str,
    ) -> Result<Box<dyn CredentialProvider>, CredentialError> {
        INIT_CALLS.with(|c| c.set(c.get() + 1));
        Err(ClusterError::Api {
            status: 503,
            message: "apiserver unavailable".to_string(),
        }
        .into())
    }
}

fn fake() -> Box<dyn ProviderInit> {
    Box::new(FakeInit)
}

fn failing() -> Box<dyn ProviderInit> {
    Box::new(FailingInit)
}

const fn fake_entry(method: ProviderMethod) -> CatalogEntry {
    CatalogEntry {
        kind: method.kind(),
        method: method.as_str(),
        construct: fake,
    }
}

static FAKE_ENTRIES: [CatalogEntry; 7] = [
    fake_entry(ProviderMethod::Kubernetes),
    fake_entry(ProviderMethod::Jwt),
    fake_entry(ProviderMethod::AppRole),
    fake_entry(ProviderMethod::Aws),
    fake_entry(ProviderMethod::Gcp),
    fake_entry(ProviderMethod::ServicePrincipal),
    CatalogEntry {
        kind: AuthKind::VaultAuth,
        method: "flaky",
        construct: failing,
    },
];

static FAKE_CATALOG: ProviderCatalog = ProviderCatalog::new(&FAKE_ENTRIES);

fn resolver() -> ProviderResolver {
    ProviderResolver::new(&FAKE_CATALOG)
}

fn object(kind: &str, method: &str) -> AuthObject {
    AuthObject::new(kind, ObjectMeta::default(), json!({ "method": method }))
}

#[tokio::test]
async fn test_every_catalog_pair_reaches_init() {
    let client = InMemoryClusterClient::new();

    for (i, entry) in FAKE_ENTRIES.iter().enumerate() {
        let result = resolver()
            .resolve(
                &Context::new(),
                &client,
                &object(entry.kind.as_str(), entry.method),
                "apps",
            )
            .await;

        assert!(
            !matches!(result, Err(ref e) if e.is_unsupported()),
            "{:?} short-circuited",
            entry
        );
        assert_eq!(init_calls(), i + 1, "{:?} not initialized exactly once", entry);

        if entry.method != "flaky" {
            let provider = result.unwrap();
            assert_eq!(provider.method(), entry.method);
            assert_eq!(provider.namespace(), "apps");
        }
    }
}

#[tokio::test]
async fn test_unknown_kind_never_initializes() {
    let client = InMemoryClusterClient::new();

    for kind in ["PlainTextSecret", "", "vaultauth", "VaultAuthGlobal", "Secret"] {
        let err = resolver()
            .resolve(&Context::new(), &client, &object(kind, "kubernetes"), "apps")
            .await
            .unwrap_err();
        assert!(
            matches!(err, CredentialError::UnsupportedAuthObject { kind: ref k } if k == kind),
            "kind {:?} gave {:?}",
            kind,
            err
        );
    }

    assert_eq!(init_calls(), 0);
}

#[tokio::test]
async fn test_unregistered_method_never_initializes() {
    let client = InMemoryClusterClient::new();
    let cases = [
        (AuthKind::VaultAuth, ""),
        (AuthKind::VaultAuth, "oidc"),
        (AuthKind::VaultAuth, "Kubernetes"),
        (AuthKind::VaultAuth, " kubernetes"),
        (AuthKind::VaultAuth, "service-principal"),
        (AuthKind::HcpAuth, ""),
        (AuthKind::HcpAuth, "kubernetes"),
        (AuthKind::HcpAuth, "jwt"),
    ];

    for (kind, method) in cases {
        let err = resolver()
            .resolve(&Context::new(), &client, &object(kind.as_str(), method), "apps")
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                CredentialError::UnsupportedMethod { kind: k, method: ref m } if k == kind && m == method
            ),
            "({}, {:?}) gave {:?}",
            kind,
            method,
            err
        );
    }

    assert_eq!(init_calls(), 0);
}

#[tokio::test]
async fn test_missing_method_is_empty_method() {
    let client = InMemoryClusterClient::new();
    let obj = AuthObject::new("VaultAuth", ObjectMeta::default(), json!({}));

    let err = resolver()
        .resolve(&Context::new(), &client, &obj, "apps")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CredentialError::UnsupportedMethod { kind: AuthKind::VaultAuth, ref method } if method.is_empty()
    ));
    assert_eq!(init_calls(), 0);
}

#[tokio::test]
async fn test_malformed_spec_never_initializes() {
    let client = InMemoryClusterClient::new();
    let obj = AuthObject::new(
        "VaultAuth",
        ObjectMeta::default(),
        json!({"method": "kubernetes", "kubernetes": "not-an-object"}),
    );

    let err = resolver()
        .resolve(&Context::new(), &client, &obj, "apps")
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::InvalidSpec(_)), "got {:?}", err);
    assert_eq!(init_calls(), 0);
}

#[tokio::test]
async fn test_cancelled_context_fails_init() {
    let client = InMemoryClusterClient::new();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = Context::new().with_cancellation(token);

    let err = resolver()
        .resolve(&ctx, &client, &object("VaultAuth", "kubernetes"), "apps")
        .await
        .unwrap_err();

    assert!(matches!(err, CredentialError::Cancelled));
    assert_eq!(init_calls(), 1);
}

#[tokio::test]
async fn test_init_error_propagated_verbatim() {
    let client = InMemoryClusterClient::new();

    let err = resolver()
        .resolve(&Context::new(), &client, &object("VaultAuth", "flaky"), "apps")
        .await
        .unwrap_err();

    match err {
        CredentialError::Cluster(ClusterError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "apiserver unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(init_calls(), 1);
}

#[tokio::test]
async fn test_resolve_config_uses_same_table() {
    let client = InMemoryClusterClient::new();
    let config = AuthConfiguration::from_object(&object("HCPAuth", "service-principal")).unwrap();

    let provider = resolver()
        .resolve_config(&Context::new(), &client, &config, "platform")
        .await
        .unwrap();
    assert_eq!(provider.method(), "service-principal");
    assert_eq!(provider.namespace(), "platform");
    assert_eq!(init_calls(), 1);

    let config = AuthConfiguration::from_object(&object("HCPAuth", "jwt")).unwrap();
    let err = resolver()
        .resolve_config(&Context::new(), &client, &config, "platform")
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::UnsupportedMethod { kind: AuthKind::HcpAuth, .. }));
    assert_eq!(init_calls(), 1);
}

#[test]
fn test_fake_catalog_advertises_what_it_dispatches() {
    assert_eq!(
        FAKE_CATALOG.supported_methods(AuthKind::VaultAuth),
        vec!["kubernetes", "jwt", "appRole", "aws", "gcp", "flaky"]
    );
    assert_eq!(
        FAKE_CATALOG.supported_methods(AuthKind::HcpAuth),
        vec!["service-principal"]
    );
}
