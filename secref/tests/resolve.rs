//! End-to-end resolution tests mixing providers.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use secref::{
    parse_reference, Context, EnvProvider, Error, MapEnv, MultiResolver, Resolver, Result,
    SecretProvider,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// A provider serving a fixed key/value set.
#[derive(Debug, Default)]
struct StaticProvider {
    secrets: HashMap<String, String>,
}

impl StaticProvider {
    fn with(pairs: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            secrets: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
    }
}

#[async_trait]
impl SecretProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get(&self, _ctx: &Context, key: &str) -> Result<String> {
        self.secrets
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("mock key {key:?} not found")))
    }
}

fn ctx_with(envs: &[(&str, &str)]) -> Context {
    let envs: HashMap<String, String> = envs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Context::new().with_env(MapEnv::new(envs))
}

#[tokio::test]
async fn test_expand_mixed_references() {
    let ctx = ctx_with(&[("HOST", "myhost")]);
    let resolver = MultiResolver::new();
    resolver.register("mock", StaticProvider::with(&[("api-key", "key123")]));

    let out = resolver
        .expand(&ctx, "url=https://${HOST}/api?key=${mock:api-key}")
        .await
        .unwrap();
    assert_eq!(out, "url=https://myhost/api?key=key123");
}

#[tokio::test]
async fn test_expand_without_references_passes_through() {
    let ctx = ctx_with(&[]);
    let resolver = MultiResolver::new();

    let out = resolver.expand(&ctx, "plain-value").await.unwrap();
    assert_eq!(out, "plain-value");
}

#[tokio::test]
async fn test_expand_explicit_env_scheme() {
    let ctx = ctx_with(&[("API_KEY", "key123")]);
    let resolver = MultiResolver::new();

    let out = resolver.expand(&ctx, "${env:API_KEY}").await.unwrap();
    assert_eq!(out, "key123");
}

#[tokio::test]
async fn test_expand_unknown_scheme_fails_whole_call() {
    let ctx = ctx_with(&[("GOOD", "value")]);
    let resolver = MultiResolver::new();

    let err = resolver
        .expand(&ctx, "${GOOD} and ${nope:key}")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn test_expand_missing_env_var_fails_whole_call() {
    let ctx = ctx_with(&[]);
    let resolver = MultiResolver::new();

    let err = resolver
        .expand(&ctx, "prefix-${MISSING_VAR_XYZ}-suffix")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_expand_field_selector_through_scheme() {
    let ctx = ctx_with(&[]);
    let resolver = MultiResolver::new();
    resolver.register(
        "mock",
        StaticProvider::with(&[("db/creds#password", "hunter2")]),
    );

    let out = resolver
        .expand(&ctx, "${mock:db/creds#password}")
        .await
        .unwrap();
    assert_eq!(out, "hunter2");
}

#[test]
fn test_parse_reference_forms() {
    assert_eq!(
        parse_reference("vault:secret/path#field"),
        ("vault", "secret/path#field")
    );
    assert_eq!(parse_reference("DB_HOST"), ("env", "DB_HOST"));
}

#[tokio::test]
async fn test_resolver_resolves_secret_reference() {
    let ctx = ctx_with(&[("DB_PASSWORD", "super-secret")]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    assert_eq!(
        r.resolve(&ctx, "secret://db_password").await.unwrap(),
        "super-secret"
    );
}

#[tokio::test]
async fn test_resolver_passes_plain_values_through() {
    let ctx = ctx_with(&[]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    assert_eq!(r.resolve(&ctx, "not-a-secret").await.unwrap(), "not-a-secret");
}

#[tokio::test]
async fn test_resolver_missing_secret_fails() {
    let ctx = ctx_with(&[]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    let err = r.resolve(&ctx, "secret://missing_key_xyz").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_resolve_map() {
    let ctx = ctx_with(&[("API_KEY", "key123")]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    let map: Map<String, Value> = json!({
        "host": "localhost",
        "api_key": "secret://api_key",
        "nested": { "value": "plain" },
        "port": 8080,
    })
    .as_object()
    .unwrap()
    .clone();

    let out = r.resolve_map(&ctx, &map).await.unwrap();
    assert_eq!(out["host"], json!("localhost"));
    assert_eq!(out["api_key"], json!("key123"));
    assert_eq!(out["nested"], json!({"value": "plain"}));
    assert_eq!(out["port"], json!(8080));
}

#[tokio::test]
async fn test_resolve_map_nested_secret() {
    let ctx = ctx_with(&[("NESTED_SECRET", "nested-value")]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    let map: Map<String, Value> = json!({
        "database": { "password": "secret://nested_secret" },
    })
    .as_object()
    .unwrap()
    .clone();

    let out = r.resolve_map(&ctx, &map).await.unwrap();
    assert_eq!(out["database"]["password"], json!("nested-value"));
}

#[tokio::test]
async fn test_resolve_map_error_is_key_qualified() {
    let ctx = ctx_with(&[]);
    let r = Resolver::new(Arc::new(EnvProvider::new("")));

    let map: Map<String, Value> = json!({
        "outer": { "inner_key": "secret://missing_xyz_123" },
    })
    .as_object()
    .unwrap()
    .clone();

    let err = r.resolve_map(&ctx, &map).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("inner_key"));
}

#[tokio::test]
async fn test_resolver_provider_accessor() {
    let r = Resolver::new(Arc::new(EnvProvider::new("TEST_")));
    assert_eq!(r.provider().name(), "env");
}
