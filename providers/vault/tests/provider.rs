//! Tests against an in-memory versioned KV v2 backend.
//!
//! The mock implements `HttpSend` directly, tracking every version of every
//! secret so rotation and previous-version reads can be exercised without a
//! live server.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use pretty_assertions::assert_eq;
use secref_core::{Context, HttpSend, SecretProvider, SecretRotator};
use secref_vault::{VaultConfig, VaultProvider};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// All versions of one secret; index 0 is version 1.
type Versions = Vec<Map<String, Value>>;

#[derive(Debug, Default)]
struct VersionedVault {
    store: Arc<Mutex<BTreeMap<String, Versions>>>,
}

impl VersionedVault {
    fn seed(&self, path: &str, versions: &[Value]) {
        let versions: Versions = versions
            .iter()
            .map(|v| v.as_object().expect("seed value must be an object").clone())
            .collect();
        self.store
            .lock()
            .unwrap()
            .insert(path.to_string(), versions);
    }

    fn current_version(&self, path: &str) -> usize {
        self.store
            .lock()
            .unwrap()
            .get(path)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    fn respond(status: StatusCode, body: Value) -> Response<Bytes> {
        let mut resp = Response::new(Bytes::from(body.to_string()));
        *resp.status_mut() = status;
        resp
    }

    fn not_found() -> Response<Bytes> {
        Self::respond(StatusCode::NOT_FOUND, json!({"errors": []}))
    }

    fn handle_data(&self, req: &Request<Bytes>, path: &str) -> Response<Bytes> {
        let mut store = self.store.lock().unwrap();
        match req.method().as_str() {
            "GET" => {
                let Some(versions) = store.get(path) else {
                    return Self::not_found();
                };
                let query = req.uri().query().unwrap_or("");
                let requested = query
                    .strip_prefix("version=")
                    .and_then(|v| v.parse::<usize>().ok());
                let version = requested.unwrap_or(versions.len());
                if version < 1 || version > versions.len() {
                    return Self::not_found();
                }
                Self::respond(
                    StatusCode::OK,
                    json!({
                        "data": {
                            "data": versions[version - 1],
                            "metadata": { "version": version },
                        }
                    }),
                )
            }
            "POST" | "PUT" => {
                let payload: Value =
                    serde_json::from_slice(req.body()).expect("write body must be JSON");
                let data = payload["data"]
                    .as_object()
                    .expect("write body must carry a data object")
                    .clone();
                let versions = store.entry(path.to_string()).or_default();
                versions.push(data);
                Self::respond(
                    StatusCode::OK,
                    json!({"data": {"version": versions.len()}}),
                )
            }
            _ => Self::respond(StatusCode::METHOD_NOT_ALLOWED, json!({"errors": []})),
        }
    }

    fn handle_metadata(&self, req: &Request<Bytes>, path: &str) -> Response<Bytes> {
        let mut store = self.store.lock().unwrap();
        match req.method().as_str() {
            "DELETE" => {
                if store.remove(path).is_none() {
                    return Self::not_found();
                }
                Self::respond(StatusCode::NO_CONTENT, json!({}))
            }
            "LIST" => {
                let prefix = if path.is_empty() {
                    String::new()
                } else {
                    format!("{path}/")
                };
                let mut keys: Vec<String> = Vec::new();
                for full in store.keys() {
                    let Some(rest) = full.strip_prefix(&prefix) else {
                        continue;
                    };
                    let entry = match rest.split_once('/') {
                        Some((head, _)) => format!("{head}/"),
                        None => rest.to_string(),
                    };
                    if !keys.contains(&entry) {
                        keys.push(entry);
                    }
                }
                if keys.is_empty() {
                    return Self::not_found();
                }
                Self::respond(StatusCode::OK, json!({"data": {"keys": keys}}))
            }
            _ => Self::respond(StatusCode::METHOD_NOT_ALLOWED, json!({"errors": []})),
        }
    }
}

#[async_trait]
impl HttpSend for VersionedVault {
    async fn http_send(
        &self,
        req: Request<Bytes>,
    ) -> secref_core::Result<Response<Bytes>> {
        if req.headers().get("x-vault-token").is_none() {
            return Ok(Self::respond(
                StatusCode::FORBIDDEN,
                json!({"errors": ["missing client token"]}),
            ));
        }

        let uri_path = req.uri().path().to_string();
        let resp = if let Some(path) = uri_path.strip_prefix("/v1/secret/data/") {
            self.handle_data(&req, path)
        } else if let Some(path) = uri_path.strip_prefix("/v1/secret/metadata/") {
            self.handle_metadata(&req, path)
        } else if uri_path == "/v1/secret/metadata" {
            self.handle_metadata(&req, "")
        } else {
            Self::not_found()
        };
        Ok(resp)
    }
}

fn setup() -> (Context, VaultProvider, VersionedVault) {
    let backend = VersionedVault::default();
    let ctx = Context::new().with_http_send(VersionedVault {
        store: backend.store.clone(),
    });
    let provider = VaultProvider::new(VaultConfig {
        address: "http://vault.test".to_string(),
        token: "test-token".to_string(),
        mount_path: "secret".to_string(),
        ..Default::default()
    })
    .expect("provider must construct");
    (ctx, provider, backend)
}

#[tokio::test]
async fn test_set_then_get_with_field_selector() {
    let (ctx, p, _) = setup();

    p.set(&ctx, "myapp/db-pass", "hunter2").await.unwrap();
    assert_eq!(p.get(&ctx, "myapp/db-pass#value").await.unwrap(), "hunter2");
}

#[tokio::test]
async fn test_get_whole_secret_is_json() {
    let (ctx, p, backend) = setup();
    backend.seed(
        "myapp/db",
        &[json!({"username": "admin", "port": 5432})],
    );

    let raw = p.get(&ctx, "myapp/db").await.unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, json!({"username": "admin", "port": 5432}));

    assert_eq!(p.get(&ctx, "myapp/db#username").await.unwrap(), "admin");
    assert_eq!(p.get(&ctx, "myapp/db#port").await.unwrap(), "5432");
}

#[tokio::test]
async fn test_get_trailing_hash_reads_whole_secret() {
    let (ctx, p, backend) = setup();
    backend.seed("myapp/db", &[json!({"username": "admin"})]);

    let raw = p.get(&ctx, "myapp/db#").await.unwrap();
    let parsed: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, json!({"username": "admin"}));
}

#[tokio::test]
async fn test_get_not_found() {
    let (ctx, p, _) = setup();

    let err = p.get(&ctx, "missing/key").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_missing_field() {
    let (ctx, p, backend) = setup();
    backend.seed("myapp/db", &[json!({"value": "x"})]);

    let err = p.get(&ctx, "myapp/db#nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_set_creates_new_versions() {
    let (ctx, p, backend) = setup();

    p.set(&ctx, "svc/token", "one").await.unwrap();
    p.set(&ctx, "svc/token", "two").await.unwrap();

    assert_eq!(backend.current_version("svc/token"), 2);
    assert_eq!(p.get(&ctx, "svc/token#value").await.unwrap(), "two");
}

#[tokio::test]
async fn test_delete_removes_all_versions() {
    let (ctx, p, backend) = setup();
    backend.seed("svc/token", &[json!({"value": "a"}), json!({"value": "b"})]);

    p.delete(&ctx, "svc/token").await.unwrap();
    assert_eq!(backend.current_version("svc/token"), 0);

    let err = p.delete(&ctx, "svc/token").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_walks_nested_prefixes() {
    let (ctx, p, backend) = setup();
    backend.seed("top", &[json!({"value": "1"})]);
    backend.seed("myapp/api-key", &[json!({"value": "2"})]);
    backend.seed("myapp/nested/deep/leaf", &[json!({"value": "3"})]);

    let keys = p.list(&ctx).await.unwrap();
    assert_eq!(
        keys,
        vec![
            "myapp/api-key".to_string(),
            "myapp/nested/deep/leaf".to_string(),
            "top".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_list_empty_backend() {
    let (ctx, p, _) = setup();
    assert!(p.list(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rotate_returns_hex_and_bumps_version() {
    let (ctx, p, backend) = setup();

    let first = p.rotate(&ctx, "myapp/api-key").await.unwrap();
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(backend.current_version("myapp/api-key"), 1);

    let second = p.rotate(&ctx, "myapp/api-key").await.unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.current_version("myapp/api-key"), 2);
}

#[tokio::test]
async fn test_get_previous_returns_prior_version() {
    let (ctx, p, backend) = setup();
    backend.seed(
        "myapp/db-pass",
        &[json!({"value": "old-secret"}), json!({"value": "new-secret"})],
    );

    assert_eq!(
        p.get_previous(&ctx, "myapp/db-pass#value").await.unwrap(),
        "old-secret"
    );
}

#[tokio::test]
async fn test_get_previous_single_version() {
    let (ctx, p, backend) = setup();
    backend.seed("myapp/only-one", &[json!({"value": "only"})]);

    let err = p.get_previous(&ctx, "myapp/only-one").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_previous_missing_key() {
    let (ctx, p, _) = setup();

    let err = p.get_previous(&ctx, "nonexistent/key").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rotate_then_get_previous() {
    let (ctx, p, _) = setup();

    let first = p.rotate(&ctx, "svc/token").await.unwrap();
    let second = p.rotate(&ctx, "svc/token").await.unwrap();

    assert_eq!(
        p.get_previous(&ctx, "svc/token#value").await.unwrap(),
        first
    );
    assert_eq!(p.get(&ctx, "svc/token#value").await.unwrap(), second);
}
