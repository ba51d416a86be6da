use crate::VaultConfig;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use secref_core::key::{field_from_map, parse_key};
use secref_core::{Context, Error, Result, SecretProvider, SecretRotator};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const VAULT_TOKEN_HEADER: &str = "x-vault-token";
const VAULT_NAMESPACE_HEADER: &str = "x-vault-namespace";

/// VaultProvider talks to a Vault KV v2 mount over HTTP.
///
/// Every write creates an immutable new version of the secret; deletes remove
/// the whole version history (metadata-level delete). Rotation relies on that
/// version history: [`SecretRotator::get_previous`] reads version N-1 so
/// callers can honor credentials issued before the most recent rotation.
#[derive(Debug)]
pub struct VaultProvider {
    config: VaultConfig,
}

impl VaultProvider {
    /// Create a new VaultProvider.
    ///
    /// Fails when the address or token is missing. The mount path defaults to
    /// `secret` and a trailing `/` on the address is trimmed.
    pub fn new(mut config: VaultConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(Error::provider_init("vault address is required"));
        }
        if config.token.is_empty() {
            return Err(Error::provider_init("vault token is required"));
        }
        if config.mount_path.is_empty() {
            config.mount_path = "secret".to_string();
        }
        while config.address.ends_with('/') {
            config.address.pop();
        }

        Ok(Self { config })
    }

    /// The provider's configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}/data/{}",
            self.config.address, self.config.mount_path, path
        )
    }

    fn metadata_url(&self, prefix: &str) -> String {
        let base = format!("{}/v1/{}/metadata", self.config.address, self.config.mount_path);
        if prefix.is_empty() {
            base
        } else {
            format!("{}/{}", base, prefix.trim_end_matches('/'))
        }
    }

    fn build_request(&self, method: Method, uri: &str, body: Bytes) -> Result<Request<Bytes>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(VAULT_TOKEN_HEADER, &self.config.token);
        if !self.config.namespace.is_empty() {
            builder = builder.header(VAULT_NAMESPACE_HEADER, &self.config.namespace);
        }
        builder
            .body(body)
            .map_err(|e| Error::unexpected("failed to build vault request").with_source(e))
    }

    /// Read the secret at `path`, either the current version or an explicit
    /// one.
    async fn read_version(
        &self,
        ctx: &Context,
        path: &str,
        version: Option<u64>,
    ) -> Result<ReadData> {
        let mut uri = self.data_url(path);
        if let Some(v) = version {
            uri.push_str(&format!("?version={v}"));
        }

        let req = self.build_request(Method::GET, &uri, Bytes::new())?;
        let resp = ctx.http_send_as_string(req).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!(
                "vault returned not found for path {path:?}"
            )));
        }
        if !resp.status().is_success() {
            return Err(Error::unexpected(format!(
                "vault read failed with status {} for path {:?}: {}",
                resp.status(),
                path,
                resp.body()
            )));
        }

        let parsed: ReadResponse = serde_json::from_str(resp.body())
            .map_err(|e| Error::unexpected("failed to parse vault read response").with_source(e))?;
        Ok(parsed.data)
    }

    /// Write `{"value": value}` as a new version of the secret at `path`.
    async fn write_value(&self, ctx: &Context, path: &str, value: &str) -> Result<()> {
        let body = json!({ "data": { "value": value } }).to_string();
        let req = self.build_request(Method::POST, &self.data_url(path), Bytes::from(body))?;
        let resp = ctx.http_send_as_string(req).await?;

        if !resp.status().is_success() {
            return Err(Error::unexpected(format!(
                "vault write failed with status {} for path {:?}: {}",
                resp.status(),
                path,
                resp.body()
            )));
        }
        Ok(())
    }

    /// List one level of the metadata tree under `prefix`.
    ///
    /// Vault answers 404 for prefixes without children, which maps to an
    /// empty listing here.
    async fn list_prefix(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        let method = Method::from_bytes(b"LIST")
            .map_err(|e| Error::unexpected("failed to build LIST method").with_source(e))?;
        let req = self.build_request(method, &self.metadata_url(prefix), Bytes::new())?;
        let resp = ctx.http_send_as_string(req).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(Error::unexpected(format!(
                "vault list failed with status {} for prefix {:?}: {}",
                resp.status(),
                prefix,
                resp.body()
            )));
        }

        let parsed: ListResponse = serde_json::from_str(resp.body())
            .map_err(|e| Error::unexpected("failed to parse vault list response").with_source(e))?;
        Ok(parsed.data.keys)
    }

    fn extract(data: &Map<String, Value>, path: &str, field: Option<&str>) -> Result<String> {
        match field {
            Some(field) => field_from_map(data, field, path),
            None => serde_json::to_string(data)
                .map_err(|e| Error::unexpected("failed to serialize vault data").with_source(e)),
        }
    }
}

#[async_trait]
impl SecretProvider for VaultProvider {
    fn name(&self) -> &'static str {
        "vault"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let (path, field) = parse_key(key);
        let data = self.read_version(ctx, path, None).await?;
        Self::extract(&data.data, path, field)
    }

    async fn set(&self, ctx: &Context, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let (path, _) = parse_key(key);
        self.write_value(ctx, path, value).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        // Metadata delete removes all version history, not just the latest
        // version.
        let (path, _) = parse_key(key);
        let req =
            self.build_request(Method::DELETE, &self.metadata_url(path), Bytes::new())?;
        let resp = ctx.http_send_as_string(req).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("vault key {key:?} not found")));
        }
        if !resp.status().is_success() {
            return Err(Error::unexpected(format!(
                "vault delete failed with status {} for key {:?}: {}",
                resp.status(),
                key,
                resp.body()
            )));
        }
        Ok(())
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<String>> {
        // The backend lists one path segment at a time; walk the tree with an
        // explicit prefix stack. The namespace is a tree, so no cycle checks
        // are needed.
        let mut pending = vec![String::new()];
        let mut keys = Vec::new();

        while let Some(prefix) = pending.pop() {
            for name in self.list_prefix(ctx, &prefix).await? {
                let full = format!("{prefix}{name}");
                if name.ends_with('/') {
                    pending.push(full);
                } else {
                    keys.push(full);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl SecretRotator for VaultProvider {
    async fn rotate(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let mut raw = [0u8; 32];
        OsRng.fill_bytes(&mut raw);
        let new_value = hex::encode(raw);

        let (path, _) = parse_key(key);
        self.write_value(ctx, path, &new_value).await?;
        debug!("rotated vault secret at {path}");

        Ok(new_value)
    }

    async fn get_previous(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let (path, field) = parse_key(key);

        let current = self.read_version(ctx, path, None).await?;
        let current_version = current.metadata.version;
        if current_version <= 1 {
            return Err(Error::not_found(format!(
                "no previous version exists for key {key:?} (current version is {current_version})"
            )));
        }

        let prev = self
            .read_version(ctx, path, Some(current_version - 1))
            .await?;
        Self::extract(&prev.data, path, field)
    }
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: ReadData,
}

#[derive(Debug, Deserialize)]
struct ReadData {
    data: Map<String, Value>,
    metadata: VersionMetadata,
}

#[derive(Debug, Deserialize)]
struct VersionMetadata {
    version: u64,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    keys: Vec<String>,
}
