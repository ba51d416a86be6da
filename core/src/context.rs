use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Context provides the environment, filesystem and HTTP access that
/// providers use to reach their backends.
///
/// ## Important
///
/// secref provides NO default implementations. Users MAY configure components
/// they need. Any unconfigured component will use a no-op implementation that
/// returns errors or empty values when called.
///
/// ## Example
///
/// ```
/// use secref_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// ```
#[derive(Clone)]
pub struct Context {
    env: Arc<dyn Env>,
    fs: Arc<dyn FileStore>,
    http: Arc<dyn HttpSend>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("env", &self.env)
            .field("fs", &self.fs)
            .field("http", &self.http)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    ///
    /// Use the `with_*` methods to configure the components you need.
    pub fn new() -> Self {
        Self {
            env: Arc::new(NoopEnv),
            fs: Arc::new(NoopFileStore),
            http: Arc::new(NoopHttpSend),
        }
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replace the file store implementation.
    pub fn with_file_store(mut self, fs: impl FileStore) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Returns a hashmap of (variable, value) pairs for all the environment
    /// variables visible through the configured environment.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }

    /// Set an environment variable.
    #[inline]
    pub fn env_set_var(&self, key: &str, value: &str) {
        self.env.set_var(key, value)
    }

    /// Remove an environment variable.
    #[inline]
    pub fn env_remove_var(&self, key: &str) {
        self.env.remove_var(key)
    }

    /// Read a file's content entirely in `Vec<u8>`.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.read(path).await
    }

    /// Read a file's content entirely in `String`.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Write a secret file with owner-only permissions.
    #[inline]
    pub async fn file_write_secret(&self, path: &str, data: &[u8]) -> Result<()> {
        self.fs.write_secret(path, data).await
    }

    /// Remove a file.
    #[inline]
    pub async fn file_remove(&self, path: &str) -> Result<()> {
        self.fs.remove(path).await
    }

    /// List the names of non-directory entries in a directory.
    #[inline]
    pub async fn file_list(&self, dir: &str) -> Result<Vec<String>> {
        self.fs.list_files(dir).await
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Send http request and return the response with a string body.
    pub async fn http_send_as_string(
        &self,
        req: http::Request<Bytes>,
    ) -> Result<http::Response<String>> {
        let (parts, body) = self.http.http_send(req).await?.into_parts();
        let body = String::from_utf8_lossy(&body).to_string();
        Ok(http::Response::from_parts(parts, body))
    }
}

/// Env abstracts access to the process environment so providers can be tested
/// against a fixed set of variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns a hashmap of (variable, value) pairs of strings, for all the
    /// environment variables visible through this implementation.
    fn vars(&self) -> HashMap<String, String>;

    /// Set an environment variable.
    fn set_var(&self, key: &str, value: &str);

    /// Remove an environment variable.
    fn remove_var(&self, key: &str);
}

/// Implements Env for the OS process environment.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }

    fn set_var(&self, key: &str, value: &str) {
        std::env::set_var(key, value)
    }

    fn remove_var(&self, key: &str) {
        std::env::remove_var(key)
    }
}

/// MapEnv provides an in-memory environment.
///
/// This is useful for testing or for providing a fixed environment without
/// touching the process state.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    envs: Arc<Mutex<HashMap<String, String>>>,
}

impl MapEnv {
    /// Create a MapEnv pre-populated with the given variables.
    pub fn new(envs: HashMap<String, String>) -> Self {
        Self {
            envs: Arc::new(Mutex::new(envs)),
        }
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.lock().expect("lock poisoned").get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.lock().expect("lock poisoned").clone()
    }

    fn set_var(&self, key: &str, value: &str) {
        self.envs
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove_var(&self, key: &str) {
        self.envs.lock().expect("lock poisoned").remove(key);
    }
}

/// FileStore is used by the file-backed provider to read, write, remove and
/// enumerate secret files.
#[async_trait::async_trait]
pub trait FileStore: Debug + Send + Sync + 'static {
    /// Read the file content entirely in `Vec<u8>`.
    ///
    /// A missing file maps to a `NotFound` error.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Write a file with owner-only (0o600) permissions, replacing any
    /// existing content.
    async fn write_secret(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Remove a file. A missing file maps to a `NotFound` error.
    async fn remove(&self, path: &str) -> Result<()>;

    /// List the names of non-directory entries in `dir`.
    async fn list_files(&self, dir: &str) -> Result<Vec<String>>;
}

/// HttpSend is used to send http requests to secret backends.
///
/// This trait is designed for the providers; please don't use it as a general
/// http client.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// NoopEnv is a no-op implementation that always returns None/empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn set_var(&self, _key: &str, _value: &str) {}

    fn remove_var(&self, _key: &str) {}
}

/// NoopFileStore is a no-op implementation that always returns an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileStore;

#[async_trait::async_trait]
impl FileStore for NoopFileStore {
    async fn read(&self, _path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(
            "file access not supported: no file store configured",
        ))
    }

    async fn write_secret(&self, _path: &str, _data: &[u8]) -> Result<()> {
        Err(Error::unexpected(
            "file access not supported: no file store configured",
        ))
    }

    async fn remove(&self, _path: &str) -> Result<()> {
        Err(Error::unexpected(
            "file access not supported: no file store configured",
        ))
    }

    async fn list_files(&self, _dir: &str) -> Result<Vec<String>> {
        Err(Error::unexpected(
            "file access not supported: no file store configured",
        ))
    }
}

/// NoopHttpSend is a no-op implementation that always returns an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env_mutation() {
        let env = MapEnv::default();
        assert_eq!(env.var("KEY"), None);

        env.set_var("KEY", "value");
        assert_eq!(env.var("KEY"), Some("value".to_string()));

        env.remove_var("KEY");
        assert_eq!(env.var("KEY"), None);
    }

    #[tokio::test]
    async fn test_noop_context() {
        let ctx = Context::new();
        assert_eq!(ctx.env_var("ANYTHING"), None);
        assert!(ctx.file_read("/nowhere").await.is_err());

        let req = http::Request::builder()
            .uri("http://127.0.0.1/")
            .body(Bytes::new())
            .expect("request must build");
        assert!(ctx.http_send(req).await.is_err());
    }
}
