//! Filesystem backed secret provider.

use async_trait::async_trait;
use log::debug;
use secref_core::{Context, Error, Result, SecretProvider};

/// FileProvider keeps one secret per file under a root directory.
///
/// Values are file contents with trailing newlines and carriage returns
/// trimmed, so files written with a text editor round-trip cleanly. Writes go
/// through the context's file store, which uses owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: String,
}

impl FileProvider {
    /// Create a new FileProvider rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.ends_with('/') && root.len() > 1 {
            root.pop();
        }
        Self { root }
    }

    fn path_for(&self, key: &str) -> String {
        format!("{}/{}", self.root, key)
    }
}

#[async_trait]
impl SecretProvider for FileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let path = self.path_for(key);
        let content = ctx
            .file_read_as_string(&path)
            .await
            .map_err(|e| e.context(format!("file provider get {key:?}")))?;
        Ok(content.trim_end_matches(['\n', '\r']).to_string())
    }

    async fn set(&self, ctx: &Context, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let path = self.path_for(key);
        debug!("file provider writing secret at {path}");
        ctx.file_write_secret(&path, value.as_bytes())
            .await
            .map_err(|e| e.context(format!("file provider set {key:?}")))
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let path = self.path_for(key);
        ctx.file_remove(&path)
            .await
            .map_err(|e| e.context(format!("file provider delete {key:?}")))
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<String>> {
        let mut keys = ctx.file_list(&self.root).await?;
        keys.sort();
        Ok(keys)
    }
}
