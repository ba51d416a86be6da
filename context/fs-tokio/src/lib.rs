//! Tokio-based file store implementation for secref.
//!
//! This crate provides `TokioFileStore`, an async file store that implements
//! the `FileStore` trait from `secref_core` using Tokio's file system
//! operations. The file-backed secret provider uses it to keep one secret per
//! file on the local disk.
//!
//! ## Example
//!
//! ```no_run
//! use secref_core::Context;
//! use secref_fs_tokio::TokioFileStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new().with_file_store(TokioFileStore);
//!
//!     match ctx.file_read("/etc/secrets/api_key").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use secref_core::{Error, FileStore, Result};
use tokio::io::AsyncWriteExt;

/// Tokio-based implementation of the `FileStore` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileStore;

#[async_trait]
impl FileStore for TokioFileStore {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(Error::from)
    }

    async fn write_secret(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(Error::from)
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}
