//! Core components for resolving secret references.
//!
//! This crate provides the foundational types and traits for the secref
//! ecosystem. It defines the contracts that secret backends implement and the
//! context they run against.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for environment
//!   access, file storage and HTTP sending
//! - **SecretProvider**: The capability set every backend implements
//!   (get/set/delete/list)
//! - **SecretRotator**: The rotation extension (rotate/get-previous) offered
//!   by versioned backends
//!
//! ## Example
//!
//! ```no_run
//! use secref_core::{Context, OsEnv, Result, SecretProvider};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl SecretProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "my"
//!     }
//!
//!     async fn get(&self, _ctx: &Context, key: &str) -> Result<String> {
//!         Ok(format!("value-for-{key}"))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let provider = MyProvider;
//! let value = provider.get(&ctx, "db/password").await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod key;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    Context, Env, FileStore, HttpSend, MapEnv, NoopEnv, NoopFileStore, NoopHttpSend, OsEnv,
};

mod error;
pub use error::{Error, ErrorKind, Result};

mod provider;
pub use provider::{SecretProvider, SecretRotator};
