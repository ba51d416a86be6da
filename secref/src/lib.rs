//! Resolving secret references in configuration without effort.
//!
//! secref turns symbolic references embedded in configuration into concrete
//! credential values, backed by pluggable providers: the process environment,
//! the local filesystem, Vault KV v2 (with rotation) and AWS Secrets Manager.
//!
//! Two reference forms are supported:
//!
//! - `${scheme:key}` (and bare `${NAME}` for environment variables),
//!   expanded by [`MultiResolver`] across any number of registered providers;
//! - `secret://key`, substituted by [`Resolver`] through a single bound
//!   provider, including recursive resolution of nested configuration maps.
//!
//! ## Example
//!
//! ```no_run
//! use secref::{Context, MultiResolver, OsEnv, ReqwestHttpSend, VaultConfig, VaultProvider};
//! use std::sync::Arc;
//!
//! # async fn example() -> secref::Result<()> {
//! let ctx = Context::new()
//!     .with_env(OsEnv)
//!     .with_http_send(ReqwestHttpSend::default());
//!
//! let vault = VaultProvider::new(VaultConfig {
//!     address: "https://vault.example.com".to_string(),
//!     token: "s.token".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let resolver = MultiResolver::new();
//! resolver.register("vault", Arc::new(vault));
//!
//! let dsn = resolver
//!     .expand(&ctx, "postgres://app:${vault:prod/db#password}@${DB_HOST}/app")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use secref_core::*;

pub use secref_aws_sm::{AwsConfig, AwsSecretsManagerProvider};
pub use secref_env::EnvProvider;
pub use secref_file::FileProvider;
pub use secref_fs_tokio::TokioFileStore;
pub use secref_http_reqwest::ReqwestHttpSend;
pub use secref_vault::{VaultConfig, VaultProvider};

mod multi;
pub use multi::{parse_reference, MultiResolver, DEFAULT_SCHEME};

mod resolver;
pub use resolver::{Resolver, SECRET_PREFIX};
