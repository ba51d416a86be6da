//! Vault KV v2 secret provider.
//!
//! Supports the full capability set (get/set/delete/list) plus rotation with
//! a readable previous version for grace-window validation.

mod config;
pub use config::VaultConfig;

mod provider;
pub use provider::VaultProvider;
