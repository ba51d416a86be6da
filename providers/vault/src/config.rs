use secref_core::utils::Redact;
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Configuration for the Vault KV v2 provider.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VaultConfig {
    /// Base address of the Vault server, e.g. `https://vault.example.com`.
    pub address: String,
    /// Client token sent as `X-Vault-Token` on every request.
    pub token: String,
    /// KV v2 mount path. Defaults to `secret`.
    pub mount_path: String,
    /// Optional enterprise namespace sent as `X-Vault-Namespace`.
    pub namespace: String,
}

impl Debug for VaultConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("address", &self.address)
            .field("token", &Redact::from(&self.token))
            .field("mount_path", &self.mount_path)
            .field("namespace", &self.namespace)
            .finish()
    }
}
