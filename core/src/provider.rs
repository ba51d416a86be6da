use crate::{Context, Error, Result};
use std::fmt::Debug;

/// SecretProvider is the capability set every secret backend implements.
///
/// Backends that cannot offer an operation keep the default implementation,
/// which fails with an unsupported-operation error. Every method takes the
/// [`Context`] so cancellation and deadlines stay caller-driven.
#[async_trait::async_trait]
pub trait SecretProvider: Debug + Send + Sync + 'static {
    /// A short identifier for this backend, e.g. `"env"` or `"vault"`.
    fn name(&self) -> &'static str;

    /// Fetch the value stored at `key`.
    ///
    /// Keys may carry a `#field` suffix selecting one attribute of a
    /// structured secret; providers that wrap values document their layout.
    async fn get(&self, ctx: &Context, key: &str) -> Result<String>;

    /// Store `value` at `key`.
    async fn set(&self, _ctx: &Context, _key: &str, _value: &str) -> Result<()> {
        Err(Error::unsupported(format!(
            "{} provider does not support set",
            self.name()
        )))
    }

    /// Remove the secret stored at `key`.
    async fn delete(&self, _ctx: &Context, _key: &str) -> Result<()> {
        Err(Error::unsupported(format!(
            "{} provider does not support delete",
            self.name()
        )))
    }

    /// Enumerate the keys this provider holds.
    async fn list(&self, _ctx: &Context) -> Result<Vec<String>> {
        Err(Error::unsupported(format!(
            "{} provider does not support list",
            self.name()
        )))
    }
}

/// SecretRotator extends [`SecretProvider`] with key rotation.
///
/// Rotation writes a fresh value as the newest version while the backend
/// keeps the prior version readable through [`get_previous`], so callers can
/// keep validating against the outgoing credential during a grace window. No
/// locking is provided; a reader racing a rotation may observe either
/// version.
///
/// [`get_previous`]: SecretRotator::get_previous
#[async_trait::async_trait]
pub trait SecretRotator: SecretProvider {
    /// Generate a new random value, persist it as the newest version of
    /// `key`, and return it.
    async fn rotate(&self, ctx: &Context, key: &str) -> Result<String>;

    /// Fetch the value one version older than the current one.
    ///
    /// Fails with a not-found error when only a single version exists.
    async fn get_previous(&self, ctx: &Context, key: &str) -> Result<String>;
}
