//! Environment-variable backed secret provider.

use async_trait::async_trait;
use log::debug;
use secref_core::{Context, Error, Result, SecretProvider};

/// EnvProvider reads secrets from the environment visible through the
/// context.
///
/// Keys are mapped to variable names by upper-casing, replacing `.` with `_`
/// and prepending the configured prefix: with prefix `APP_`, the key
/// `db.password` reads `APP_DB_PASSWORD`.
#[derive(Debug, Default, Clone)]
pub struct EnvProvider {
    prefix: String,
}

impl EnvProvider {
    /// Create a new EnvProvider.
    ///
    /// `prefix` is prepended to every mapped variable name; pass `""` for
    /// none. Without a prefix `list` is refused, since enumerating the whole
    /// process environment would be unbounded.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase().replace('.', "_"))
    }
}

#[async_trait]
impl SecretProvider for EnvProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let name = self.var_name(key);
        ctx.env_var(&name)
            .ok_or_else(|| Error::not_found(format!("environment variable {name:?} is not set")))
    }

    async fn set(&self, ctx: &Context, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        ctx.env_set_var(&self.var_name(key), value);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        ctx.env_remove_var(&self.var_name(key));
        Ok(())
    }

    async fn list(&self, ctx: &Context) -> Result<Vec<String>> {
        if self.prefix.is_empty() {
            return Err(Error::unsupported(
                "env provider cannot list without a configured prefix",
            ));
        }

        let mut keys: Vec<String> = ctx
            .env_vars()
            .into_keys()
            .filter_map(|name| {
                name.strip_prefix(&self.prefix)
                    .map(|rest| rest.to_lowercase())
            })
            .collect();
        keys.sort();
        debug!("env provider listed {} keys", keys.len());
        Ok(keys)
    }
}
