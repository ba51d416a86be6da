use secref_core::{Context, Result, SecretProvider};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The prefix marking a value as a secret reference for [`Resolver`].
pub const SECRET_PREFIX: &str = "secret://";

/// Resolver substitutes `secret://key` values through a single bound
/// provider.
///
/// Values without the prefix pass through unchanged, so plain configuration
/// and secret references can live in the same map.
#[derive(Debug, Clone)]
pub struct Resolver {
    provider: Arc<dyn SecretProvider>,
}

impl Resolver {
    /// Create a new Resolver bound to `provider`.
    pub fn new(provider: Arc<dyn SecretProvider>) -> Self {
        Self { provider }
    }

    /// The bound provider.
    pub fn provider(&self) -> &Arc<dyn SecretProvider> {
        &self.provider
    }

    /// Resolve one value.
    pub async fn resolve(&self, ctx: &Context, value: &str) -> Result<String> {
        match value.strip_prefix(SECRET_PREFIX) {
            Some(key) => self.provider.get(ctx, key).await,
            None => Ok(value.to_string()),
        }
    }

    /// Resolve a string-keyed map depth-first.
    ///
    /// String values are resolved, nested maps are recursed into, and every
    /// other value type passes through untouched. The first failure aborts
    /// the whole resolution with a key-qualified error.
    pub async fn resolve_map(
        &self,
        ctx: &Context,
        map: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        self.resolve_map_inner(ctx, map).await
    }

    fn resolve_map_inner<'a>(
        &'a self,
        ctx: &'a Context,
        map: &'a Map<String, Value>,
    ) -> Pin<Box<dyn Future<Output = Result<Map<String, Value>>> + Send + 'a>> {
        Box::pin(async move {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let resolved = match value {
                    Value::String(s) => Value::String(
                        self.resolve(ctx, s)
                            .await
                            .map_err(|e| e.context(format!("failed to resolve key {key:?}")))?,
                    ),
                    Value::Object(inner) => Value::Object(
                        self.resolve_map_inner(ctx, inner)
                            .await
                            .map_err(|e| e.context(format!("failed to resolve key {key:?}")))?,
                    ),
                    other => other.clone(),
                };
                out.insert(key.clone(), resolved);
            }
            Ok(out)
        })
    }
}
