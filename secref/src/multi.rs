use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use secref_core::{Context, Error, Result, SecretProvider};
use secref_env::EnvProvider;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Matches `${...}` reference spans in configuration text.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("reference pattern must be valid"));

/// The scheme used when a reference carries none, e.g. `${DB_HOST}`.
pub const DEFAULT_SCHEME: &str = "env";

/// MultiResolver expands `${scheme:key}` references across registered
/// providers.
///
/// The registry maps scheme names to providers under a read-write lock, so
/// concurrent [`expand`] calls proceed in parallel while registration is
/// exclusive. `env` is registered at construction; bare `${NAME}` references
/// resolve through it for backward compatibility.
///
/// [`expand`]: MultiResolver::expand
#[derive(Debug)]
pub struct MultiResolver {
    providers: RwLock<HashMap<String, Arc<dyn SecretProvider>>>,
}

impl Default for MultiResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiResolver {
    /// Create a new MultiResolver with the default `env` binding.
    pub fn new() -> Self {
        let mut providers: HashMap<String, Arc<dyn SecretProvider>> = HashMap::new();
        providers.insert(DEFAULT_SCHEME.to_string(), Arc::new(EnvProvider::new("")));
        Self {
            providers: RwLock::new(providers),
        }
    }

    /// Bind `scheme` to `provider`, replacing any existing binding.
    pub fn register(&self, scheme: impl Into<String>, provider: Arc<dyn SecretProvider>) {
        self.providers
            .write()
            .expect("lock poisoned")
            .insert(scheme.into(), provider);
    }

    /// Remove the binding for `scheme`.
    pub fn unregister(&self, scheme: &str) {
        self.providers
            .write()
            .expect("lock poisoned")
            .remove(scheme);
    }

    /// The provider bound to `scheme`, if any.
    pub fn provider(&self, scheme: &str) -> Option<Arc<dyn SecretProvider>> {
        self.providers
            .read()
            .expect("lock poisoned")
            .get(scheme)
            .cloned()
    }

    /// The registered scheme names, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self
            .providers
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        schemes.sort();
        schemes
    }

    /// Expand every `${...}` reference in `input`.
    ///
    /// The first failing reference aborts the whole expansion: a
    /// half-resolved configuration value is unsafe to use, so no partial
    /// result is ever returned.
    pub async fn expand(&self, ctx: &Context, input: &str) -> Result<String> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;

        for caps in REFERENCE.captures_iter(input) {
            let span = caps.get(0).expect("group 0 always participates");
            let inner = caps
                .get(1)
                .expect("group 1 always participates")
                .as_str();

            let (scheme, key) = parse_reference(inner);
            let provider = self.provider(scheme).ok_or_else(|| {
                Error::unexpected(format!(
                    "no provider registered for scheme {scheme:?} in reference ${{{inner}}}"
                ))
            })?;

            debug!("expanding ${{{inner}}} via provider {}", provider.name());
            let value = provider
                .get(ctx, key)
                .await
                .map_err(|e| e.context(format!("failed to resolve reference ${{{inner}}}")))?;

            out.push_str(&input[last..span.start()]);
            out.push_str(&value);
            last = span.end();
        }

        out.push_str(&input[last..]);
        Ok(out)
    }
}

/// Split a reference's inner text into `(scheme, key)`.
///
/// A `scheme:` prefix wins only when the candidate scheme token is composed
/// of ASCII letters, digits and hyphens; anything else keeps the whole text
/// as an env key, preserving the bare `${NAME}` form.
pub fn parse_reference(reference: &str) -> (&str, &str) {
    if let Some((scheme, key)) = reference.split_once(':') {
        if is_valid_scheme(scheme) {
            return (scheme, key);
        }
    }
    (DEFAULT_SCHEME, reference)
}

fn is_valid_scheme(scheme: &str) -> bool {
    !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
