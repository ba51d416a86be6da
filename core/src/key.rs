//! Key parsing and field selection shared by the structured-secret providers.

use crate::{Error, Result};
use serde_json::{Map, Value};

/// Split a key of the form `path#field` on the **last** `#`.
///
/// Returns `(path, None)` when the key carries no field selector. The last
/// `#` wins so paths containing `#` still select their final attribute. A
/// trailing `#` selects nothing and reads the whole secret.
pub fn parse_key(key: &str) -> (&str, Option<&str>) {
    match key.rfind('#') {
        Some(idx) if idx + 1 < key.len() => (&key[..idx], Some(&key[idx + 1..])),
        Some(idx) => (&key[..idx], None),
        None => (key, None),
    }
}

/// Render a JSON value as its plain-string form.
///
/// Strings come out unquoted; every other value type is serialized as JSON
/// text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract one named attribute from a structured secret's data map.
pub fn field_from_map(data: &Map<String, Value>, field: &str, key: &str) -> Result<String> {
    match data.get(field) {
        Some(value) => Ok(render_value(value)),
        None => Err(Error::not_found(format!(
            "field {field:?} not found at key {key:?}"
        ))),
    }
}

/// Extract one named attribute from a JSON-encoded secret string.
pub fn field_from_json(raw: &str, field: &str, key: &str) -> Result<String> {
    let data: Map<String, Value> = serde_json::from_str(raw).map_err(|e| {
        Error::unexpected(format!("secret at {key:?} is not a JSON object")).with_source(e)
    })?;
    field_from_map(&data, field, key)
}
