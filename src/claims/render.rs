//! Claim value to header text.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// How list claims are written into a header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    /// `["admin","user"]` → `admin, user`
    #[default]
    Joined,
    /// `["admin","user"]` → `["admin","user"]`
    Json,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode claim as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Render a claim value as header text.
///
/// Scalars render as plain text, `null` as the empty string. Objects are
/// always JSON encoded. Lists are either joined with `", "` (each element
/// rendered by these same rules) or JSON encoded as a whole.
pub fn render(value: &Value, format: ListFormat) -> Result<String, RenderError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(render_number(n)),
        Value::Array(items) => match format {
            ListFormat::Json => Ok(serde_json::to_string(value)?),
            ListFormat::Joined => {
                let parts = items
                    .iter()
                    .map(|item| render(item, format))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(", "))
            }
        },
        Value::Object(_) => Ok(serde_json::to_string(value)?),
    }
}

// f64 Display never switches to exponent notation and drops a trailing ".0".
fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}
