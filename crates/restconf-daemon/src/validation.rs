//! Request body guards applied before a decoded JSON value reaches the
//! browser walker.

use restconf_core::error::RestconfError;

const MAX_DEPTH: usize = 64;
const MAX_SIZE_BYTES: usize = 4_000_000;

/// Validates that a request body is within size and nesting limits before
/// it is handed to application node code.
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate_body(raw: &[u8]) -> Result<serde_json::Value, RestconfError> {
        if raw.len() > MAX_SIZE_BYTES {
            return Err(RestconfError::invalid_value(format!(
                "request body exceeds maximum size of {MAX_SIZE_BYTES} bytes"
            )));
        }
        let value: serde_json::Value = if raw.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(raw).map_err(|e| RestconfError::invalid_value(format!("malformed JSON body: {e}")))?
        };
        let depth = Self::depth(&value);
        if depth > MAX_DEPTH {
            return Err(RestconfError::invalid_value(format!(
                "request body nesting exceeds maximum depth of {MAX_DEPTH}"
            )));
        }
        Ok(value)
    }

    fn depth(value: &serde_json::Value) -> usize {
        match value {
            serde_json::Value::Object(map) => 1 + map.values().map(Self::depth).max().unwrap_or(0),
            serde_json::Value::Array(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Unwraps the `{module}:input` envelope required in strict mode,
    /// returning the inner value. Returns `Ok(None)` when the body is
    /// empty (no input supplied).
    pub fn unwrap_input(body: serde_json::Value, module: &str, wrapped: bool) -> Result<Option<serde_json::Value>, RestconfError> {
        if matches!(body, serde_json::Value::Null) {
            return Ok(None);
        }
        if !wrapped {
            return Ok(Some(body));
        }
        let key = format!("{module}:input");
        match body {
            serde_json::Value::Object(mut map) => {
                let input = map
                    .remove(&key)
                    .ok_or_else(|| RestconfError::invalid_value(format!("missing input wrapper {key}")))?;
                if !map.is_empty() {
                    return Err(RestconfError::invalid_value(format!(
                        "input body must contain exactly one key {key}"
                    )));
                }
                Ok(Some(input))
            }
            _ => Err(RestconfError::invalid_value(format!("expected object with {key} wrapper"))),
        }
    }

    /// Wraps an action's output value in `{module}:output` when required.
    pub fn wrap_output(value: serde_json::Value, module: &str, wrapped: bool) -> serde_json::Value {
        if !wrapped {
            return value;
        }
        let mut map = serde_json::Map::new();
        map.insert(format!("{module}:output"), value);
        serde_json::Value::Object(map)
    }
}
