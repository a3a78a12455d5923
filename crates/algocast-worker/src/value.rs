//! Lenient accessors for loosely typed JSON arguments.

use serde_json::Value;

/// Whether a value counts as present: not null, false, zero, or empty.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The value if it is present and truthy.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| truthy(v))
}

/// Display text of a present value; strings are taken verbatim.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    present(value).map(display)
}

/// Display text of any value.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
