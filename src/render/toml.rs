// TOML literals for example snippets. Only the value side is produced here;
// tables and fences are assembled by the renderer.

use serde_json::Value;

use crate::graph::{Scalar, SchemaNode};

/// Basic (double-quoted) TOML string.
pub fn quote(s: &str) -> String {
    // JSON string escapes are a subset of TOML basic-string escapes.
    Value::String(s.to_string()).to_string()
}

/// Bare key when possible, quoted otherwise.
pub fn key(k: &str) -> String {
    let bare = !k.is_empty()
        && k.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if bare { k.to_string() } else { quote(k) }
}

/// Inline TOML value: `"a"`, `3`, `true`, `["a", "b"]`, `{ k = "v" }`.
pub fn literal(node: &SchemaNode) -> String {
    match node {
        SchemaNode::Scalar(Scalar::String(s)) => quote(s),
        SchemaNode::Scalar(Scalar::Number(n)) => n.to_string(),
        SchemaNode::Scalar(Scalar::Bool(b)) => b.to_string(),
        // TOML cannot spell null; only reachable for nested example values.
        SchemaNode::Scalar(Scalar::Null) => "null".to_string(),
        SchemaNode::Array(xs) => {
            let items: Vec<String> = xs.iter().map(literal).collect();
            format!("[{}]", items.join(", "))
        }
        SchemaNode::Object(obj) if obj.is_empty() => "{}".to_string(),
        SchemaNode::Object(obj) => {
            let pairs: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("{} = {}", key(k), literal(v)))
                .collect();
            format!("{{ {} }}", pairs.join(", "))
        }
    }
}

/// Text of a value as shown inside a quoted assignment: strings verbatim,
/// everything else as its literal.
pub fn display_text(node: &SchemaNode) -> String {
    match node.as_str() {
        Some(s) => s.to_string(),
        None => literal(node),
    }
}
