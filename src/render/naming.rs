use crate::graph::SchemaNode;

/// `hostDependencies` / `host_dependencies` → `host-dependencies`.
///
/// Splits before every ASCII capital except a leading one, so acronyms come
/// out letter by letter (`PyPI` → `py-p-i`), exactly like the manifest's own
/// field naming.
pub fn kebabify(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, ch) in identifier.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('-');
        }
        match ch {
            '_' => out.push('-'),
            _ => out.extend(ch.to_lowercase()),
        }
    }
    out
}

/// The name a field has in the manifest: its declared `alias`, else kebab-case.
pub fn external_name(identifier: &str, field: &SchemaNode) -> String {
    field
        .as_object()
        .and_then(|obj| obj.alias())
        .map(str::to_string)
        .unwrap_or_else(|| kebabify(identifier))
}

/// Dotted path of external names, e.g. `workspace.build-variants`.
pub fn field_path(segments: &[String]) -> String {
    segments.join(".")
}
