//! Markdown reference documentation for the manifest.
//!
//! Works on the raw (not normalized) graph. Every definition reachable through
//! a `$ref` gets exactly one `##` section:
//! - definitions a root property points at with a plain `$ref` come first,
//!   in property order, with the property's manifest name as path prefix;
//! - every other used definition follows, in `$defs` order, prefixed by its
//!   kebab-cased name.
//!
//! Inside a section, `$ref` fields are flattened: the referenced definition's
//! properties are rendered under the referring field's dotted path instead of
//! being cross-linked. A definition already being expanded on the current
//! path, or one without properties, is rendered as a single linked field.
pub mod naming;
pub mod toml;

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::graph::{SchemaGraph, SchemaNode, SchemaObject};
use crate::reachability::{check_references, collect_used_defs};
use naming::{external_name, field_path, kebabify};

pub const DEFAULT_TITLE: &str = "pixi.toml Schema Documentation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocOptions {
    /// Text of the leading `#` heading.
    pub title: String,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self { title: DEFAULT_TITLE.to_string() }
    }
}

/// Validates every `$ref`, then renders. Nothing is returned on failure.
pub fn render(graph: &SchemaGraph, options: &DocOptions) -> Result<String> {
    check_references(graph)?;
    generate_markdown(graph, options)
}

pub fn generate_markdown(graph: &SchemaGraph, options: &DocOptions) -> Result<String> {
    let renderer = Renderer { graph };
    let used = collect_used_defs(graph);

    let mut lines = vec![format!("# {}\n", options.title)];
    let mut rendered = BTreeSet::<String>::new();

    // Only a property that is itself a `$ref` opens a primary section; one
    // that reaches a definition through a union is left to the appendix.
    for (property, field) in graph.root().properties().into_iter().flat_map(SchemaObject::iter) {
        let Some(pointer) = field.as_object().and_then(SchemaObject::reference) else {
            continue;
        };
        let (name, _) = graph.resolve_ref(pointer)?;
        if rendered.contains(name) {
            continue;
        }
        renderer.definition_section(name, external_name(property, field), &mut lines)?;
        rendered.insert(name.to_string());
    }

    for (name, _) in graph.definitions() {
        if !used.contains(name) || rendered.contains(name) {
            continue;
        }
        renderer.definition_section(name, kebabify(name), &mut lines)?;
        rendered.insert(name.to_string());
    }

    debug!(sections = rendered.len(), "rendered documentation");
    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Type label of a field: a link for `$ref`, ` | `-joined options for
/// `anyOf`/`oneOf` (nulls dropped), `List[..]` for arrays, else the
/// capitalized `type`.
pub fn extract_type(field: &SchemaObject, graph: &SchemaGraph) -> Result<String> {
    if let Some(pointer) = field.reference() {
        let (name, _) = graph.resolve_ref(pointer)?;
        return Ok(format!("[{name}](#{})", name.to_lowercase()));
    }

    let union_key = if field.variants("anyOf").next().is_some() { "anyOf" } else { "oneOf" };
    let labels = field
        .variants(union_key)
        .filter(|option| !option.is_null_type())
        .map(|option| extract_type(option, graph))
        .collect::<Result<Vec<_>>>()?;
    if !labels.is_empty() {
        return Ok(labels.join(" | "));
    }

    let names: Vec<&str> = field.type_names().into_iter().filter(|t| *t != "null").collect();
    match names.as_slice() {
        [] => Ok("Unknown".to_string()),
        ["array"] => {
            let item = match field.items() {
                Some(items) => extract_type(items, graph)?,
                None => "Unknown".to_string(),
            };
            Ok(format!("List[{item}]"))
        }
        _ => Ok(names.iter().map(|t| capitalize(t)).collect::<Vec<_>>().join(" | ")),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SECTIONS
// ————————————————————————————————————————————————————————————————————————————

struct Renderer<'g> {
    graph: &'g SchemaGraph,
}

impl Renderer<'_> {
    fn definition_section(&self, name: &str, prefix: String, lines: &mut Vec<String>) -> Result<()> {
        let definition = self.graph.resolve(name)?;
        debug!(definition = name, %prefix, "rendering definition");

        lines.push(format!("## {}", definition.title().unwrap_or(name)));
        if let Some(description) = definition.description() {
            lines.push(format!("{description}\n"));
        }

        let required = definition.required();
        let parent = vec![prefix];
        let mut expanding = BTreeSet::from([name.to_string()]);
        for (property, field) in definition.properties().into_iter().flat_map(SchemaObject::iter) {
            lines.extend(self.format_field(property, field, &required, &parent, &mut expanding)?);
        }
        Ok(())
    }

    /// One section per documented field. `required` belongs to the object
    /// declaring `name`; `expanding` holds the definitions open on this path.
    fn format_field(
        &self,
        name: &str,
        field: &SchemaNode,
        required: &BTreeSet<&str>,
        parent: &[String],
        expanding: &mut BTreeSet<String>,
    ) -> Result<Vec<String>> {
        let empty = SchemaObject::new();
        let schema = field.as_object().unwrap_or(&empty);
        let key = external_name(name, field);

        if let Some(pointer) = schema.reference() {
            let (target, definition) = self.graph.resolve_ref(pointer)?;
            match definition.properties() {
                Some(props) if !expanding.contains(target) => {
                    let mut path = parent.to_vec();
                    path.push(key);
                    let nested_required = definition.required();

                    expanding.insert(target.to_string());
                    let mut sections = Vec::new();
                    for (property, nested) in props.iter() {
                        sections.extend(self.format_field(property, nested, &nested_required, &path, expanding)?);
                    }
                    expanding.remove(target);
                    return Ok(sections);
                }
                Some(_) => debug!(definition = target, "already expanding; linking instead"),
                None => {}
            }
        }

        Ok(vec![self.field_section(schema, required.contains(name), parent, &key)?])
    }

    fn field_section(&self, field: &SchemaObject, is_required: bool, parent: &[String], key: &str) -> Result<String> {
        let parent_path = field_path(parent);
        let key_path = if parent_path.is_empty() { key.to_string() } else { format!("{parent_path}.{key}") };

        let mut lines = vec![format!("### `{key_path}`")];
        lines.push(format!("**Type:** {}\n", extract_type(field, self.graph)?));
        if is_required {
            lines.push("**Required:** Yes\n".to_string());
        }
        if let Some(default) = field.default_value() {
            lines.push(format!("**Default:** `{}`\n", toml::display_text(default)));
        }
        if let Some(description) = field.description() {
            lines.push(description.to_string());
        }
        lines.extend(example_snippets(field, &parent_path, key));
        lines.push(String::new());
        Ok(lines.join("\n"))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXAMPLES
// ————————————————————————————————————————————————————————————————————————————

/// Fenced ```toml snippets for a field's `examples`.
///
/// All-object examples merge into one table (later keys win) of quoted
/// assignments. Anything else gets one snippet per non-null example; list
/// fields wrap scalar examples into a one-element array.
fn example_snippets(field: &SchemaObject, parent_path: &str, key: &str) -> Vec<String> {
    let examples = field.examples();
    if examples.is_empty() {
        return Vec::new();
    }
    let header = if parent_path.is_empty() { String::new() } else { format!("[{parent_path}]\n") };

    if examples.iter().all(|example| example.as_object().is_some()) {
        let mut merged: IndexMap<&str, &SchemaNode> = IndexMap::new();
        for example in examples.iter().filter_map(SchemaNode::as_object) {
            merged.extend(example.iter());
        }
        let body: Vec<String> = merged
            .iter()
            .map(|(k, v)| format!("{} = {}", toml::key(k), toml::quote(&toml::display_text(v))))
            .collect();
        return vec![format!("```toml\n{header}{}\n```", body.join("\n"))];
    }

    let list_field = is_list(field);
    examples
        .iter()
        .filter(|example| !example.is_null())
        .map(|example| {
            let value = match example {
                SchemaNode::Array(_) => toml::literal(example),
                scalar if list_field => format!("[{}]", toml::literal(scalar)),
                other => toml::literal(other),
            };
            format!("```toml\n{header}{} = {value}\n```", toml::key(key))
        })
        .collect()
}

fn is_list(field: &SchemaObject) -> bool {
    field.type_names().contains(&"array")
        || field.variants("anyOf").any(|option| option.type_name() == Some("array"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
