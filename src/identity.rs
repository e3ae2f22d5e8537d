//! `$id` / `$schema` stamping for the published canonical schema.
//!
//! The manifest version is supplied by the caller; nothing here reads a
//! packaging file.

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::graph::{SchemaNode, SchemaObject};

/// Latest draft understood by the TOML tooling that consumes the schema.
pub const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIdentity {
    pub version: String,
}

impl SchemaIdentity {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }

    pub fn schema_uri(&self) -> String {
        format!("https://pixi.sh/v{}/schema/manifest/schema.json", self.version)
    }

    /// Sets `$id` and `$schema` on the root, and points the default of a
    /// `$schema` manifest property (when declared) at the versioned URI.
    pub fn stamp(&self, node: &SchemaNode) -> Result<SchemaNode> {
        let SchemaNode::Object(root) = node else {
            return Err(SchemaError::malformed("", "an object at the schema root"));
        };
        let uri = self.schema_uri();
        debug!(%uri, "stamping schema identity");

        let mut root = root.clone();
        root.insert("$id", SchemaNode::string(&uri));
        root.insert("$schema", SchemaNode::string(SCHEMA_DRAFT));

        let self_property = root
            .properties()
            .and_then(|props| props.get("$schema"))
            .and_then(SchemaNode::as_object)
            .cloned();
        if let Some(mut property) = self_property {
            property.insert("default", SchemaNode::string(&uri));
            let mut props = root.properties().cloned().unwrap_or_else(SchemaObject::new);
            props.insert("$schema", SchemaNode::Object(property));
            root.insert("properties", SchemaNode::Object(props));
        }

        Ok(SchemaNode::Object(root))
    }
}
