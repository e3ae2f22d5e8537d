use thiserror::Error;

/// Every failure is fatal: the canonical schema and the docs page are
/// all-or-nothing artifacts.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema at `{path}`: {message}")]
    Parse { path: String, message: String },

    #[error("malformed schema at `{at}`: expected {expected}")]
    Malformed { at: String, expected: &'static str },

    #[error("unresolved reference `{reference}`: `$defs` has no entry named `{name}`")]
    UnresolvedReference { reference: String, name: String },

    #[error("unsupported reference `{0}`: only `#/$defs/<Name>` pointers are understood")]
    UnsupportedReference(String),

    #[error("failed to select schema from input: {0}")]
    Select(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub fn malformed(at: impl Into<String>, expected: &'static str) -> Self {
        let at = at.into();
        let at = if at.is_empty() { "/".to_string() } else { at };
        SchemaError::Malformed { at, expected }
    }
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
