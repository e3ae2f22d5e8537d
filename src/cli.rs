//! Minimal CLI: raw schema → (canonical schema | reference docs)
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tracing::info;

use manifest_schema::identity::SchemaIdentity;
use manifest_schema::input::{self, Selection};
use manifest_schema::normalize;
use manifest_schema::reachability::check_references;
use manifest_schema::render::{self, DocOptions, DEFAULT_TITLE};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// canonicalize a generated manifest JSON schema for TOML tooling, or render it as reference docs
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct CommandLineInterface {
    /// print Markdown reference documentation instead of the canonical schema
    #[arg(long, default_value_t = false)]
    docs: bool,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// manifest version used to stamp `$id` / `$schema` on the canonical schema
    #[arg(long)]
    manifest_version: Option<String>,

    /// top-level heading of the documentation page
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// schema JSON file, or '-' for stdin
    #[arg(long, short, default_value = "-")]
    input: String,

    /// JSON Pointer selecting the schema inside the input (e.g. /components/manifest)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq filter selecting the schema inside the input
    #[arg(long)]
    jq_expr: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn read_source(&self) -> Result<String> {
        if self.input == "-" {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read schema from stdin")?;
            return Ok(source);
        }
        std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read schema file `{}`", self.input))
    }

    fn selection(&self) -> Selection {
        Selection {
            jq_expr: self.jq_expr.clone(),
            json_pointer: self.json_pointer.clone(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        // debug path
        if self.no_op {
            eprintln!("{self:#?}");
            return Ok(());
        }

        let source = self.input_settings.read_source()?;
        let graph = input::load_schema(&source, &self.input_settings.selection())
            .with_context(|| format!("failed to load schema from `{}`", self.input_settings.input))?;
        check_references(&graph).context("schema references do not resolve")?;

        let output = if self.docs {
            info!("rendering reference documentation");
            let options = DocOptions { title: self.title.clone() };
            render::generate_markdown(&graph, &options).context("failed to render documentation")?
        } else {
            info!("normalizing schema");
            let canonical = match self.manifest_version.as_deref() {
                Some(version) => {
                    let stamped = SchemaIdentity::new(version).stamp(&graph.to_node())?;
                    normalize::normalize(&stamped)
                }
                None => normalize::normalize_graph(&graph),
            }
            .context("failed to normalize schema")?;
            normalize::to_canonical_json(&canonical)?
        };

        write_output(self.out.as_ref(), &output)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, text: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create `{}`", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("failed to write `{}`", out.display()))?;
            info!(path = %out.display(), bytes = text.len(), "wrote output");
        }
        None => print!("{text}"),
    }
    Ok(())
}
