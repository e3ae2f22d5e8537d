//! Runs every `fixtures/*.json` through both output modes and checks that
//! the canonical schema is idempotent and both outputs are byte-stable.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use colored::Colorize;

use manifest_schema::input::{load_schema, Selection};
use manifest_schema::normalize::{normalize_graph, to_canonical_json};
use manifest_schema::reachability::collect_used_defs;
use manifest_schema::render::{render, DocOptions};

fn check_fixture(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let graph = load_schema(&source, &Selection::default())?;

    let canonical = to_canonical_json(&normalize_graph(&graph)?)?;
    let again = to_canonical_json(&normalize_graph(&graph)?)?;
    if canonical != again {
        bail!("canonical output differs between runs");
    }
    let reparsed = load_schema(&canonical, &Selection::default())?;
    if to_canonical_json(&normalize_graph(&reparsed)?)? != canonical {
        bail!("normalization is not idempotent");
    }

    let options = DocOptions::default();
    let docs = render(&graph, &options)?;
    if render(&graph, &options)? != docs {
        bail!("documentation differs between runs");
    }
    let headings = docs.lines().filter(|line| line.starts_with("## ")).count();
    let used = collect_used_defs(&graph).len();
    if headings != used {
        bail!("{headings} definition sections for {used} used definitions");
    }

    Ok(format!("{} canonical bytes, {} doc sections", canonical.len(), headings))
}

fn main() -> ExitCode {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..");
    let pattern = root.join("fixtures").join("*.json");
    let paths = match glob::glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect::<Vec<_>>(),
        Err(error) => {
            eprintln!("{} bad fixture pattern: {error}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0usize;
    for path in &paths {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match check_fixture(path) {
            Ok(summary) => println!("{} {name} ({summary})", "PASS".green().bold()),
            Err(error) => {
                failures += 1;
                println!("{} {name}: {error:#}", "FAIL".red().bold());
            }
        }
    }

    println!("{} fixtures, {} failed", paths.len(), failures);
    if failures == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
