use manifest_schema::input::{load_schema, Selection};
use manifest_schema::reachability::{collect_used_defs, top_level_defs};
use manifest_schema::render::{render, DocOptions};
use manifest_schema::{SchemaError, SchemaGraph};
use pretty_assertions::assert_eq;

const MANIFEST: &str = include_str!("../fixtures/manifest.json");
const RECURSIVE: &str = include_str!("../fixtures/recursive.json");

fn load(src: &str) -> SchemaGraph {
    load_schema(src, &Selection::default()).expect("fixture loads")
}

fn docs(src: &str) -> String {
    render(&load(src), &DocOptions::default()).expect("renders")
}

#[test]
fn every_used_definition_gets_exactly_one_section() {
    let graph = load(MANIFEST);
    let out = docs(MANIFEST);
    let headings: Vec<&str> = out.lines().filter(|l| l.starts_with("## ")).collect();
    assert_eq!(
        headings,
        vec![
            "## Package",
            "## Activation",
            "## Build",
            "## BuildBackend",
            "## ChannelInlineTable",
            "## ChannelPriority",
            "## LibcFamily",
            "## Platform",
            "## SystemRequirements",
            "## Workspace",
        ]
    );
    assert_eq!(headings.len(), collect_used_defs(&graph).len());
    assert!(!out.contains("Unreferenced"));
    assert!(!out.contains("ghost"));
}

#[test]
fn primary_sections_come_from_plain_root_refs() {
    let graph = load(MANIFEST);
    let referenced: Vec<String> = top_level_defs(&graph).into_iter().collect();
    assert_eq!(referenced, vec!["Activation", "Package", "SystemRequirements", "Workspace"]);

    let out = docs(MANIFEST);
    // `package` is the only root property that is a bare `$ref`.
    assert!(out.starts_with("# pixi.toml Schema Documentation\n\n## Package\n"));
    // `project` and `workspace` are optional unions over `Workspace`, so it is
    // documented once, from the appendix, under its own name.
    assert!(out.contains("## Workspace\nThe project's metadata information.\n\n### `workspace.channel-priority`"));
    assert!(out.contains("### `workspace.name`"));
    assert!(!out.contains("### `project."));
}

#[test]
fn nested_references_flatten_into_dotted_paths() {
    let out = docs(MANIFEST);
    assert!(out.contains("### `package.build.backend.name`\n**Type:** String\n"));
    assert!(out.contains(
        "### `package.build.channels`\n**Type:** List[String | [ChannelInlineTable](#channelinlinetable)]\n"
    ));
    assert!(out.contains("### `workspace.platforms`\n**Type:** List[[Platform](#platform)]\n\n**Required:** Yes\n"));
    assert!(out.contains("### `system-requirements.libc`\n**Type:** [LibcFamily](#libcfamily) | String\n"));
}

#[test]
fn example_snippets() {
    let out = docs(MANIFEST);
    assert!(out.contains("```toml\n[activation]\nkey = \"value\"\nARGUMENT = \"value\"\n```"));
    assert!(out.contains("```toml\n[activation]\nscripts = [\"activate.sh\"]\n```"));
    assert!(out.contains("```toml\n[activation]\nscripts = [\"activate.bat\"]\n```"));
    assert!(out.contains("```toml\n[workspace]\nchannel-priority = \"strict\"\n```"));
    assert!(out.contains("```toml\n[package]\nversion = \"1.2.3\"\n```"));
}

#[test]
fn appendix_sections_use_the_definition_name_as_prefix() {
    let out = docs(MANIFEST);
    assert!(out.contains("## ChannelInlineTable\nA precise description of a `conda` channel, with an optional priority.\n\n### `channel-inline-table.channel`\n"));
    assert!(out.contains("### `channel-inline-table.channel`\n**Type:** String | String\n\n**Required:** Yes\n"));
    assert!(out.contains("### `libc-family.family`"));
}

#[test]
fn recursive_definitions_terminate() {
    let out = docs(RECURSIVE);
    assert!(out.contains("### `tree.label`\n**Type:** String\n\n**Required:** Yes\n"));
    assert!(out.contains("### `tree.children`\n**Type:** List[[Node](#node)]\n"));
    assert!(out.contains("### `tree.mirror.reflection`\n**Type:** [Node](#node)\n"));
    assert!(out.contains("## Mirror\n### `mirror.reflection.label`"));
    assert!(out.contains("### `mirror.reflection.mirror`\n**Type:** [Mirror](#mirror)\n"));
}

#[test]
fn output_is_deterministic() {
    assert_eq!(docs(MANIFEST), docs(MANIFEST));
}

#[test]
fn dead_reference_fails_the_whole_page() {
    let broken = MANIFEST.replace("#/$defs/LibcFamily", "#/$defs/LibcFamilyTypo");
    let err = render(&load(&broken), &DocOptions::default()).unwrap_err();
    assert!(matches!(err, SchemaError::UnresolvedReference { ref name, .. } if name == "LibcFamilyTypo"));
}
