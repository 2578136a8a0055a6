use crate::app::cli::Cli;
use crate::app::models::{ProjectLayout, RuntimeConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Layout file looked up under the project root when `--layout` is not given.
const DEFAULT_LAYOUT_FILE: &str = "trustinsoft/regenerate.toml";

/// Every key is optional; absent keys keep the built-in layout.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    tool_dir: Option<String>,
    test_dir: Option<String>,
    fuzz_input_dir: Option<String>,
    patch_fixture_dir: Option<String>,
    input_fixture_dir: Option<String>,
    input_prefix: Option<String>,
    common_sources: Option<Vec<String>>,
    include_dirs: Option<Vec<String>>,
    defines: Option<Vec<String>>,
    undefines: Option<Vec<String>>,
    max_recursion_depth: Option<u32>,
    fuzz_sources: Option<Vec<String>>,
    fuzz_harness: Option<String>,
    excluded_tests: Option<Vec<String>>,
}

fn load_layout_file(path: &Path, required: bool) -> Result<LayoutFile> {
    if !path.exists() {
        if required {
            anyhow::bail!("Layout file {:?} does not exist", path);
        }
        return Ok(LayoutFile::default());
    }

    let content = fs::read_to_string(path)
        .context(format!("Failed to read layout at {:?}", path))?;

    toml::from_str(&content).context(format!("Failed to parse {:?}", path))
}

fn apply(file: LayoutFile) -> ProjectLayout {
    let base = ProjectLayout::default();
    ProjectLayout {
        tool_dir: file.tool_dir.unwrap_or(base.tool_dir),
        test_dir: file.test_dir.unwrap_or(base.test_dir),
        fuzz_input_dir: file.fuzz_input_dir.unwrap_or(base.fuzz_input_dir),
        patch_fixture_dir: file.patch_fixture_dir.unwrap_or(base.patch_fixture_dir),
        input_fixture_dir: file.input_fixture_dir.unwrap_or(base.input_fixture_dir),
        input_prefix: file.input_prefix.unwrap_or(base.input_prefix),
        common_sources: file.common_sources.unwrap_or(base.common_sources),
        include_dirs: file.include_dirs.unwrap_or(base.include_dirs),
        defines: file.defines.unwrap_or(base.defines),
        undefines: file.undefines.unwrap_or(base.undefines),
        max_recursion_depth: file.max_recursion_depth.unwrap_or(base.max_recursion_depth),
        fuzz_sources: file.fuzz_sources.unwrap_or(base.fuzz_sources),
        fuzz_harness: file.fuzz_harness.unwrap_or(base.fuzz_harness),
        excluded_tests: file.excluded_tests.unwrap_or(base.excluded_tests),
    }
}

fn merge_vecs(base: Vec<String>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = base;
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

pub fn resolve_config(cli: Cli, current_dir: PathBuf) -> Result<RuntimeConfig> {
    let root = cli.root.unwrap_or(current_dir);

    // Explicit --layout must exist; the default one is optional.
    let (layout_path, required) = match cli.layout {
        Some(path) => (path, true),
        None => (root.join(DEFAULT_LAYOUT_FILE), false),
    };
    let mut layout = apply(load_layout_file(&layout_path, required)?).normalized();
    layout.excluded_tests = merge_vecs(layout.excluded_tests, cli.exclude_test);

    log::debug!("Resolved layout for {}: {:?}", root.display(), layout);
    Ok(RuntimeConfig { root, layout })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(root: &Path) -> Cli {
        Cli {
            root: Some(root.to_path_buf()),
            layout: None,
            exclude_test: None,
        }
    }

    #[test]
    fn defaults_without_layout_file() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let config = resolve_config(cli(tmp.path()), PathBuf::from("/elsewhere")).unwrap();
        assert_eq!(config.root, tmp.path());
        assert_eq!(config.layout, ProjectLayout::default());
    }

    #[test]
    fn layout_file_overrides_fields() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(tmp.path().join("trustinsoft")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_LAYOUT_FILE),
            "defines = [\"A\", \"B\"]\nmax_recursion_depth = 42\nexcluded_tests = []\n",
        )
        .unwrap();

        let layout = resolve_config(cli(tmp.path()), PathBuf::new()).unwrap().layout;
        assert_eq!(layout.defines, ["A", "B"]);
        assert_eq!(layout.max_recursion_depth, 42);
        assert!(layout.excluded_tests.is_empty());
        assert_eq!(layout.test_dir, "tests");
    }

    #[test]
    fn layout_file_paths_are_normalized() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(tmp.path().join("trustinsoft")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_LAYOUT_FILE),
            "test_dir = \"./tests\"\nfuzz_input_dir = \"fuzzing/./inputs/\"\n",
        )
        .unwrap();

        let layout = resolve_config(cli(tmp.path()), PathBuf::new()).unwrap().layout;
        assert_eq!(layout.test_dir, "tests");
        assert_eq!(layout.fuzz_input_dir, "fuzzing/inputs");
    }

    #[test]
    fn unknown_layout_key_is_rejected() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let path = tmp.path().join("layout.toml");
        fs::write(&path, "test_directory = \"t\"\n").unwrap();

        let mut args = cli(tmp.path());
        args.layout = Some(path);
        assert!(resolve_config(args, PathBuf::new()).is_err());
    }

    #[test]
    fn explicit_layout_must_exist() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let mut args = cli(tmp.path());
        args.layout = Some(tmp.path().join("missing.toml"));
        assert!(resolve_config(args, PathBuf::new()).is_err());
    }

    #[test]
    fn cli_excludes_append_without_duplicates() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let mut args = cli(tmp.path());
        args.exclude_test = Some(vec!["misc_tests.c".into(), "unity_setup.c".into()]);

        let layout = resolve_config(args, PathBuf::new()).unwrap().layout;
        assert_eq!(layout.excluded_tests, ["unity_setup.c", "misc_tests.c"]);
    }
}
