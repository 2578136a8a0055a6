use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Where the project lives and what it looks like, after merging defaults,
/// the layout file and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub layout: ProjectLayout,
}

/// Names of every directory, source file and flag the generators emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub tool_dir: String,
    pub test_dir: String,
    pub fuzz_input_dir: String,
    /// Subdirectories of `test_dir` mounted into the common filesystem.
    pub patch_fixture_dir: String,
    pub input_fixture_dir: String,
    pub input_prefix: String,
    pub common_sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub undefines: Vec<String>,
    pub max_recursion_depth: u32,
    pub fuzz_sources: Vec<String>,
    pub fuzz_harness: String,
    pub excluded_tests: Vec<String>,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            tool_dir: "trustinsoft".to_string(),
            test_dir: "tests".to_string(),
            fuzz_input_dir: "fuzzing/inputs".to_string(),
            patch_fixture_dir: "json-patch-tests".to_string(),
            input_fixture_dir: "inputs".to_string(),
            input_prefix: "test".to_string(),
            common_sources: vec![
                "cJSON_Utils.c".to_string(),
                "tests/unity/src/unity.c".to_string(),
            ],
            include_dirs: Vec::new(),
            defines: vec!["UNITY_EXCLUDE_SETJMP_H".to_string()],
            undefines: Vec::new(),
            max_recursion_depth: 10000,
            fuzz_sources: vec!["cJSON.c".to_string()],
            fuzz_harness: "fuzzing/afl.c".to_string(),
            excluded_tests: vec!["unity_setup.c".to_string()],
        }
    }
}

impl ProjectLayout {
    pub fn common_config_path(&self) -> String {
        join(&self.tool_dir, "common.config")
    }

    pub fn fuzz_config_path(&self) -> String {
        join(&self.tool_dir, "fuzz.config")
    }

    pub fn tis_config_path(&self) -> String {
        "tis.config".to_string()
    }

    /// Same layout with every path in the form discovery reports, e.g. `./tests/` as `tests`.
    pub fn normalized(&self) -> Self {
        let all = |paths: &[String]| -> Vec<String> {
            paths.iter().map(|p| normalize(p)).collect()
        };
        Self {
            tool_dir: normalize(&self.tool_dir),
            test_dir: normalize(&self.test_dir),
            fuzz_input_dir: normalize(&self.fuzz_input_dir),
            patch_fixture_dir: normalize(&self.patch_fixture_dir),
            input_fixture_dir: normalize(&self.input_fixture_dir),
            common_sources: all(&self.common_sources),
            fuzz_sources: all(&self.fuzz_sources),
            fuzz_harness: normalize(&self.fuzz_harness),
            ..self.clone()
        }
    }

    /// Directories that must exist before anything is generated.
    pub fn required_dirs(&self) -> Vec<String> {
        vec![
            self.tool_dir.clone(),
            self.test_dir.clone(),
            self.fuzz_input_dir.clone(),
        ]
    }

    /// Fixed sources referenced by the configs; their presence marks the project root.
    pub fn required_files(&self) -> Vec<String> {
        self.common_sources
            .iter()
            .chain(self.fuzz_sources.iter())
            .chain(std::iter::once(&self.fuzz_harness))
            .cloned()
            .collect()
    }
}

/// Drops `.` segments and trailing separators and rejoins with `/`.
/// A path of only `.` segments becomes empty, which `join` treats as the root.
pub fn normalize(path: &str) -> String {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins two slash-separated path fragments the way the analyzer expects them.
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// One mount of a real file into the analyzer's virtual filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filesystem {
    pub files: Vec<ManifestEntry>,
}

/// Contents of `common.config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationConfig {
    pub files: Vec<String>,
    pub compilation_cmd: String,
    #[serde(rename = "val-clone-on-recursive-calls-max-depth")]
    pub max_recursion_depth: u32,
    pub filesystem: Filesystem,
}

/// Contents of `fuzz.config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzConfig {
    pub files: Vec<String>,
    pub filesystem: Filesystem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TestInput {
    #[serde(rename = "files")]
    Files(Vec<String>),
    #[serde(rename = "val-args")]
    Args(String),
}

/// One analysis run in `tis.config`.
///
/// A second include is serialized under the placeholder key `include_` and
/// renamed to `include` by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestEntry {
    pub name: String,
    #[serde(flatten)]
    pub input: TestInput,
    pub include: String,
    #[serde(rename = "include_", skip_serializing_if = "Option::is_none")]
    pub extra_include: Option<String>,
}
