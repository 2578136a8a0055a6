use crate::app::formatter::OutputGenerator;
use crate::app::models::{
    join, CompilationConfig, Filesystem, FuzzConfig, ManifestEntry, ProjectLayout, TestEntry,
    TestInput,
};
use crate::app::scanner::Scanner;
use anyhow::{bail, Result};
use std::path::Path;

/// Builds the three analyzer configs from a scan of the project tree.
pub struct Generator<'a> {
    scanner: &'a Scanner,
    layout: ProjectLayout,
}

impl<'a> Generator<'a> {
    /// Paths in `layout` are normalized so they compare equal to discovered ones.
    pub fn new(scanner: &'a Scanner, layout: &ProjectLayout) -> Self {
        Self {
            scanner,
            layout: layout.normalized(),
        }
    }

    pub fn common_config(&self) -> Result<CompilationConfig> {
        let layout = &self.layout;
        let options = [
            ("-I", layout.include_dirs.as_slice()),
            ("-D", layout.defines.as_slice()),
            ("-U", layout.undefines.as_slice()),
        ];

        let patch_dir = join(&layout.test_dir, &layout.patch_fixture_dir);
        let input_dir = join(&layout.test_dir, &layout.input_fixture_dir);
        let mut files = self.mount(&patch_dir, "*.json", &layout.patch_fixture_dir)?;
        files.extend(self.mount(&input_dir, &self.prefix_glob(), &layout.input_fixture_dir)?);

        Ok(CompilationConfig {
            files: up_one_level(&layout.common_sources),
            compilation_cmd: OutputGenerator::options_string(&options),
            max_recursion_depth: layout.max_recursion_depth,
            filesystem: Filesystem { files },
        })
    }

    pub fn fuzz_config(&self) -> Result<FuzzConfig> {
        let layout = &self.layout;
        let mut sources = layout.fuzz_sources.clone();
        sources.push(layout.fuzz_harness.clone());

        let files = self.mount(
            &layout.fuzz_input_dir,
            &self.prefix_glob(),
            &layout.fuzz_input_dir,
        )?;

        Ok(FuzzConfig {
            files: up_one_level(&sources),
            filesystem: Filesystem { files },
        })
    }

    /// One entry per C test, then one per fuzz input. Both includes are the
    /// paths the earlier stages were written to.
    pub fn tis_config(&self, common_config: &str, fuzz_config: &str) -> Result<Vec<TestEntry>> {
        let mut entries: Vec<TestEntry> = self
            .test_files()?
            .into_iter()
            .map(|file| TestEntry {
                name: basename(&file),
                input: TestInput::Files(vec![file]),
                include: common_config.to_string(),
                extra_include: None,
            })
            .collect();

        let harness = basename(&self.layout.fuzz_harness);
        let inputs = self
            .scanner
            .glob(&self.layout.fuzz_input_dir, &self.prefix_glob())?;
        if inputs.is_empty() {
            log::warn!("No fuzz inputs found in {}", self.layout.fuzz_input_dir);
        }
        entries.extend(inputs.iter().map(|input| {
            let name = basename(input);
            TestEntry {
                name: format!("{} {}", harness, name),
                input: TestInput::Args(format!(" {}", join(&self.layout.fuzz_input_dir, &name))),
                include: common_config.to_string(),
                extra_include: Some(fuzz_config.to_string()),
            }
        }));

        Ok(entries)
    }

    /// Sorted C files of the test directory minus the denylist.
    ///
    /// A denylisted name that is not on disk is an error: the denylist is stale.
    pub fn test_files(&self) -> Result<Vec<String>> {
        let test_dir = &self.layout.test_dir;
        let mut files = self.scanner.glob(test_dir, "*.c")?;

        for excluded in &self.layout.excluded_tests {
            let path = join(test_dir, excluded);
            match files.iter().position(|f| *f == path) {
                Some(idx) => {
                    files.remove(idx);
                }
                None => bail!(
                    "Excluded test '{}' is not present in '{}'; the denylist is stale",
                    excluded,
                    test_dir
                ),
            }
        }

        log::info!("{} C test file(s) in {}", files.len(), test_dir);
        Ok(files)
    }

    fn prefix_glob(&self) -> String {
        format!("{}*", self.layout.input_prefix)
    }

    /// Mounts each match of `dir/pattern` as `virtual_dir/<basename>`, read from `../<path>`.
    fn mount(&self, dir: &str, pattern: &str, virtual_dir: &str) -> Result<Vec<ManifestEntry>> {
        let found = self.scanner.glob(dir, pattern)?;
        if found.is_empty() {
            log::warn!("No files match {}/{}", dir, pattern);
        }
        Ok(found
            .iter()
            .map(|file| ManifestEntry {
                name: join(virtual_dir, &basename(file)),
                from: join("..", file),
            })
            .collect())
    }
}

/// Configs live one directory below the root, so their paths climb back up.
fn up_one_level(files: &[String]) -> Vec<String> {
    files.iter().map(|f| join("..", f)).collect()
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
