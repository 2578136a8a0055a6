use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Read-only view of the project tree, rooted where the configs are written.
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fails on the first missing directory or file, before anything is written.
    pub fn precheck(&self, dirs: &[String], files: &[String]) -> Result<()> {
        if !self.root.is_dir() {
            bail!("Project root '{}' is not a directory.", self.root.display());
        }
        for dir in dirs {
            if !self.root.join(dir).is_dir() {
                bail!("Directory '{}' not found.", dir);
            }
            println!("   > OK! Directory '{}' exists.", dir);
        }
        for file in files {
            if !self.root.join(file).is_file() {
                bail!(
                    "File '{}' not found. Is '{}' the project root?",
                    file,
                    self.root.display()
                );
            }
            println!("   > OK! File '{}' exists.", file);
        }
        Ok(())
    }

    /// Lists regular files directly inside `dir` whose name matches `pattern`.
    ///
    /// Paths come back relative to the root with `/` separators, sorted.
    /// Hidden entries are skipped and subdirectories are not descended into.
    pub fn glob(&self, dir: &str, pattern: &str) -> Result<Vec<String>> {
        let matcher = build_globset(&[pattern.to_string()])?;
        let base = self.root.join(dir);
        if !base.is_dir() {
            log::warn!("{} is not a directory, nothing to match", dir);
            return Ok(Vec::new());
        }

        // Fixture trees are often git-ignored, so only the hidden filter stays on.
        let walker = WalkBuilder::new(&base)
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .build();

        let mut found = Vec::new();
        for result in walker {
            let entry = result.with_context(|| format!("Failed to walk {}", base.display()))?;
            if entry.depth() == 0 || !entry.path().is_file() {
                continue;
            }
            if !matcher.is_match(Path::new(entry.file_name())) {
                continue;
            }
            found.push(self.relative(entry.path())?);
        }

        found.sort();
        log::debug!("{}/{}: {} match(es)", dir, pattern, found.len());
        Ok(found)
    }

    /// Emitted paths must name real files, so non-UTF-8 names are an error rather than lossy.
    fn relative(&self, path: &Path) -> Result<String> {
        let relative = diff_paths(path, &self.root).with_context(|| {
            format!(
                "Cannot express {} relative to {}",
                path.display(),
                self.root.display()
            )
        })?;
        match relative.to_str() {
            Some(s) => Ok(s.replace('\\', "/")),
            None => bail!("File name {:?} is not valid UTF-8", path),
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}
