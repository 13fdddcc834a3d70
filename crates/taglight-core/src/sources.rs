//! Source providers for project discovery

use eyre::{Result, WrapErr};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of the files a project is built from
pub const GO_EXTENSION: &str = "go";

/// Check whether a path names a Go source file
pub fn is_go_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(GO_EXTENSION))
}

/// Files read from a provider, plus the ones that could not be read
#[derive(Debug, Default)]
pub struct SourceSet {
    pub files: Vec<(PathBuf, Vec<u8>)>,
    /// Paths that were found but not read, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

/// Trait for providing the source files of a project
pub trait Sources {
    /// Read all sources. Individual unreadable files end up in
    /// [`SourceSet::skipped`] instead of failing the whole read.
    fn read(self) -> Result<SourceSet>;
}

/// Go files directly inside one directory (a Go package is a directory,
/// so this does not recurse). Honours `.gitignore`.
pub struct DirSources {
    root: PathBuf,
    exclude: Vec<String>,
}

impl DirSources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
        }
    }

    /// Glob patterns matched against file names; matching files are skipped
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            builder.add(
                Glob::new(pattern).wrap_err_with(|| format!("Invalid exclude glob {pattern:?}"))?,
            );
        }
        Ok(builder.build()?)
    }

    /// Paths of the Go files this provider would read, sorted
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        use ignore::WalkBuilder;

        let exclude = self.exclude_set()?;
        let walker = WalkBuilder::new(&self.root)
            .max_depth(Some(1))
            .follow_links(true)
            .hidden(true)
            .git_ignore(true)
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.wrap_err_with(|| format!("Failed to walk {}", self.root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) || !is_go_file(path) {
                continue;
            }
            if path.file_name().is_some_and(|name| exclude.is_match(name)) {
                debug!("excluded {}", path.display());
                continue;
            }
            paths.push(path.to_path_buf());
        }
        paths.sort();
        Ok(paths)
    }
}

impl Sources for DirSources {
    fn read(self) -> Result<SourceSet> {
        let mut set = SourceSet::default();
        for path in self.paths()? {
            match std::fs::read(&path) {
                Ok(content) => set.files.push((path, content)),
                Err(e) => {
                    warn!("skipping unreadable file {}: {}", path.display(), e);
                    set.skipped.push((path, e.to_string()));
                }
            }
        }
        Ok(set)
    }
}

/// In-memory sources, for tests and for hosts that already hold buffers
#[derive(Debug, Default)]
pub struct MemorySources {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }
}

impl Sources for MemorySources {
    fn read(self) -> Result<SourceSet> {
        Ok(SourceSet {
            files: self.files,
            skipped: Vec::new(),
        })
    }
}
