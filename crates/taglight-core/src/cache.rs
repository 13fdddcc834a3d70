//! Per-project cache of parsed Go sources
//!
//! A [`Project`] groups every discovered file by its declared package. The
//! file the host is editing is merged in on every update, replacing whatever
//! the cache held for that path.

use crate::parse::{GoParser, ParseError, ParsedFile};
use crate::sources::Sources;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why the active file could not be attached to a package
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageLookupError {
    /// No package matched and the cache holds none to fall back to
    #[error("no package {wanted} found and the project has no packages")]
    Absent { wanted: String },

    /// No package matched and several exist, so none can be picked
    #[error("no package {wanted} found among {} candidates: {}", .available.len(), .available.join(", "))]
    Ambiguous {
        wanted: String,
        available: Vec<String>,
    },
}

/// Errors from loading or updating a project
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Lookup(#[from] PackageLookupError),

    #[error("failed to read project sources: {0}")]
    Sources(String),
}

/// A Go package: one directory's files sharing a package clause
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    files: BTreeMap<PathBuf, ParsedFile>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the file at its path
    pub fn insert(&mut self, file: ParsedFile) -> Option<ParsedFile> {
        self.files.insert(file.path.clone(), file)
    }

    fn remove(&mut self, path: &Path) -> Option<ParsedFile> {
        self.files.remove(path)
    }

    pub fn file(&self, path: &Path) -> Option<&ParsedFile> {
        self.files.get(path)
    }

    /// All member files, ordered by path
    pub fn files(&self) -> Vec<&ParsedFile> {
        self.files.values().collect()
    }

    /// Position of `path` in [`Package::files`]
    pub fn file_index(&self, path: &Path) -> Option<usize> {
        self.files.keys().position(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Pick the package a file belongs to.
///
/// Tries the declared package name, then the file stem, then the sole
/// package of the project. Anything else is an error.
pub fn lookup_package(
    packages: &BTreeMap<String, Package>,
    declared: Option<&str>,
    stem: Option<&str>,
) -> Result<String, PackageLookupError> {
    for candidate in [declared, stem].into_iter().flatten() {
        if packages.contains_key(candidate) {
            return Ok(candidate.to_string());
        }
    }

    let mut names = packages.keys();
    if let (Some(only), None) = (names.next(), names.next()) {
        return Ok(only.clone());
    }

    let wanted = match (declared, stem) {
        (Some(d), Some(s)) => format!("{d:?} or {s:?}"),
        (Some(name), None) | (None, Some(name)) => format!("{name:?}"),
        (None, None) => "<unnamed>".to_string(),
    };
    if packages.is_empty() {
        Err(PackageLookupError::Absent { wanted })
    } else {
        Err(PackageLookupError::Ambiguous {
            wanted,
            available: packages.keys().cloned().collect(),
        })
    }
}

/// The cache for one project directory
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    packages: BTreeMap<String, Package>,
    parser: GoParser,
}

impl Project {
    /// An empty project rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self {
            root: root.into(),
            packages: BTreeMap::new(),
            parser: GoParser::new()?,
        })
    }

    /// Discover and parse every source file `sources` provides.
    ///
    /// Files that fail to parse or carry no package clause are logged and
    /// left out.
    pub fn load(root: impl Into<PathBuf>, sources: impl Sources) -> Result<Self, CacheError> {
        let mut project = Self::new(root)?;
        let set = sources
            .read()
            .map_err(|e| CacheError::Sources(format!("{e:#}")))?;
        for (path, reason) in &set.skipped {
            warn!("not loading {}: {}", path.display(), reason);
        }

        for parsed in parse_all(set.files, &mut project.parser) {
            let file = match parsed {
                Ok(file) => file,
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            };
            let Some(name) = file.package_name.clone() else {
                warn!("{} has no package clause, skipping", file.path.display());
                continue;
            };
            debug!("discovered {} in package {}", file.path.display(), name);
            project
                .packages
                .entry(name.clone())
                .or_insert_with(|| Package::new(name))
                .insert(file);
        }

        info!(
            "loaded {} packages ({} files) from {}",
            project.packages.len(),
            project.packages.values().map(Package::len).sum::<usize>(),
            project.root.display()
        );
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Parse `content` as the file at `path` and store it in its package,
    /// replacing any earlier version of that path.
    ///
    /// The path is removed from every other package first, so a file whose
    /// package clause changed does not linger in its old package.
    pub fn merge_active_file(
        &mut self,
        path: &Path,
        content: Vec<u8>,
    ) -> Result<&Package, CacheError> {
        let file = self.parser.parse(path, content)?;
        if file.has_errors() {
            debug!("{} parsed with syntax errors", path.display());
        }

        let name = lookup_package(&self.packages, file.package_name.as_deref(), file.stem())?;
        for (other, package) in self.packages.iter_mut() {
            if *other != name && package.remove(path).is_some() {
                debug!("moved {} out of package {}", path.display(), other);
            }
        }

        let package = self
            .packages
            .get_mut(&name)
            .ok_or(PackageLookupError::Absent {
                wanted: name.clone(),
            })?;
        package.insert(file);
        Ok(package)
    }
}

#[cfg(feature = "parallel")]
fn parse_all(
    files: Vec<(PathBuf, Vec<u8>)>,
    _parser: &mut GoParser,
) -> Vec<Result<ParsedFile, ParseError>> {
    use rayon::prelude::*;

    files
        .into_par_iter()
        .map_init(GoParser::new, |parser, (path, content)| match parser {
            Ok(parser) => parser.parse(&path, content),
            Err(e) => Err(ParseError::Grammar(e.to_string())),
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn parse_all(
    files: Vec<(PathBuf, Vec<u8>)>,
    parser: &mut GoParser,
) -> Vec<Result<ParsedFile, ParseError>> {
    files
        .into_iter()
        .map(|(path, content)| parser.parse(&path, content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySources;

    fn packages(names: &[&str]) -> BTreeMap<String, Package> {
        names
            .iter()
            .map(|n| (n.to_string(), Package::new(*n)))
            .collect()
    }

    #[test]
    fn test_lookup_by_declared_name() {
        let pkgs = packages(&["a", "b"]);
        assert_eq!(lookup_package(&pkgs, Some("b"), Some("x")).unwrap(), "b");
    }

    #[test]
    fn test_lookup_falls_back_to_stem() {
        let pkgs = packages(&["a", "widget"]);
        assert_eq!(
            lookup_package(&pkgs, Some("nope"), Some("widget")).unwrap(),
            "widget"
        );
    }

    #[test]
    fn test_lookup_falls_back_to_sole_package() {
        let pkgs = packages(&["only"]);
        assert_eq!(lookup_package(&pkgs, Some("x"), None).unwrap(), "only");
        assert_eq!(lookup_package(&pkgs, None, None).unwrap(), "only");
    }

    #[test]
    fn test_lookup_ambiguous() {
        let pkgs = packages(&["a", "b"]);
        let err = lookup_package(&pkgs, Some("c"), Some("d")).unwrap_err();
        assert_eq!(
            err,
            PackageLookupError::Ambiguous {
                wanted: "\"c\" or \"d\"".to_string(),
                available: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_lookup_absent() {
        let err = lookup_package(&BTreeMap::new(), Some("p"), None).unwrap_err();
        assert!(matches!(err, PackageLookupError::Absent { .. }));
    }

    #[test]
    fn test_load_groups_by_package_clause() {
        let project = Project::load(
            "/proj",
            MemorySources::new()
                .add("/proj/a.go", "package p\n")
                .add("/proj/b.go", "package p\n")
                .add("/proj/a_test.go", "package p_test\n")
                .add("/proj/broken.go", "func F() {}\n"),
        )
        .unwrap();

        assert_eq!(project.package("p").unwrap().len(), 2);
        assert_eq!(project.package("p_test").unwrap().len(), 1);
        assert_eq!(project.packages().count(), 2);
    }

    #[test]
    fn test_merge_overwrites_same_path() {
        let mut project = Project::load(
            "/proj",
            MemorySources::new()
                .add("/proj/a.go", "package p\nconst A = 1\n")
                .add("/proj/b.go", "package p\n"),
        )
        .unwrap();

        let path = Path::new("/proj/a.go");
        let package = project
            .merge_active_file(path, b"package p\nconst B = 2\n".to_vec())
            .unwrap();
        assert_eq!(package.len(), 2);
        assert_eq!(package.file(path).unwrap().source, b"package p\nconst B = 2\n");
        assert_eq!(package.file_index(path), Some(0));
    }

    #[test]
    fn test_merge_new_file_joins_package() {
        let mut project =
            Project::load("/proj", MemorySources::new().add("/proj/a.go", "package p\n")).unwrap();
        let package = project
            .merge_active_file(Path::new("/proj/new.go"), b"package p\n".to_vec())
            .unwrap();
        assert_eq!(package.name(), "p");
        assert_eq!(package.len(), 2);
    }

    #[test]
    fn test_merge_moves_file_between_packages() {
        let mut project = Project::load(
            "/proj",
            MemorySources::new()
                .add("/proj/a.go", "package p\n")
                .add("/proj/a_test.go", "package p_test\n"),
        )
        .unwrap();
        project
            .merge_active_file(Path::new("/proj/a_test.go"), b"package p\n".to_vec())
            .unwrap();
        assert_eq!(project.package("p").unwrap().len(), 2);
        assert!(project.package("p_test").unwrap().is_empty());
    }

    #[test]
    fn test_merge_without_any_package_fails() {
        let mut project = Project::new("/proj").unwrap();
        let err = project
            .merge_active_file(Path::new("/proj/a.go"), b"package p\n".to_vec())
            .unwrap_err();
        assert!(matches!(
            err,
            CacheError::Lookup(PackageLookupError::Absent { .. })
        ));
    }
}
