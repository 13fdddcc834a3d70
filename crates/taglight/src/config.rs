//! Launch arguments and the optional per-package config file
//!
//! Config lives at `taglight.toml` inside the package directory.

use clap::Parser;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the package directory
pub const CONFIG_FILE: &str = "taglight.toml";

/// Debug log location when the config file names none
pub const DEFAULT_LOG_FILE: &str = "taglight.log";

/// Positional arguments as the host passes them
#[derive(Debug, Parser)]
#[command(
    name = "taglight",
    about = "Tag Go identifiers for an editor host",
    disable_help_subcommand = true
)]
pub struct Args {
    /// Name the host knows this helper by
    pub program_name: String,

    /// 1 to write a debug log, 0 otherwise
    #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
    pub debug: u8,

    /// File being edited
    pub active_file: PathBuf,

    /// Directory of the active file's package
    pub package_dir: PathBuf,

    /// `[project-root] [connect-path listen-path]`
    #[arg(num_args = 0..=3)]
    pub rest: Vec<PathBuf>,
}

/// Which channel requests and responses travel over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// Requests on stdin, responses on stdout
    Stream,
    /// Responses written to a socket we connect to, requests read from a
    /// socket we listen on
    Socket { connect: PathBuf, listen: PathBuf },
}

/// Everything the process needs to start serving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program_name: String,
    pub debug: bool,
    pub active_file: PathBuf,
    pub package_dir: PathBuf,
    pub project_root: Option<PathBuf>,
    pub transport: TransportKind,
}

impl Launch {
    /// Interpret the optional trailing arguments by their count.
    ///
    /// Paths are made absolute against the current directory, so a later
    /// change into the project root does not move them.
    pub fn from_args(args: Args) -> io::Result<Self> {
        let absolute = |path: PathBuf| std::path::absolute(path);

        let mut rest = args.rest.into_iter();
        let (project_root, transport) = match (rest.next(), rest.next(), rest.next()) {
            (None, _, _) => (None, TransportKind::Stream),
            (Some(root), None, _) => (Some(root), TransportKind::Stream),
            (Some(connect), Some(listen), None) => (
                None,
                TransportKind::Socket {
                    connect: absolute(connect)?,
                    listen: absolute(listen)?,
                },
            ),
            (Some(root), Some(connect), Some(listen)) => (
                Some(root),
                TransportKind::Socket {
                    connect: absolute(connect)?,
                    listen: absolute(listen)?,
                },
            ),
        };

        Ok(Self {
            program_name: args.program_name,
            debug: args.debug == 1,
            active_file: absolute(args.active_file)?,
            package_dir: absolute(args.package_dir)?,
            project_root: project_root.map(absolute).transpose()?,
            transport,
        })
    }
}

/// Contents of `taglight.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Globs matched against file names; matching files are not loaded
    pub exclude: Vec<String>,

    /// Where the debug log goes
    pub log_file: Option<PathBuf>,

    /// Tracing filter directive, e.g. `taglight=trace`
    pub log_filter: Option<String>,
}

/// Why `taglight.toml` was ignored
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl FileConfig {
    /// Load the config of `package_dir`. A missing file gives the defaults.
    pub fn load(package_dir: &Path) -> Result<Self, ConfigError> {
        let path = package_dir.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn log_file(&self) -> &Path {
        self.log_file
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_LOG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Launch, clap::Error> {
        let args = Args::try_parse_from(std::iter::once("taglight").chain(args.iter().copied()))?;
        Ok(Launch::from_args(args).unwrap())
    }

    #[test]
    fn test_four_arguments_select_stream() {
        let launch = parse(&["gopls-tags", "0", "/p/a.go", "/p"]).unwrap();
        assert_eq!(launch.program_name, "gopls-tags");
        assert!(!launch.debug);
        assert_eq!(launch.active_file, PathBuf::from("/p/a.go"));
        assert_eq!(launch.project_root, None);
        assert_eq!(launch.transport, TransportKind::Stream);
    }

    #[test]
    fn test_five_arguments_add_project_root() {
        let launch = parse(&["t", "1", "/p/a.go", "/p", "/root"]).unwrap();
        assert!(launch.debug);
        assert_eq!(launch.project_root, Some(PathBuf::from("/root")));
        assert_eq!(launch.transport, TransportKind::Stream);
    }

    #[test]
    fn test_six_and_seven_arguments_select_socket() {
        let socket = TransportKind::Socket {
            connect: PathBuf::from("/tmp/w.sock"),
            listen: PathBuf::from("/tmp/r.sock"),
        };

        let six = parse(&["t", "0", "/p/a.go", "/p", "/tmp/w.sock", "/tmp/r.sock"]).unwrap();
        assert_eq!(six.project_root, None);
        assert_eq!(six.transport, socket);

        let seven = parse(&["t", "0", "/p/a.go", "/p", "/root", "/tmp/w.sock", "/tmp/r.sock"])
            .unwrap();
        assert_eq!(seven.project_root, Some(PathBuf::from("/root")));
        assert_eq!(seven.transport, socket);
    }

    #[test]
    fn test_misuse_is_rejected() {
        assert!(parse(&["t", "0", "/p/a.go"]).is_err());
        assert!(parse(&["t", "0", "/p/a.go", "/p", "a", "b", "c", "d"]).is_err());
        assert!(parse(&["t", "2", "/p/a.go", "/p"]).is_err());
        assert!(parse(&["t", "yes", "/p/a.go", "/p"]).is_err());
    }

    #[test]
    fn test_relative_paths_become_absolute() {
        let launch = parse(&["t", "0", "a.go", "."]).unwrap();
        assert!(launch.active_file.is_absolute());
        assert!(launch.package_dir.is_absolute());
    }

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(dir.path()).unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.log_file(), Path::new(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "exclude = [\"gen_*.go\"]\nlog_file = \"/tmp/t.log\"\nlog_filter = \"taglight=trace\"\n",
        )
        .unwrap();

        let config = FileConfig::load(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["gen_*.go".to_string()]);
        assert_eq!(config.log_file(), Path::new("/tmp/t.log"));
        assert_eq!(config.log_filter.as_deref(), Some("taglight=trace"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = 3\n").unwrap();
        assert!(matches!(
            FileConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
