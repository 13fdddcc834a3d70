//! The request/response loop
//!
//! Each request carries the full text of the active file. The session
//! merges it into the project cache, resolves the file's package, and
//! answers with the tag records of the active file.

use crate::transport::{Transport, TransportError};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use taglight_core::{
    CacheError, GoResolver, Project, Resolver, TagRecord, resolve_package, tag_file,
};
use taglight_proto::encode_records;
use tracing::{debug, error, info};

/// Where the session is in its update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Receiving,
    Merging,
    Resolving,
    Classifying,
    Emitting,
    Aborted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Receiving => "receiving",
            Phase::Merging => "merging",
            Phase::Resolving => "resolving",
            Phase::Classifying => "classifying",
            Phase::Emitting => "emitting",
            Phase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// The current phase, plus whoever wants to hear about changes
struct PhaseState {
    current: Phase,
    hook: Option<Box<dyn FnMut(Phase) + Send>>,
}

impl PhaseState {
    fn enter(&mut self, next: Phase) {
        debug!("{} -> {}", self.current, next);
        self.current = next;
        if let Some(hook) = &mut self.hook {
            hook(next);
        }
    }
}

/// Conditions that end the session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to merge {}", path.display())]
    Merge {
        path: PathBuf,
        #[source]
        source: CacheError,
    },

    #[error("{} is missing from package {package} after the merge", path.display())]
    NotInPackage { path: PathBuf, package: String },
}

/// One host connection's worth of state
pub struct Session<R = GoResolver> {
    project: Project,
    active: PathBuf,
    resolver: R,
    phase: PhaseState,
}

impl Session<GoResolver> {
    pub fn new(project: Project, active: impl Into<PathBuf>) -> Self {
        Self::with_resolver(project, active, GoResolver::new())
    }
}

impl<R: Resolver> Session<R> {
    pub fn with_resolver(project: Project, active: impl Into<PathBuf>, resolver: R) -> Self {
        Self {
            project,
            active: active.into(),
            resolver,
            phase: PhaseState {
                current: Phase::Idle,
                hook: None,
            },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.current
    }

    /// Call `hook` with every phase the session enters
    pub fn on_phase(&mut self, hook: impl FnMut(Phase) + Send + 'static) {
        self.phase.hook = Some(Box::new(hook));
    }

    fn enter(&mut self, phase: Phase) {
        self.phase.enter(phase);
    }

    /// Tag new content of the active file.
    ///
    /// Ends in [`Phase::Classifying`] with the records not yet sent, or in
    /// [`Phase::Aborted`] on a fatal error.
    pub fn update(&mut self, content: Vec<u8>) -> Result<Vec<TagRecord>, SessionError> {
        let result = self.cycle(content);
        if result.is_err() {
            self.enter(Phase::Aborted);
        }
        result
    }

    fn cycle(&mut self, content: Vec<u8>) -> Result<Vec<TagRecord>, SessionError> {
        self.enter(Phase::Merging);
        let package = self
            .project
            .merge_active_file(&self.active, content)
            .map_err(|source| SessionError::Merge {
                path: self.active.clone(),
                source,
            })?;
        let files = package.files();
        let active = package
            .file_index(&self.active)
            .ok_or_else(|| SessionError::NotInPackage {
                path: self.active.clone(),
                package: package.name().to_string(),
            })?;

        self.phase.enter(Phase::Resolving);
        let index = resolve_package(&mut self.resolver, &files);

        self.phase.enter(Phase::Classifying);
        let records = tag_file(&index, active, &files[active].lines);
        debug!(
            "{} records for {} ({} symbols, {} occurrences in {} files)",
            records.len(),
            self.active.display(),
            index.symbols().len(),
            index.occurrences().len(),
            files.len()
        );
        Ok(records)
    }

    /// Serve requests until the host closes the channel. Returns the
    /// number of requests answered.
    pub fn run(&mut self, transport: &mut dyn Transport) -> Result<usize, SessionError> {
        let mut answered = 0;
        loop {
            self.enter(Phase::Receiving);
            let content = match transport.recv() {
                Ok(Some(content)) => content,
                Ok(None) => {
                    info!("host closed the channel after {answered} requests");
                    self.enter(Phase::Idle);
                    return Ok(answered);
                }
                Err(e) => {
                    error!("{e}");
                    self.enter(Phase::Aborted);
                    return Err(e.into());
                }
            };
            debug!("received {} bytes", content.len());

            let started = Instant::now();
            let records = self.update(content).inspect_err(|e| error!("{e}"))?;

            self.enter(Phase::Emitting);
            let body = encode_records(&records);
            if let Err(e) = transport.send(&body) {
                error!("{e}");
                self.enter(Phase::Aborted);
                return Err(e.into());
            }
            answered += 1;
            debug!(
                "answered request {} with {} bytes in {:?}",
                answered,
                body.len(),
                started.elapsed()
            );
            self.enter(Phase::Idle);
        }
    }
}
