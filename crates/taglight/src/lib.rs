//! taglight - tag Go identifiers for an editor host
//!
//! The host launches taglight once per package it is editing, then sends
//! the active buffer's full text whenever it changes. Every request is
//! answered with the semantic tags of that buffer (see
//! [`taglight_proto::encode_records`]).
//!
//! This crate wires the pieces together:
//! - [`config`] - launch arguments and `taglight.toml`
//! - [`logging`] - tracing setup that keeps stdout clean
//! - [`transport`] - stdin/stdout and unix socket channels
//! - [`session`] - the request/response loop

pub mod config;
pub mod logging;
pub mod session;
pub mod transport;

pub use config::{Args, FileConfig, Launch, TransportKind};
pub use session::{Phase, Session, SessionError};
pub use transport::{StreamTransport, Transport, TransportError};

use eyre::{Result, WrapErr};
use taglight_core::{DirSources, Project};
use tracing::{info, warn};

/// Run a whole helper process from parsed launch arguments
pub fn serve(launch: Launch) -> Result<()> {
    if let Some(root) = &launch.project_root {
        std::env::set_current_dir(root)
            .wrap_err_with(|| format!("Failed to change into {}", root.display()))?;
    }

    let (config, config_error) = match FileConfig::load(&launch.package_dir) {
        Ok(config) => (config, None),
        Err(e) => (FileConfig::default(), Some(e)),
    };
    logging::init(launch.debug, &config)?;
    if let Some(e) = config_error {
        warn!("ignoring config: {:#}", eyre::Report::new(e));
    }
    info!(
        "{} starting for {} in {}",
        launch.program_name,
        launch.active_file.display(),
        launch.package_dir.display()
    );

    let sources = DirSources::new(&launch.package_dir).exclude(config.exclude.iter().cloned());
    let project = Project::load(&launch.package_dir, sources)
        .wrap_err_with(|| format!("Failed to load {}", launch.package_dir.display()))?;

    let mut transport = transport::open(&launch.transport).wrap_err("Failed to open transport")?;
    let mut session = Session::new(project, &launch.active_file);
    session.run(&mut *transport)?;
    Ok(())
}
