//! Request/response channels to the host
//!
//! A transport is picked once at startup from the launch arguments and
//! lives for the whole session.

mod stream;
#[cfg(unix)]
mod socket;

pub use stream::StreamTransport;
#[cfg(unix)]
pub use socket::SocketTransport;

use crate::config::TransportKind;
use std::io;
use std::path::PathBuf;
use taglight_proto::FrameError;

/// Errors setting up or using a transport. All of them end the session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on {}", path.display())]
    Listen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept the host connection on {}", path.display())]
    Accept {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to receive a request")]
    Recv(#[source] FrameError),

    #[error("failed to send a response")]
    Send(#[source] FrameError),

    #[error("socket transport is not available on this platform")]
    Unsupported,
}

/// One framed channel in each direction
pub trait Transport {
    /// Next request payload; `Ok(None)` once the host closed the channel
    /// at a frame boundary
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Send one response payload
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Open the transport the launch arguments asked for
pub fn open(kind: &TransportKind) -> Result<Box<dyn Transport>, TransportError> {
    match kind {
        TransportKind::Stream => Ok(Box::new(StreamTransport::stdio())),
        #[cfg(unix)]
        TransportKind::Socket { connect, listen } => {
            Ok(Box::new(SocketTransport::open(connect, listen)?))
        }
        #[cfg(not(unix))]
        TransportKind::Socket { .. } => Err(TransportError::Unsupported),
    }
}
