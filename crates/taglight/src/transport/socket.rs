//! Binary-prefixed frames over a pair of unix sequenced-packet sockets
//!
//! Responses go out on a connection we open to the host's socket.
//! Requests come in on a connection the host opens to ours.

use super::{Transport, TransportError};
use std::io;
use std::path::Path;
use taglight_proto::{PacketIo, read_packets, write_packets};
use tracing::debug;
use uds::{UnixSeqpacketConn, UnixSeqpacketListener};

struct Channel(UnixSeqpacketConn);

impl PacketIo for Channel {
    fn send_packet(&mut self, packet: &[u8]) -> io::Result<usize> {
        self.0.send(packet)
    }

    fn recv_packet(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf)
    }
}

pub struct SocketTransport {
    writer: Channel,
    reader: Channel,
}

impl SocketTransport {
    /// Connect the write channel, then accept the read channel.
    ///
    /// A leftover socket file at `listen` is removed before binding.
    pub fn open(connect: &Path, listen: &Path) -> Result<Self, TransportError> {
        let writer =
            UnixSeqpacketConn::connect(connect).map_err(|source| TransportError::Connect {
                path: connect.to_path_buf(),
                source,
            })?;
        debug!("connected to {}", connect.display());

        let listen_error = |source| TransportError::Listen {
            path: listen.to_path_buf(),
            source,
        };
        match std::fs::remove_file(listen) {
            Ok(()) => debug!("removed stale socket {}", listen.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(listen_error(e)),
        }
        let listener = UnixSeqpacketListener::bind(listen).map_err(listen_error)?;
        debug!("listening on {}", listen.display());

        let (reader, _) = listener
            .accept_unix_addr()
            .map_err(|source| TransportError::Accept {
                path: listen.to_path_buf(),
                source,
            })?;
        debug!("host connected on {}", listen.display());

        Ok(Self {
            writer: Channel(writer),
            reader: Channel(reader),
        })
    }
}

impl Transport for SocketTransport {
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        read_packets(&mut self.reader).map_err(TransportError::Recv)
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        write_packets(&mut self.writer, payload).map_err(TransportError::Send)
    }
}
