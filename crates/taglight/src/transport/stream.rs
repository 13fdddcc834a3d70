//! Decimal-prefixed frames over a byte stream

use super::{Transport, TransportError};
use std::io::{self, Read, StdinLock, StdoutLock, Write};
use taglight_proto::{LengthPrefix, read_frame, write_frame};

/// Requests from a reader, responses to a writer
pub struct StreamTransport<R, W> {
    reader: R,
    writer: W,
}

impl<R: Read, W: Write> StreamTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Hand back the writer, e.g. to inspect what was sent
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl StreamTransport<StdinLock<'static>, StdoutLock<'static>> {
    /// Requests on stdin, responses on stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout().lock())
    }
}

impl<R: Read, W: Write> Transport for StreamTransport<R, W> {
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        read_frame(&mut self.reader, LengthPrefix::Decimal).map_err(TransportError::Recv)
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        write_frame(&mut self.writer, LengthPrefix::Decimal, payload).map_err(TransportError::Send)
    }
}
