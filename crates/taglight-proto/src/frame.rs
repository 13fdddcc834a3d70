//! Length-prefixed frames
//!
//! Byte streams carry a 10-digit ASCII decimal length before each payload.
//! Packet transports send an 8-byte little-endian length as its own packet
//! and then the payload in packets of at most [`MAX_PACKET_LEN`] bytes.

use std::io::{self, Read, Write};

/// Largest payload either side accepts
pub const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

/// Largest payload packet on packet transports
pub const MAX_PACKET_LEN: usize = 64 * 1024;

/// Errors reading or writing frames
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge { len: usize },

    #[error("malformed length prefix {0:?}")]
    BadPrefix(Vec<u8>),

    #[error("connection closed after {got} of {expected} bytes")]
    Truncated { expected: usize, got: usize },

    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { expected: usize, sent: usize },
}

/// How the payload length is written in front of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// Ten ASCII decimal digits, zero padded
    Decimal,
    /// Eight bytes, little-endian unsigned
    Binary,
}

impl LengthPrefix {
    /// Width of the prefix in bytes
    pub fn width(self) -> usize {
        match self {
            LengthPrefix::Decimal => 10,
            LengthPrefix::Binary => 8,
        }
    }

    pub fn encode(self, len: usize) -> Result<Vec<u8>, FrameError> {
        if len > MAX_FRAME_LEN {
            return Err(FrameError::TooLarge { len });
        }
        Ok(match self {
            LengthPrefix::Decimal => format!("{len:010}").into_bytes(),
            LengthPrefix::Binary => (len as u64).to_le_bytes().to_vec(),
        })
    }

    pub fn decode(self, prefix: &[u8]) -> Result<usize, FrameError> {
        let bad = || FrameError::BadPrefix(prefix.to_vec());
        if prefix.len() != self.width() {
            return Err(bad());
        }
        let len = match self {
            LengthPrefix::Decimal => {
                if !prefix.iter().all(u8::is_ascii_digit) {
                    return Err(bad());
                }
                prefix
                    .iter()
                    .fold(0u64, |acc, digit| acc * 10 + u64::from(digit - b'0'))
            }
            LengthPrefix::Binary => {
                let bytes: [u8; 8] = prefix.try_into().map_err(|_| bad())?;
                u64::from_le_bytes(bytes)
            }
        };
        let len = usize::try_from(len).map_err(|_| bad())?;
        if len > MAX_FRAME_LEN {
            return Err(FrameError::TooLarge { len });
        }
        Ok(len)
    }
}

/// Prefix `payload` with its length
pub fn frame(prefix: LengthPrefix, payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut out = prefix.encode(payload.len())?;
    out.extend_from_slice(payload);
    Ok(out)
}

/// Write one frame and flush
pub fn write_frame(
    writer: &mut impl Write,
    prefix: LengthPrefix,
    payload: &[u8],
) -> Result<(), FrameError> {
    writer.write_all(&prefix.encode(payload.len())?)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one frame. `Ok(None)` when the stream ends cleanly before a
/// prefix starts.
pub fn read_frame(
    reader: &mut impl Read,
    prefix: LengthPrefix,
) -> Result<Option<Vec<u8>>, FrameError> {
    let mut header = vec![0u8; prefix.width()];
    let got = read_full(reader, &mut header)?;
    if got == 0 {
        return Ok(None);
    }
    if got < header.len() {
        return Err(FrameError::Truncated {
            expected: header.len(),
            got,
        });
    }

    let len = prefix.decode(&header)?;
    let mut payload = vec![0u8; len];
    let got = read_full(reader, &mut payload)?;
    if got < len {
        return Err(FrameError::Truncated { expected: len, got });
    }
    Ok(Some(payload))
}

/// Fill `buf` unless the stream ends first; returns how much was read
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// A connection that moves whole packets, like a `SOCK_SEQPACKET` socket
pub trait PacketIo {
    /// Send one packet, returning how many bytes went out
    fn send_packet(&mut self, packet: &[u8]) -> io::Result<usize>;

    /// Receive one packet into `buf`, returning its length; 0 means the
    /// peer closed the connection
    fn recv_packet(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

fn send_all(io: &mut impl PacketIo, packet: &[u8]) -> Result<(), FrameError> {
    let sent = io.send_packet(packet)?;
    if sent != packet.len() {
        return Err(FrameError::ShortWrite {
            expected: packet.len(),
            sent,
        });
    }
    Ok(())
}

/// Send a frame as a binary length packet followed by payload packets
pub fn write_packets(io: &mut impl PacketIo, payload: &[u8]) -> Result<(), FrameError> {
    send_all(io, &LengthPrefix::Binary.encode(payload.len())?)?;
    for chunk in payload.chunks(MAX_PACKET_LEN) {
        send_all(io, chunk)?;
    }
    Ok(())
}

/// Receive a frame sent by [`write_packets`]. `Ok(None)` when the peer
/// closed the connection before the length packet.
pub fn read_packets(io: &mut impl PacketIo) -> Result<Option<Vec<u8>>, FrameError> {
    let mut header = [0u8; 8];
    let got = io.recv_packet(&mut header)?;
    if got == 0 {
        return Ok(None);
    }
    let len = LengthPrefix::Binary.decode(&header[..got])?;

    let mut payload = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let end = (filled + MAX_PACKET_LEN).min(len);
        let n = io.recv_packet(&mut payload[filled..end])?;
        if n == 0 {
            return Err(FrameError::Truncated {
                expected: len,
                got: filled,
            });
        }
        filled += n;
    }
    Ok(Some(payload))
}
