//! Wire format between taglight and its host editor.
//!
//! A request is the full text of the active buffer. A response is a body
//! of tag record lines (see [`encode_records`]). Both travel as
//! length-prefixed frames: decimal prefixes on byte streams, binary
//! prefixes and bounded packets on sequenced-packet sockets.

mod frame;
mod record;

pub use frame::{
    FrameError, LengthPrefix, MAX_FRAME_LEN, MAX_PACKET_LEN, PacketIo, frame, read_frame,
    read_packets, write_frame, write_packets,
};
pub use record::{DecodeError, decode_records, encode_record, encode_records};
