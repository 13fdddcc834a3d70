//! Common test utilities.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use taglight::{Transport, TransportError};
use tempfile::TempDir;

pub const GREET: &str = "package greet\n\nconst Greeting = \"hi\"\n\nfunc Hello(name string) string {\n\treturn Greeting + name\n}\n";

/// A package directory with `greet.go` and `util.go`
pub fn create_temp_package() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("greet.go"), GREET).unwrap();
    std::fs::write(
        dir.path().join("util.go"),
        "package greet\n\ntype Options struct {\n\tLoud bool\n}\n",
    )
    .unwrap();
    let active = dir.path().join("greet.go");
    (dir, active)
}

/// Requests served from a queue; responses collected for inspection
#[derive(Default)]
pub struct MemoryTransport {
    pub requests: VecDeque<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
    /// Fail the nth request read instead of returning it
    pub fail_after: Option<usize>,
}

impl MemoryTransport {
    pub fn with_requests<I, T>(requests: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        Self {
            requests: requests.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Transport for MemoryTransport {
    fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.fail_after == Some(self.responses.len()) {
            return Err(TransportError::Recv(taglight_proto::FrameError::Truncated {
                expected: 10,
                got: 3,
            }));
        }
        Ok(self.requests.pop_front())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.responses.push(payload.to_vec());
        Ok(())
    }
}

/// Frame `payload` the way a host writes to our stdin
pub fn stream_request(payload: &[u8]) -> Vec<u8> {
    taglight_proto::frame(taglight_proto::LengthPrefix::Decimal, payload).unwrap()
}
