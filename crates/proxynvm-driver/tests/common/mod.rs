#![allow(dead_code)]

use bytes::BytesMut;
use proxynvm_driver::{DriverConfig, NvmDriver};
use proxynvm_frame::{
    decode_request, encode_response, Command, Request, Status, RESPONSE_HEADER_SIZE,
};
use proxynvm_transport::Link;

/// MTU 32: request budget 23, response budget 26.
pub const MTU: usize = 32;
pub const REQUEST_BUDGET: usize = 23;
pub const RESPONSE_BUDGET: usize = 26;

pub fn small_config() -> DriverConfig {
    DriverConfig {
        frame_buffer_size: MTU + 10,
        link_overhead: 10,
        ..DriverConfig::default()
    }
}

pub fn driver(peer: MemoryPeer) -> NvmDriver<MemoryPeer> {
    NvmDriver::new(peer, &small_config()).expect("config should be valid")
}

/// A storage peer living inside the link.
///
/// Every frame sent to it is decoded and answered immediately from an
/// in-memory store; the answer waits for the next `receive`.
pub struct MemoryPeer {
    pub store: Vec<u8>,
    pub requests: Vec<Request>,
    pub frame_sizes: Vec<usize>,
    pending: Vec<u8>,
    fail_write: Option<(usize, Status)>,
    capacity: Option<u32>,
    writes_seen: usize,
}

impl MemoryPeer {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: vec![0; capacity],
            requests: Vec::new(),
            frame_sizes: Vec::new(),
            pending: Vec::new(),
            fail_write: None,
            capacity: None,
            writes_seen: 0,
        }
    }

    /// Answer the `n`th write chunk (1-based) with `status`.
    pub fn fail_nth_write(mut self, n: usize, status: Status) -> Self {
        self.fail_write = Some((n, status));
        self
    }

    /// Report `capacity` to size queries regardless of the store.
    pub fn report_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Chunk requests for `command`, in order.
    pub fn chunks(&self, command: Command) -> Vec<&Request> {
        self.requests
            .iter()
            .filter(|r| r.command == command)
            .collect()
    }

    /// Wire sizes of the frames carrying `command`, in order.
    pub fn chunk_frame_sizes(&self, command: Command) -> Vec<usize> {
        self.requests
            .iter()
            .zip(&self.frame_sizes)
            .filter(|(r, _)| r.command == command)
            .map(|(_, size)| *size)
            .collect()
    }

    fn answer(&mut self, request: &Request) -> Vec<u8> {
        let mut out = BytesMut::new();
        match request.command {
            Command::GetSize => {
                let capacity = self.capacity.unwrap_or(self.store.len() as u32);
                encode_response(Command::GetSize, 0, capacity, &[], &mut out);
            }
            Command::Write => {
                self.writes_seen += 1;
                let failing = matches!(self.fail_write, Some((n, _)) if n == self.writes_seen);
                match (failing, self.span(request)) {
                    (false, Some(span)) => {
                        self.store[span].copy_from_slice(&request.payload);
                        encode_response(Command::Write, 0, request.length, &[], &mut out);
                    }
                    (true, _) => {
                        let status = self.fail_write.map(|(_, s)| s).unwrap_or(Status::Generic);
                        encode_response(Command::Write, status.code(), 0, &[], &mut out);
                    }
                    (false, None) => {
                        let code = Status::AddressOutOfBounds.code();
                        encode_response(Command::Write, code, 0, &[], &mut out);
                    }
                }
            }
            Command::Read => match self.span(request) {
                Some(span) => {
                    let data = self.store[span].to_vec();
                    encode_response(Command::Read, 0, request.length, &data, &mut out);
                }
                None => {
                    let code = Status::AddressOutOfBounds.code();
                    encode_response(Command::Read, code, 0, &[], &mut out);
                    out.resize(RESPONSE_HEADER_SIZE + request.length as usize, 0);
                }
            },
        }
        out.to_vec()
    }

    fn span(&self, request: &Request) -> Option<std::ops::Range<usize>> {
        let start = request.address as usize;
        let end = start.checked_add(request.length as usize)?;
        (end <= self.store.len()).then_some(start..end)
    }
}

impl Link for MemoryPeer {
    fn send(&mut self, buf: &[u8]) -> proxynvm_transport::Result<usize> {
        let request = decode_request(buf).expect("driver should send well-formed frames");
        self.pending = self.answer(&request);
        self.frame_sizes.push(buf.len());
        self.requests.push(request);
        Ok(buf.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> proxynvm_transport::Result<usize> {
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn link_name(&self) -> &'static str {
        "memory-peer"
    }
}
