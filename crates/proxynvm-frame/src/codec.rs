use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::command::Command;
use crate::error::{FrameError, Result};
use crate::status::Status;

/// Request header: command (1) + address (4) + length (4) = 9 bytes.
pub const REQUEST_HEADER_SIZE: usize = 9;

/// Response header: command (1) + status (1) + count (4) = 6 bytes.
pub const RESPONSE_HEADER_SIZE: usize = 6;

/// The `GetSize` short form is the bare command byte.
pub const GET_SIZE_REQUEST_SIZE: usize = 1;

/// Fill byte for erased storage.
pub const ERASED_BYTE: u8 = 0xFF;

const REQ_ADDRESS_INDEX: usize = 1;
const REQ_LENGTH_INDEX: usize = 5;
const RESP_STATUS_INDEX: usize = 1;
const RESP_COUNT_INDEX: usize = 2;

/// A native value narrowed to a 4-byte wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Narrowed {
    /// The low 32 bits that go on the wire.
    pub value: u32,
    /// Whether any high bits were dropped.
    pub truncated: bool,
}

/// Narrow a native address or length to the 32-bit wire width.
///
/// Values above `u32::MAX` keep their low 32 bits. This never fails; the
/// encoder logs a warning when it happens.
pub fn narrow(value: u64) -> Narrowed {
    Narrowed {
        value: value as u32,
        truncated: value > u64::from(u32::MAX),
    }
}

/// Where the payload of a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// No payload (`GetSize`, `Read`).
    None,
    /// Caller data for a `Write`.
    Data(&'a [u8]),
    /// Synthesized `0xFF` bytes for a `Write` that erases.
    Erase,
}

/// The header fields of an encoded request, as they went on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub command: Command,
    pub address: u32,
    pub length: u32,
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub address: u32,
    pub length: u32,
    /// Write payload; empty for other commands.
    pub payload: Bytes,
}

/// A decoded response frame borrowing its payload from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Command echoed by the peer.
    pub command: Command,
    /// Raw status byte.
    pub status: i8,
    /// Bytes written/read/erased, or the capacity for `GetSize`.
    pub count: u32,
    /// Read payload; empty unless this is a successful `Read`.
    pub payload: &'a [u8],
}

impl Response<'_> {
    /// Status category of this response.
    pub fn status(&self) -> Status {
        Status::from_code(self.status)
    }
}

/// Encode a request into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬──────────────┬──────────────┬──────────────────┐
/// │ Command │ Address      │ Length       │ Payload          │
/// │ (1B)    │ (4B BE)      │ (4B BE)      │ (write only)     │
/// └─────────┴──────────────┴──────────────┴──────────────────┘
/// ```
///
/// `Write` takes either caller data of exactly `length` bytes or
/// [`Payload::Erase`], which fills `length` bytes of `0xFF`. `GetSize` and
/// `Read` take no payload. Address and length wider than 32 bits are
/// truncated, see [`narrow`].
pub fn encode_request(
    command: Command,
    address: u64,
    length: u64,
    payload: Payload<'_>,
    dst: &mut BytesMut,
) -> Result<RequestHeader> {
    let mismatch = |expected: u64, actual: u64| FrameError::PayloadMismatch {
        command,
        expected,
        actual,
    };

    let body_len = match (command, payload) {
        (Command::Write, Payload::Data(data)) if data.len() as u64 == length => data.len(),
        (Command::Write, Payload::Data(data)) => return Err(mismatch(length, data.len() as u64)),
        (Command::Write, Payload::Erase) => {
            usize::try_from(length).map_err(|_| mismatch(length, usize::MAX as u64))?
        }
        (Command::Write, Payload::None) => return Err(mismatch(length, 0)),
        (_, Payload::None) => 0,
        (_, Payload::Data(data)) => return Err(mismatch(0, data.len() as u64)),
        (_, Payload::Erase) => return Err(mismatch(0, length)),
    };

    let wire_address = narrow(address);
    if wire_address.truncated {
        warn!(
            %command,
            address,
            wire_address = wire_address.value,
            "address exceeds the 4-byte protocol field and will be truncated"
        );
    }
    let wire_length = narrow(length);
    if wire_length.truncated {
        warn!(
            %command,
            length,
            wire_length = wire_length.value,
            "length exceeds the 4-byte protocol field and will be truncated"
        );
    }

    dst.reserve(REQUEST_HEADER_SIZE + body_len);
    dst.put_u8(command.as_byte());
    dst.put_u32(wire_address.value);
    dst.put_u32(wire_length.value);
    match payload {
        Payload::Data(data) => dst.put_slice(data),
        Payload::Erase => dst.put_bytes(ERASED_BYTE, body_len),
        Payload::None => {}
    }

    Ok(RequestHeader {
        command,
        address: wire_address.value,
        length: wire_length.value,
    })
}

/// Encode the 1-byte `GetSize` short form.
pub fn encode_get_size(dst: &mut BytesMut) {
    dst.put_u8(Command::GetSize.as_byte());
}

/// Decode a request frame.
///
/// Accepts the 1-byte `GetSize` short form as well as a full header.
pub fn decode_request(src: &[u8]) -> Result<Request> {
    let Some(&first) = src.first() else {
        return Err(FrameError::Malformed {
            expected: GET_SIZE_REQUEST_SIZE,
            actual: 0,
        });
    };
    let command = Command::try_from(first)?;

    if command == Command::GetSize && src.len() < REQUEST_HEADER_SIZE {
        return Ok(Request {
            command,
            address: 0,
            length: 0,
            payload: Bytes::new(),
        });
    }
    if src.len() < REQUEST_HEADER_SIZE {
        return Err(FrameError::Malformed {
            expected: REQUEST_HEADER_SIZE,
            actual: src.len(),
        });
    }

    let address = be_u32(src, REQ_ADDRESS_INDEX);
    let length = be_u32(src, REQ_LENGTH_INDEX);

    let payload = if command == Command::Write {
        let end = declared_end(REQUEST_HEADER_SIZE, length);
        if src.len() < end {
            return Err(FrameError::Malformed {
                expected: end,
                actual: src.len(),
            });
        }
        Bytes::copy_from_slice(&src[REQUEST_HEADER_SIZE..end])
    } else {
        Bytes::new()
    };

    Ok(Request {
        command,
        address,
        length,
        payload,
    })
}

/// Encode a response frame. Peers use this; the driver only decodes.
pub fn encode_response(
    command: Command,
    status: i8,
    count: u32,
    payload: &[u8],
    dst: &mut BytesMut,
) {
    dst.reserve(RESPONSE_HEADER_SIZE + payload.len());
    dst.put_u8(command.as_byte());
    dst.put_i8(status);
    dst.put_u32(count);
    dst.put_slice(payload);
}

/// Decode a response frame.
///
/// A successful `Read` must carry `count` payload bytes after the header.
/// Bytes beyond the declared content are ignored.
pub fn decode_response(src: &[u8]) -> Result<Response<'_>> {
    if src.len() < RESPONSE_HEADER_SIZE {
        return Err(FrameError::Malformed {
            expected: RESPONSE_HEADER_SIZE,
            actual: src.len(),
        });
    }

    let command = Command::try_from(src[0])?;
    let status = src[RESP_STATUS_INDEX] as i8;
    let count = be_u32(src, RESP_COUNT_INDEX);

    let payload = if command == Command::Read && Status::from_code(status).is_ok() {
        let end = declared_end(RESPONSE_HEADER_SIZE, count);
        if src.len() < end {
            return Err(FrameError::Malformed {
                expected: end,
                actual: src.len(),
            });
        }
        &src[RESPONSE_HEADER_SIZE..end]
    } else {
        &[]
    };

    Ok(Response {
        command,
        status,
        count,
        payload,
    })
}

fn be_u32(src: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]])
}

fn declared_end(header: usize, count: u32) -> usize {
    usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_add(header))
        .unwrap_or(usize::MAX)
}
