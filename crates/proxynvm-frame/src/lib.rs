//! Request/response frame codec for the proxy NVM storage protocol.
//!
//! Every exchange is one request frame followed by one response frame:
//! - requests carry a 1-byte command, a 4-byte big-endian address and a
//!   4-byte big-endian length, followed by the payload for writes
//! - responses echo the command, add a signed 1-byte status and a 4-byte
//!   big-endian byte count, followed by the payload for successful reads
//!
//! Pure functions only. No I/O happens here.

pub mod codec;
pub mod command;
pub mod error;
pub mod status;

pub use codec::{
    decode_request, decode_response, encode_get_size, encode_request, encode_response, narrow,
    Narrowed, Payload, Request, RequestHeader, Response, ERASED_BYTE, GET_SIZE_REQUEST_SIZE,
    REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
pub use command::Command;
pub use error::{FrameError, Result};
pub use status::Status;
