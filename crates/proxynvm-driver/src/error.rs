use proxynvm_frame::{Command, FrameError, Status};
use proxynvm_transport::TransportError;

/// Errors that can occur in storage operations.
///
/// None of these are retried. A failed operation transferred nothing as far
/// as the caller is concerned, even if earlier chunks reached the device.
#[derive(Debug, thiserror::Error)]
pub enum NvmError {
    /// The requested range wraps around or extends past the device.
    #[error("range out of bounds (offset {offset}, length {length}, capacity {capacity})")]
    OutOfBounds {
        offset: u64,
        length: u64,
        capacity: u64,
    },

    /// The peer answered with a non-OK status.
    #[error("{command} failed: {status} (status {code})")]
    Protocol {
        command: Command,
        status: Status,
        code: i8,
    },

    /// The peer answered OK but confirmed a different byte count.
    #[error("{command} confirmed {confirmed} of {requested} bytes")]
    ShortTransfer {
        command: Command,
        requested: u64,
        confirmed: u64,
    },

    /// A response frame could not be decoded.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    /// The link itself failed.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The driver configuration leaves no room for payload.
    #[error("invalid driver configuration: {0}")]
    InvalidConfig(String),
}

impl NvmError {
    /// Build a protocol error from a raw status byte.
    pub fn protocol(command: Command, code: i8) -> Self {
        NvmError::Protocol {
            command,
            status: Status::from_code(code),
            code,
        }
    }

    /// Status category reported by the peer, if this is a protocol error.
    pub fn status(&self) -> Option<Status> {
        match self {
            NvmError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NvmError>;
