use crate::command::Command;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The frame is shorter than its header or declared content.
    #[error("malformed frame ({actual} bytes, need {expected})")]
    Malformed { expected: usize, actual: usize },

    /// The command byte is not a known protocol command.
    #[error("unknown command byte 0x{0:02x}")]
    UnknownCommand(u8),

    /// The payload supplied does not match what the command requires.
    #[error("{command} payload mismatch ({actual} bytes, expected {expected})")]
    PayloadMismatch {
        command: Command,
        expected: u64,
        actual: u64,
    },

    /// The response names a different command than the request it answers.
    #[error("{echoed} response to a {sent} request")]
    EchoMismatch { sent: Command, echoed: Command },
}

pub type Result<T> = std::result::Result<T, FrameError>;
