//! Protocol command bytes.
//!
//! There is no erase command. An erase travels as a `Write` whose payload
//! is all `0xFF`.

use std::fmt;

use crate::error::FrameError;

/// A request command, echoed back in the response.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Query the device capacity.
    GetSize = 0x00,
    /// Store the request payload at an address.
    Write = 0x01,
    /// Fetch bytes from an address.
    Read = 0x02,
}

impl Command {
    /// The wire byte for this command.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Human-readable command name.
    pub fn name(self) -> &'static str {
        match self {
            Command::GetSize => "GET_SIZE",
            Command::Write => "WRITE",
            Command::Read => "READ",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = FrameError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(Command::GetSize),
            0x01 => Ok(Command::Write),
            0x02 => Ok(Command::Read),
            other => Err(FrameError::UnknownCommand(other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
