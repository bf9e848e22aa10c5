//! Response status codes.
//!
//! Zero is success; every failure is negative. Codes outside the known set
//! are reported as [`Status::Generic`].

use std::fmt;

/// Category of a response status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Generic,
    FileOpen,
    Write,
    Read,
    LengthOutOfBounds,
    AddressOutOfBounds,
}

impl Status {
    /// Classify a raw status byte.
    pub fn from_code(code: i8) -> Self {
        match code {
            0 => Status::Ok,
            -2 => Status::FileOpen,
            -3 => Status::Write,
            -4 => Status::Read,
            -5 => Status::LengthOutOfBounds,
            -6 => Status::AddressOutOfBounds,
            _ => Status::Generic,
        }
    }

    /// The canonical wire code for this category.
    pub fn code(self) -> i8 {
        match self {
            Status::Ok => 0,
            Status::Generic => -1,
            Status::FileOpen => -2,
            Status::Write => -3,
            Status::Read => -4,
            Status::LengthOutOfBounds => -5,
            Status::AddressOutOfBounds => -6,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    /// Human-readable category, as used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Generic => "GENERIC ERROR",
            Status::FileOpen => "FILE OPEN ERROR",
            Status::Write => "WRITE ERROR",
            Status::Read => "READ ERROR",
            Status::LengthOutOfBounds => "LENGTH OUT OF BOUNDS",
            Status::AddressOutOfBounds => "ADDRESS OUT OF BOUNDS",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
