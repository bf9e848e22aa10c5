//! Blocking byte-link abstraction for the proxy NVM protocol.
//!
//! The storage driver never talks to sockets directly. It consumes a
//! [`Link`]: something that can send a buffer and receive an exact number
//! of bytes back, one exchange at a time. This crate provides:
//! - the [`Link`] capability trait
//! - [`StreamLink`], an adapter for any `Read + Write` byte stream
//! - Unix domain socket connect/listen helpers (Linux/macOS)

pub mod error;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use stream::StreamLink;
pub use traits::Link;

#[cfg(unix)]
pub use uds::{connect, LinkListener};
