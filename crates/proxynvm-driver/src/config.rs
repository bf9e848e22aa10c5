use std::time::Duration;

use proxynvm_frame::{REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{NvmError, Result};

/// Default message buffer: one page.
pub const DEFAULT_FRAME_BUFFER_SIZE: usize = 4096;

/// Default bytes reserved for the link's own framing (HDLC header).
pub const DEFAULT_LINK_OVERHEAD: usize = 10;

/// Driver configuration.
///
/// The usable frame size (MTU) is `frame_buffer_size - link_overhead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Size of the message buffer shared with the link.
    pub frame_buffer_size: usize,
    /// Bytes of every message the link needs for itself.
    pub link_overhead: usize,
    /// Socket read timeout in milliseconds. `None` blocks forever.
    pub read_timeout_ms: Option<u64>,
    /// Socket write timeout in milliseconds. `None` blocks forever.
    pub write_timeout_ms: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_buffer_size: DEFAULT_FRAME_BUFFER_SIZE,
            link_overhead: DEFAULT_LINK_OVERHEAD,
            read_timeout_ms: None,
            write_timeout_ms: None,
        }
    }
}

impl DriverConfig {
    /// Maximum frame size, validated to leave at least one payload byte in
    /// both directions.
    pub fn mtu(&self) -> Result<usize> {
        let mtu = self
            .frame_buffer_size
            .checked_sub(self.link_overhead)
            .ok_or_else(|| {
                NvmError::InvalidConfig(format!(
                    "link overhead ({}) exceeds frame buffer size ({})",
                    self.link_overhead, self.frame_buffer_size
                ))
            })?;

        let min = REQUEST_HEADER_SIZE.max(RESPONSE_HEADER_SIZE) + 1;
        if mtu < min {
            return Err(NvmError::InvalidConfig(format!(
                "frame size {mtu} leaves no payload room (need at least {min})"
            )));
        }
        Ok(mtu)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}
