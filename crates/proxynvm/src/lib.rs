//! Proxy NVM storage driver.
//!
//! Reads, writes and erases a remote non-volatile memory device through a
//! storage peer reachable over a byte link whose frames are limited to a
//! fixed MTU. Large operations are split into chunks that each fit one
//! frame exchange.
//!
//! # Crate Structure
//!
//! - [`transport`]: the `Link` capability plus stream and Unix socket links
//! - [`frame`]: request/response wire codec
//! - [`driver`]: bounds checks, the chunking driver and storage backends

/// Re-export transport types.
pub mod transport {
    pub use proxynvm_transport::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use proxynvm_frame::*;
}

/// Re-export driver types.
pub mod driver {
    pub use proxynvm_driver::*;
}

pub use proxynvm_driver::{DriverConfig, MemoryNvm, Nvm, NvmDriver, NvmError, SharedNvm};
