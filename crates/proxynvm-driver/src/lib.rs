//! Chunking NVM driver over an MTU-limited storage link.
//!
//! This is the layer callers use. Ask for any byte range; the driver checks
//! it against the device capacity, splits it into frames that fit the link,
//! and either completes the whole operation or reports why it could not.
//!
//! Backends implement [`Nvm`]. [`NvmDriver`] speaks the proxy protocol over
//! a [`proxynvm_transport::Link`]; [`MemoryNvm`] keeps everything in
//! process. [`SharedNvm`] serializes one backend across threads, and
//! [`StorageService`] maps results onto service status codes.

pub mod bounds;
pub mod config;
pub mod driver;
pub mod error;
pub mod memory;
pub mod nvm;
pub mod service;
pub mod shared;

pub use bounds::{range_end, range_fits};
pub use config::{DriverConfig, DEFAULT_FRAME_BUFFER_SIZE, DEFAULT_LINK_OVERHEAD};
pub use driver::{NvmDriver, CAPACITY_ERROR_SENTINEL};
pub use error::{NvmError, Result};
pub use memory::MemoryNvm;
pub use nvm::Nvm;
pub use service::{ServiceReply, ServiceStatus, StorageService};
pub use shared::SharedNvm;
