use proxynvm_frame::ERASED_BYTE;
use tracing::error;

use crate::bounds::range_fits;
use crate::error::{NvmError, Result};
use crate::nvm::Nvm;

/// In-process storage backend.
///
/// Starts out erased (all `0xFF`). Applies the same range rules as the
/// remote driver, which makes it a drop-in stand-in for tests and local
/// tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNvm {
    data: Vec<u8>,
}

impl MemoryNvm {
    /// An erased device of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![ERASED_BYTE; capacity],
        }
    }

    /// A device preloaded with `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn span(&self, op: &'static str, offset: u64, length: u64) -> Result<std::ops::Range<usize>> {
        let capacity = self.data.len() as u64;
        if !range_fits(offset, length, capacity) {
            error!(op, offset, length, capacity, "out of bounds");
            return Err(NvmError::OutOfBounds {
                offset,
                length,
                capacity,
            });
        }
        // Both ends are <= capacity, which came from a usize.
        Ok(offset as usize..(offset + length) as usize)
    }
}

impl Nvm for MemoryNvm {
    fn get_size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        let span = self.span("write", offset, bytes.len() as u64)?;
        self.data[span].copy_from_slice(bytes);
        Ok(bytes.len() as u64)
    }

    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let span = self.span("read", offset, length)?;
        Ok(self.data[span].to_vec())
    }

    fn erase(&mut self, offset: u64, length: u64) -> Result<u64> {
        let span = self.span("erase", offset, length)?;
        self.data[span].fill(ERASED_BYTE);
        Ok(length)
    }

    fn read_into(&mut self, offset: u64, buf: &mut [u8]) -> Result<u64> {
        let span = self.span("read", offset, buf.len() as u64)?;
        buf.copy_from_slice(&self.data[span]);
        Ok(buf.len() as u64)
    }
}
