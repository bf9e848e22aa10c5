use proxynvm_frame::Command;

use crate::error::{NvmError, Result};

/// A byte-addressable, erasable storage backend.
///
/// Backends are picked when the handle is built; callers only see this
/// trait. Every method is all-or-nothing: `Ok` carries the full byte count,
/// anything short of that is an `Err`.
pub trait Nvm {
    /// Current device capacity in bytes.
    fn get_size(&mut self) -> Result<u64>;

    /// Store `bytes` at `offset`. Returns the number of bytes written.
    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64>;

    /// Fetch `length` bytes starting at `offset`.
    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>>;

    /// Reset `length` bytes at `offset` to the erased state (`0xFF`).
    /// Returns the number of bytes erased.
    fn erase(&mut self, offset: u64, length: u64) -> Result<u64>;

    /// Fill `buf` from `offset`. Returns the number of bytes read.
    fn read_into(&mut self, offset: u64, buf: &mut [u8]) -> Result<u64> {
        let data = self.read(offset, buf.len() as u64)?;
        if data.len() != buf.len() {
            return Err(NvmError::ShortTransfer {
                command: Command::Read,
                requested: buf.len() as u64,
                confirmed: data.len() as u64,
            });
        }
        buf.copy_from_slice(&data);
        Ok(data.len() as u64)
    }
}

impl<N: Nvm + ?Sized> Nvm for Box<N> {
    fn get_size(&mut self) -> Result<u64> {
        (**self).get_size()
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        (**self).write(offset, bytes)
    }

    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        (**self).read(offset, length)
    }

    fn erase(&mut self, offset: u64, length: u64) -> Result<u64> {
        (**self).erase(offset, length)
    }

    fn read_into(&mut self, offset: u64, buf: &mut [u8]) -> Result<u64> {
        (**self).read_into(offset, buf)
    }
}
