use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::nvm::Nvm;

/// A cloneable handle that serializes whole operations on one backend.
///
/// The link under a driver carries one exchange at a time, so a single lock
/// around the driver is all the concurrency control it needs. A chunked
/// operation holds the lock from its size query to its last chunk.
pub struct SharedNvm<N> {
    inner: Arc<Mutex<N>>,
}

impl<N: Nvm> SharedNvm<N> {
    pub fn new(nvm: N) -> Self {
        Self {
            inner: Arc::new(Mutex::new(nvm)),
        }
    }

    /// Run `f` with exclusive access to the backend.
    ///
    /// A panic in another holder does not wedge the handle; the backend
    /// keeps no state between operations that a panic could corrupt.
    pub fn with<R>(&self, f: impl FnOnce(&mut N) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<N> Clone for SharedNvm<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Nvm> Nvm for SharedNvm<N> {
    fn get_size(&mut self) -> Result<u64> {
        self.with(|nvm| nvm.get_size())
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        self.with(|nvm| nvm.write(offset, bytes))
    }

    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        self.with(|nvm| nvm.read(offset, length))
    }

    fn erase(&mut self, offset: u64, length: u64) -> Result<u64> {
        self.with(|nvm| nvm.erase(offset, length))
    }

    fn read_into(&mut self, offset: u64, buf: &mut [u8]) -> Result<u64> {
        self.with(|nvm| nvm.read_into(offset, buf))
    }
}

impl<N> std::fmt::Debug for SharedNvm<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedNvm")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
