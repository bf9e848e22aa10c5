//! Storage service front end.
//!
//! Maps backend results onto the status/count pairs a storage service
//! hands back to its clients. Payload travels through a caller-provided
//! dataport buffer. A call succeeds only when the full requested size was
//! transferred; anything else reports `Generic` with a count of zero.

use tracing::warn;

use crate::nvm::Nvm;

/// Status returned to service clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Success,
    Generic,
    NotSupported,
}

/// Status plus the byte count for one call. `get_size` reports the
/// capacity and `get_state` the state flags in `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceReply {
    pub status: ServiceStatus,
    pub count: u64,
}

impl ServiceReply {
    fn success(count: u64) -> Self {
        Self {
            status: ServiceStatus::Success,
            count,
        }
    }

    fn generic() -> Self {
        Self {
            status: ServiceStatus::Generic,
            count: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ServiceStatus::Success
    }
}

/// Storage service over any [`Nvm`] backend.
#[derive(Debug)]
pub struct StorageService<N> {
    nvm: N,
}

impl<N: Nvm> StorageService<N> {
    pub fn new(nvm: N) -> Self {
        Self { nvm }
    }

    /// Write the first `size` bytes of `dataport` at `offset`.
    pub fn write(&mut self, offset: u64, size: u64, dataport: &[u8]) -> ServiceReply {
        let Some(bytes) = dataport_slice(dataport.len(), size).map(|n| &dataport[..n]) else {
            warn!(size, dataport = dataport.len(), "write larger than dataport");
            return ServiceReply::generic();
        };
        complete(size, self.nvm.write(offset, bytes))
    }

    /// Read `size` bytes at `offset` into the start of `dataport`.
    pub fn read(&mut self, offset: u64, size: u64, dataport: &mut [u8]) -> ServiceReply {
        let Some(n) = dataport_slice(dataport.len(), size) else {
            warn!(size, dataport = dataport.len(), "read larger than dataport");
            return ServiceReply::generic();
        };
        complete(size, self.nvm.read_into(offset, &mut dataport[..n]))
    }

    /// Erase `size` bytes at `offset`.
    pub fn erase(&mut self, offset: u64, size: u64) -> ServiceReply {
        complete(size, self.nvm.erase(offset, size))
    }

    /// Report the device capacity.
    pub fn get_size(&mut self) -> ServiceReply {
        match self.nvm.get_size() {
            Ok(size) => ServiceReply::success(size),
            Err(err) => {
                warn!(error = %err, "get_size failed");
                ServiceReply::generic()
            }
        }
    }

    /// Device state flags. Not provided by any backend.
    pub fn get_state(&mut self) -> ServiceReply {
        ServiceReply {
            status: ServiceStatus::NotSupported,
            count: 0,
        }
    }

    pub fn get_ref(&self) -> &N {
        &self.nvm
    }

    pub fn into_inner(self) -> N {
        self.nvm
    }
}

fn dataport_slice(dataport_len: usize, size: u64) -> Option<usize> {
    usize::try_from(size).ok().filter(|&n| n <= dataport_len)
}

fn complete(size: u64, result: crate::Result<u64>) -> ServiceReply {
    match result {
        Ok(done) if done == size => ServiceReply::success(done),
        Ok(done) => {
            warn!(size, done, "operation transferred a partial count");
            ServiceReply::generic()
        }
        Err(err) => {
            warn!(error = %err, "operation failed");
            ServiceReply::generic()
        }
    }
}
