use std::io::{ErrorKind, Read, Write};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Link;

/// A [`Link`] over any blocking `Read + Write` byte stream.
///
/// Partial reads and writes are looped internally so the caller always
/// sees whole frames. A short count is only returned when the stream hits
/// EOF (or refuses further writes) mid-frame.
pub struct StreamLink<T> {
    inner: T,
}

impl<T: Read + Write> StreamLink<T> {
    /// Wrap a connected stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the link and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Read + Write> Link for StreamLink<T> {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.write(&buf[offset..]) {
                Ok(0) => break,
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        self.flush()?;
        trace!(bytes = offset, "link send");
        Ok(offset)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.read(&mut buf[offset..]) {
                Ok(0) => break,
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        trace!(bytes = offset, "link receive");
        Ok(offset)
    }

    fn link_name(&self) -> &'static str {
        "stream"
    }
}

#[cfg(unix)]
impl StreamLink<std::os::unix::net::UnixStream> {
    /// Set read and write timeouts on the underlying socket.
    ///
    /// An expired timeout surfaces as [`TransportError::Io`].
    pub fn set_timeouts(
        &self,
        read: Option<std::time::Duration>,
        write: Option<std::time::Duration>,
    ) -> Result<()> {
        self.inner.set_read_timeout(read)?;
        self.inner.set_write_timeout(write)?;
        Ok(())
    }
}

impl<T> std::fmt::Debug for StreamLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamLink")
            .field("stream", &std::any::type_name::<T>())
            .finish()
    }
}
