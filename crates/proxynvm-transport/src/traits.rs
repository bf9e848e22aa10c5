use crate::error::Result;

/// A half-duplex, message-oriented byte link to a storage peer.
///
/// Both calls block until exactly `buf.len()` bytes have been moved or the
/// link can move no more. The returned count is what was actually
/// transferred; a count below `buf.len()` means the peer went away
/// mid-frame. Callers decide whether that is fatal.
pub trait Link {
    /// Send the whole buffer as (part of) one frame.
    fn send(&mut self, buf: &[u8]) -> Result<usize>;

    /// Fill the whole buffer from the link.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Link name for diagnostics.
    fn link_name(&self) -> &'static str {
        "link"
    }
}

impl<L: Link + ?Sized> Link for &mut L {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }

    fn link_name(&self) -> &'static str {
        (**self).link_name()
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn send(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).send(buf)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }

    fn link_name(&self) -> &'static str {
        (**self).link_name()
    }
}
