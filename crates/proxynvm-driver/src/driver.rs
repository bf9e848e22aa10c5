use std::mem;

use bytes::BytesMut;
use proxynvm_frame::{
    decode_response, encode_get_size, encode_request, Command, FrameError, Payload, Response,
    Status, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
use proxynvm_transport::{Link, TransportError};
use tracing::{debug, error, info};

use crate::bounds::range_fits;
use crate::config::DriverConfig;
use crate::error::{NvmError, Result};
use crate::nvm::Nvm;

/// Capacity value a peer reports when it could not determine the size.
pub const CAPACITY_ERROR_SENTINEL: u32 = u32::MAX;

/// Storage driver speaking the proxy NVM protocol over a [`Link`].
///
/// Every logical operation runs to completion as a series of
/// request/response chunks before the next one starts. The frame buffer is
/// reused for each chunk, so the driver needs `&mut self` throughout; share
/// it between threads with [`crate::SharedNvm`].
///
/// Capacity is never cached. Each bounds-checked call asks the peer first.
pub struct NvmDriver<L> {
    link: L,
    buf: BytesMut,
    mtu: usize,
}

impl<L: Link> NvmDriver<L> {
    /// Build a driver on a connected link.
    ///
    /// Fails only if the configuration leaves no room for payload.
    pub fn new(link: L, config: &DriverConfig) -> Result<Self> {
        let mtu = config.mtu()?;
        let driver = Self {
            link,
            buf: BytesMut::with_capacity(mtu),
            mtu,
        };
        info!(
            link = driver.link.link_name(),
            mtu,
            request_budget = driver.request_budget(),
            response_budget = driver.response_budget(),
            "storage driver ready"
        );
        Ok(driver)
    }

    /// Largest frame exchanged in either direction.
    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// Payload bytes per write/erase chunk.
    pub fn request_budget(&self) -> usize {
        self.mtu - REQUEST_HEADER_SIZE
    }

    /// Payload bytes per read chunk.
    pub fn response_budget(&self) -> usize {
        self.mtu - RESPONSE_HEADER_SIZE
    }

    /// Borrow the underlying link.
    pub fn get_ref(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link.
    pub fn get_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the driver and return the link.
    pub fn into_inner(self) -> L {
        self.link
    }

    /// Ask the peer for the device capacity.
    ///
    /// Uses the 1-byte request form. A capacity of
    /// [`CAPACITY_ERROR_SENTINEL`] is the peer's way of reporting a generic
    /// failure and is returned as such.
    pub fn get_size(&mut self) -> Result<u64> {
        self.buf.clear();
        encode_get_size(&mut self.buf);
        self.send_frame()?;

        let response = decode_response(self.receive_frame(RESPONSE_HEADER_SIZE)?)?;
        check_echo(Command::GetSize, &response)?;
        if !response.status().is_ok() {
            log_status("get_size", response.status, response.status());
            return Err(NvmError::protocol(Command::GetSize, response.status));
        }
        if response.count == CAPACITY_ERROR_SENTINEL {
            error!("get_size: peer reported the reserved error capacity");
            return Err(NvmError::protocol(Command::GetSize, Status::Generic.code()));
        }

        debug!(capacity = response.count, "device capacity");
        Ok(u64::from(response.count))
    }

    /// Whether `offset..offset + length` lies inside the device right now.
    ///
    /// Costs one `GetSize` round trip.
    pub fn is_in_range(&mut self, offset: u64, length: u64) -> Result<bool> {
        let capacity = self.get_size()?;
        Ok(range_fits(offset, length, capacity))
    }

    /// Write `bytes` at `offset`. Returns the number of bytes written.
    pub fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        self.program("write", offset, bytes.len() as u64, Some(bytes))
    }

    /// Erase `length` bytes at `offset` by writing `0xFF`.
    pub fn erase(&mut self, offset: u64, length: u64) -> Result<u64> {
        self.program("erase", offset, length, None)
    }

    /// Read `length` bytes at `offset`.
    pub fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let capacity = self.check_range("read", offset, length)?;
        let len = usize::try_from(length).map_err(|_| NvmError::OutOfBounds {
            offset,
            length,
            capacity,
        })?;
        let mut out = vec![0u8; len];
        self.read_chunks(offset, &mut out)?;
        Ok(out)
    }

    /// Fill `dst` from `offset`. Returns the number of bytes read.
    pub fn read_into(&mut self, offset: u64, dst: &mut [u8]) -> Result<u64> {
        self.check_range("read", offset, dst.len() as u64)?;
        self.read_chunks(offset, dst)
    }

    /// Validate the range, returning the capacity it was checked against.
    fn check_range(&mut self, op: &'static str, offset: u64, length: u64) -> Result<u64> {
        let capacity = self.get_size()?;
        if !range_fits(offset, length, capacity) {
            error!(
                op,
                offset, length, capacity, "unable to access the given area (out of bounds)"
            );
            return Err(NvmError::OutOfBounds {
                offset,
                length,
                capacity,
            });
        }
        Ok(capacity)
    }

    /// Shared write/erase loop. `source == None` erases.
    ///
    /// Full chunks go out while strictly more than one budget remains; the
    /// rest (which may be a full budget) goes out last.
    fn program(
        &mut self,
        op: &'static str,
        offset: u64,
        length: u64,
        source: Option<&[u8]>,
    ) -> Result<u64> {
        self.check_range(op, offset, length)?;

        let budget = self.request_budget() as u64;
        let mut address = offset;
        let mut remaining = length;
        let mut done = 0u64;

        while remaining > budget {
            self.program_chunk(op, address, source, done, budget)?;
            done += budget;
            address += budget;
            remaining -= budget;
        }

        if remaining > 0 {
            self.program_chunk(op, address, source, done, remaining)?;
            done += remaining;
        }

        debug!(op, offset, bytes = done, "operation complete");
        Ok(done)
    }

    fn program_chunk(
        &mut self,
        op: &'static str,
        address: u64,
        source: Option<&[u8]>,
        from: u64,
        len: u64,
    ) -> Result<()> {
        let payload = match source {
            Some(data) => Payload::Data(&data[from as usize..(from + len) as usize]),
            None => Payload::Erase,
        };

        self.buf.clear();
        encode_request(Command::Write, address, len, payload, &mut self.buf)?;
        self.send_frame()?;

        let response = decode_response(self.receive_frame(RESPONSE_HEADER_SIZE)?)?;
        check_chunk(op, Command::Write, &response, len)?;
        debug!(op, address, len, "chunk confirmed");
        Ok(())
    }

    /// Read loop. Full chunks go out while at least one budget remains; a
    /// non-empty remainder goes out last.
    fn read_chunks(&mut self, offset: u64, dst: &mut [u8]) -> Result<u64> {
        let total = dst.len() as u64;
        let budget = self.response_budget();
        let mut address = offset;
        let mut rest = dst;

        while rest.len() >= budget {
            let (chunk, tail) = mem::take(&mut rest).split_at_mut(budget);
            self.read_chunk(address, chunk)?;
            address += budget as u64;
            rest = tail;
        }

        if !rest.is_empty() {
            self.read_chunk(address, rest)?;
        }

        debug!(op = "read", offset, bytes = total, "operation complete");
        Ok(total)
    }

    fn read_chunk(&mut self, address: u64, dst: &mut [u8]) -> Result<()> {
        let len = dst.len();

        self.buf.clear();
        encode_request(Command::Read, address, len as u64, Payload::None, &mut self.buf)?;
        self.send_frame()?;

        let response = decode_response(self.receive_frame(RESPONSE_HEADER_SIZE + len)?)?;
        check_chunk("read", Command::Read, &response, len as u64)?;
        dst.copy_from_slice(response.payload);
        debug!(op = "read", address, len, "chunk confirmed");
        Ok(())
    }

    /// Send the whole frame buffer.
    fn send_frame(&mut self) -> Result<()> {
        let expected = self.buf.len();
        let actual = self.link.send(&self.buf)?;
        if actual != expected {
            error!(expected, actual, "link accepted a partial frame");
            return Err(TransportError::ShortSend { expected, actual }.into());
        }
        Ok(())
    }

    /// Receive exactly `len` bytes into the frame buffer.
    fn receive_frame(&mut self, len: usize) -> Result<&[u8]> {
        self.buf.clear();
        self.buf.resize(len, 0);
        let actual = self.link.receive(&mut self.buf)?;
        if actual != len {
            error!(expected = len, actual, "link delivered a partial frame");
            return Err(TransportError::ShortReceive {
                expected: len,
                actual,
            }
            .into());
        }
        Ok(&self.buf)
    }
}

/// The echo must match, status must be OK and the confirmed count must
/// match exactly.
fn check_chunk(
    op: &'static str,
    command: Command,
    response: &Response<'_>,
    requested: u64,
) -> Result<()> {
    check_echo(command, response)?;
    if !response.status().is_ok() {
        log_status(op, response.status, response.status());
        return Err(NvmError::protocol(command, response.status));
    }
    let confirmed = u64::from(response.count);
    if confirmed != requested {
        error!(
            op,
            requested, confirmed, "peer confirmed a different byte count than requested"
        );
        return Err(NvmError::ShortTransfer {
            command,
            requested,
            confirmed,
        });
    }
    Ok(())
}

/// A read payload is only attached to a `Read` echo, so a mismatched echo
/// cannot be trusted for any command.
fn check_echo(command: Command, response: &Response<'_>) -> Result<()> {
    if response.command != command {
        error!(
            sent = %command,
            echoed = %response.command,
            "peer echoed a different command"
        );
        return Err(FrameError::EchoMismatch {
            sent: command,
            echoed: response.command,
        }
        .into());
    }
    Ok(())
}

fn log_status(op: &'static str, code: i8, status: Status) {
    error!(op, code, "operation failed, error: {status}");
}

impl<L: Link> Nvm for NvmDriver<L> {
    fn get_size(&mut self) -> Result<u64> {
        NvmDriver::get_size(self)
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<u64> {
        NvmDriver::write(self, offset, bytes)
    }

    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        NvmDriver::read(self, offset, length)
    }

    fn erase(&mut self, offset: u64, length: u64) -> Result<u64> {
        NvmDriver::erase(self, offset, length)
    }

    fn read_into(&mut self, offset: u64, buf: &mut [u8]) -> Result<u64> {
        NvmDriver::read_into(self, offset, buf)
    }
}

impl<L> std::fmt::Debug for NvmDriver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NvmDriver").field("mtu", &self.mtu).finish()
    }
}
