use std::io::Result;
use std::time::Duration;

/// Byte-level link to an Aux bus.
/// Object-safe so a session can own any link behind a `Box<dyn AuxTransport>`.
pub trait AuxTransport: Send {
    /// Sets how long `read_byte` may block before reporting a timeout.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;

    /// Reads a single byte.
    /// Returns `Ok(None)` when nothing arrived within the read timeout.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Writes the whole buffer.
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Acquires a shared bus before transmitting. No-op on point-to-point links.
    fn take_bus(&mut self) -> Result<()> {
        Ok(())
    }

    /// Gives the bus back. No-op on point-to-point links.
    fn release_bus(&mut self) -> Result<()> {
        Ok(())
    }

    /// True for shared buses that echo transmissions and need RTS/CTS.
    fn requires_arbitration(&self) -> bool {
        false
    }

    fn close(&mut self) -> Result<()>;
}

/// True for the error kinds a read returns when its timeout expires.
pub(crate) fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
}
