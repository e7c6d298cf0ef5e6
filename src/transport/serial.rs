use super::traits::{AuxTransport, is_timeout};
use std::io::{Error, ErrorKind, Read, Result, Write};
use std::time::Duration;

/// Default baud rate of the EFA kit. Devices with native USB ignore it.
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// A serial line with the modem-control signals the Aux bus uses.
pub trait SerialLine: Read + Write + Send {
    fn set_line_timeout(&mut self, timeout: Duration) -> Result<()>;

    /// Level of the Clear-To-Send input.
    fn read_cts(&mut self) -> Result<bool>;

    /// Drives the Request-To-Send output.
    fn write_rts(&mut self, level: bool) -> Result<()>;
}

#[cfg(feature = "serial")]
impl SerialLine for Box<dyn serialport::SerialPort> {
    fn set_line_timeout(&mut self, timeout: Duration) -> Result<()> {
        serialport::SerialPort::set_timeout(&mut **self, timeout).map_err(Into::into)
    }

    fn read_cts(&mut self) -> Result<bool> {
        serialport::SerialPort::read_clear_to_send(&mut **self).map_err(Into::into)
    }

    fn write_rts(&mut self, level: bool) -> Result<()> {
        serialport::SerialPort::write_request_to_send(&mut **self, level).map_err(Into::into)
    }
}

/// Serial link to an Aux bus.
///
/// With RTS/CTS enabled the link is a shared bus (EFA kit plus hand
/// controller): the sender waits for CTS to drop, raises RTS, and the bus
/// echoes every frame back. Devices with their own USB port (Delta-T,
/// mirror cover) use neither.
///
/// Arbitration is advisory. `take_bus` spins on CTS with no upper bound and
/// relies on the other bus members releasing it.
///
/// `close` drops the port; every later call fails with `NotConnected`.
pub struct SerialTransport {
    line: Option<Box<dyn SerialLine>>,
    use_rts_cts: bool,
}

impl SerialTransport {
    /// Wraps an already-open line.
    pub fn with_line(mut line: Box<dyn SerialLine>, use_rts_cts: bool) -> Result<Self> {
        if use_rts_cts {
            // Holding RTS high would lock the hand controller off the bus
            line.write_rts(false)?;
        }
        Ok(SerialTransport { line: Some(line), use_rts_cts })
    }

    /// Opens a serial port by name (`/dev/ttyUSB0`, `COM3`, ...).
    #[cfg(feature = "serial")]
    pub fn open(path: &str, baud_rate: u32, use_rts_cts: bool) -> crate::AuxResult<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_secs(1))
            .open()
            .map_err(|e| crate::AuxError::Serial(format!("{}: {}", path, e)))?;
        Ok(Self::with_line(Box::new(port), use_rts_cts)?)
    }

    pub fn uses_rts_cts(&self) -> bool {
        self.use_rts_cts
    }

    pub fn is_open(&self) -> bool {
        self.line.is_some()
    }

    fn line(&mut self) -> Result<&mut Box<dyn SerialLine>> {
        self.line
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::NotConnected, "serial port is closed"))
    }
}

impl AuxTransport for SerialTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.line()?.set_line_timeout(timeout)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let line = self.line()?;
        let mut buf = [0u8; 1];
        loop {
            match line.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let line = self.line()?;
        line.write_all(data)?;
        line.flush()
    }

    fn take_bus(&mut self) -> Result<()> {
        if self.use_rts_cts {
            let line = self.line()?;
            while line.read_cts()? {
                std::hint::spin_loop();
            }
            line.write_rts(true)?;
        }
        Ok(())
    }

    fn release_bus(&mut self) -> Result<()> {
        if self.use_rts_cts {
            self.line()?.write_rts(false)?;
        }
        Ok(())
    }

    fn requires_arbitration(&self) -> bool {
        self.use_rts_cts
    }

    fn close(&mut self) -> Result<()> {
        // Closing twice is fine
        let Some(mut line) = self.line.take() else {
            return Ok(());
        };
        if self.use_rts_cts {
            line.write_rts(false)?;
        }
        line.flush()
    }
}
