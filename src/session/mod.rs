//! # Aux Session Module
//!
//! The protocol engine: addressed request/response transactions over one
//! transport.
//!
//! ## Transaction
//!
//! 1. Build a packet from the local address and take the bus
//! 2. Write the frame
//! 3. On arbitrated buses, read back the echo and release the bus
//! 4. Read packets until one is addressed to the local address, or a read
//!    times out
//!
//! Nothing is retried. A timeout anywhere yields `Ok(None)`; deciding
//! whether to try again belongs to the caller.
//!
//! ## Example
//!
//! ```ignore
//! let mut session = Session::open_tcp("192.168.1.50", 8899)?;
//! let response = session.send_receive(Address::FocuserTemp.into(), Command::GetVersion.into(), &[])?;
//! ```

pub mod config;

pub use config::{LinkConfig, SessionConfig};

use crate::codec::{Address, Packet, PacketReader};
use crate::error::{AuxError, AuxResult};
use crate::logging::{AuxLogger, LogFacadeLogger, LogLevel};
use crate::transport::{AuxTransport, TcpTransport};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const COMPONENT: &str = "Session";

pub struct Session {
    my_address: u8,
    transport: Box<dyn AuxTransport>,
    use_rts_cts: bool,
    reader: PacketReader,
    debug: bool,
    logger: Arc<dyn AuxLogger>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("my_address", &format_args!("0x{:02X}", self.my_address))
            .field("use_rts_cts", &self.use_rts_cts)
            .field("abort_on_timeout", &self.reader.abort_on_timeout())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Address of the host computer on an Aux bus.
    pub const DEFAULT_ADDRESS: u8 = Address::Pc as u8;

    /// Wraps an already-configured transport.
    ///
    /// Arbitration follows `transport.requires_arbitration()`.
    pub fn new(transport: Box<dyn AuxTransport>) -> Self {
        let logger: Arc<dyn AuxLogger> = LogFacadeLogger::new();
        Session {
            my_address: Self::DEFAULT_ADDRESS,
            use_rts_cts: transport.requires_arbitration(),
            transport,
            reader: PacketReader::new().with_logger(logger.clone()),
            debug: false,
            logger,
        }
    }

    pub fn with_address(mut self, my_address: u8) -> Self {
        self.my_address = my_address;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn AuxLogger>) -> Self {
        self.reader = std::mem::take(&mut self.reader).with_logger(logger.clone());
        self.logger = logger;
        self
    }

    /// Opens the link named in `config` and applies its settings.
    pub fn open(config: &SessionConfig) -> AuxResult<Self> {
        let link = config
            .link
            .as_ref()
            .ok_or_else(|| AuxError::Config("no link configured".to_string()))?;

        let (transport, timeout): (Box<dyn AuxTransport>, Duration) = match link {
            #[cfg(feature = "serial")]
            LinkConfig::Serial { port, use_rts_cts } => {
                let serial = crate::transport::SerialTransport::open(port, config.baud_rate, *use_rts_cts)?;
                (Box::new(serial) as Box<dyn AuxTransport>, config.serial_timeout())
            }
            #[cfg(not(feature = "serial"))]
            LinkConfig::Serial { port, .. } => {
                return Err(AuxError::Serial(format!(
                    "{}: built without the `serial` feature",
                    port
                )));
            }
            LinkConfig::Tcp { host, port } => {
                let tcp = TcpTransport::connect_host(host, *port)?;
                (Box::new(tcp) as Box<dyn AuxTransport>, config.tcp_timeout())
            }
        };

        let mut session = Session::new(transport).with_address(config.my_address);
        session.transport.set_read_timeout(timeout)?;
        session.set_abort_on_timeout(config.abort_on_timeout);
        session.set_debug(config.debug);
        session.logger.log(
            LogLevel::Info,
            COMPONENT,
            &format!("Opened {:?} as 0x{:02X}", link, config.my_address),
        );
        Ok(session)
    }

    /// Opens a serial port with a one second read timeout.
    #[cfg(feature = "serial")]
    pub fn open_serial(port: &str, use_rts_cts: bool) -> AuxResult<Self> {
        Self::open(&SessionConfig {
            link: Some(LinkConfig::Serial { port: port.to_string(), use_rts_cts }),
            ..SessionConfig::default()
        })
    }

    /// Connects over TCP with a five second read timeout.
    pub fn open_tcp(host: &str, port: u16) -> AuxResult<Self> {
        Self::open(&SessionConfig {
            link: Some(LinkConfig::Tcp { host: host.to_string(), port }),
            ..SessionConfig::default()
        })
    }

    pub fn my_address(&self) -> u8 {
        self.my_address
    }

    /// True when the link needs RTS/CTS and echoes every frame.
    pub fn uses_arbitration(&self) -> bool {
        self.use_rts_cts
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.reader.set_debug(debug);
    }

    pub fn abort_on_timeout(&self) -> bool {
        self.reader.abort_on_timeout()
    }

    pub fn set_abort_on_timeout(&mut self, abort: bool) {
        self.reader.set_abort_on_timeout(abort);
    }

    fn debug_log(&self, msg: &str) {
        if self.debug {
            self.logger.log(LogLevel::Debug, COMPONENT, msg);
        }
    }

    /// Sends one packet to `destination`.
    ///
    /// Takes the bus first and leaves it held: on a shared bus the sender
    /// keeps it until its own echo comes back (see [`Session::send_receive`]).
    pub fn send(&mut self, destination: u8, command: u8, data: &[u8]) -> AuxResult<()> {
        let packet = Packet::new(self.my_address, destination, command, data)?;
        self.debug_log(&format!("Send: {}", packet.to_hex_string()));

        self.transport.take_bus()?;
        self.transport.write_bytes(&packet.encode())?;
        Ok(())
    }

    /// Sends a packet and waits for the reply addressed to this session.
    ///
    /// Returns `Ok(None)` if the echo or the reply does not arrive in time.
    /// After an echo timeout the bus is still held; call
    /// [`Session::release_bus`] or reopen the link.
    pub fn send_receive(&mut self, destination: u8, command: u8, data: &[u8]) -> AuxResult<Option<Packet>> {
        self.send(destination, command, data)?;

        if self.use_rts_cts {
            // The bus repeats our own frame before anything else
            match self.reader.read_packet(&mut *self.transport)? {
                Some(echo) => self.debug_log(&format!("Echo: {}", echo.describe())),
                None => {
                    self.logger.log(LogLevel::Warn, COMPONENT, "timeout on ack");
                    return Ok(None);
                }
            }
            self.transport.release_bus()?;
        }

        loop {
            let response = match self.reader.read_packet(&mut *self.transport)? {
                Some(response) => response,
                None => {
                    self.logger.log(LogLevel::Warn, COMPONENT, "timeout on response packet");
                    return Ok(None);
                }
            };

            self.debug_log(&format!("Response: {}", response.describe()));

            if response.receiver_address() == self.my_address {
                return Ok(Some(response));
            }
            self.debug_log(&format!("  (Ignored by 0x{:02X})", self.my_address));
        }
    }

    /// Reads the next packet on the link regardless of its address.
    pub fn read_next_packet(&mut self) -> AuxResult<Option<Packet>> {
        let packet = self.reader.read_packet(&mut *self.transport)?;
        if let Some(packet) = &packet {
            self.debug_log(&format!("Received: {}", packet.describe()));
        }
        Ok(packet)
    }

    /// Drops RTS. Needed only after an echo timeout left the bus held.
    pub fn release_bus(&mut self) -> AuxResult<()> {
        self.transport.release_bus()?;
        Ok(())
    }

    /// Closes the underlying transport.
    pub fn close(mut self) -> AuxResult<()> {
        self.transport.close()?;
        self.logger.log(LogLevel::Info, COMPONENT, "Closed");
        Ok(())
    }
}
