use super::traits::{AuxTransport, is_timeout};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{BufReader, Error, ErrorKind, Read, Result, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// How long `connect` waits for the TCP handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Point-to-point TCP link to an Aux device (or a serial-to-network bridge).
/// There is no shared bus, so no arbitration and no echo.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        TcpTransport { reader: BufReader::new(stream) }
    }

    /// Connect to a device at the given address
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        // Frames are tiny; don't let Nagle hold them back
        socket.set_nodelay(true)?;
        socket.set_keepalive(true)?;
        socket.connect_timeout(&SockAddr::from(addr), CONNECT_TIMEOUT)?;
        Ok(Self::new(socket.into()))
    }

    /// Resolve `host` and connect to the first address that accepts.
    pub fn connect_host(host: &str, port: u16) -> Result<Self> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match Self::connect(addr) {
                Ok(transport) => return Ok(transport),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            Error::new(ErrorKind::NotFound, format!("{} did not resolve to any address", host))
        }))
    }

    /// Get peer address
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.reader.get_ref().peer_addr()
    }

    /// Returns a handle that can shut the connection down from another
    /// thread, making a blocked `read_byte` fail promptly.
    pub fn close_handle(&self) -> Result<TcpCloseHandle> {
        Ok(TcpCloseHandle { stream: self.reader.get_ref().try_clone()? })
    }
}

impl AuxTransport for TcpTransport {
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.reader.get_ref().set_read_timeout(Some(timeout))
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    return Err(Error::new(ErrorKind::UnexpectedEof, "connection closed"));
                }
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data)?;
        stream.flush()
    }

    fn close(&mut self) -> Result<()> {
        match self.reader.get_ref().shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

/// Cross-thread shutdown for a [`TcpTransport`].
pub struct TcpCloseHandle {
    stream: TcpStream,
}

impl TcpCloseHandle {
    pub fn close(&self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}
