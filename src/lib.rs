//! Client side of the Aux protocol used by PlaneWave-style focusers,
//! rotators, fans, temperature sensors and dew heaters.
//!
//! Frames are exchanged over a shared serial bus (RTS/CTS arbitrated, with
//! echo) or a direct TCP link. [`Session::send_receive`] is the one
//! transaction primitive; everything device-specific is built on top of it.

pub mod codec;
pub mod error;
pub mod logging;
pub mod session;
pub mod transport;

pub use codec::{Address, Command, Packet, PacketReader, int_to_three_bytes};
pub use error::{AuxError, AuxResult};
pub use session::{Session, SessionConfig};
pub use transport::{AuxTransport, SerialTransport, TcpTransport};
