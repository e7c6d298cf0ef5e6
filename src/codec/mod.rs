//! # Aux Codec Module
//!
//! Framing, checksumming and incremental decoding of Aux packets.
//!
//! ## Key Types
//!
//! - [`Packet`] - One addressed command or response
//! - [`PacketReader`] - Resynchronizing byte-stream decoder
//! - [`Address`] / [`Command`] - Named codes for diagnostics
//!
//! ## Example
//!
//! ```
//! use aux_protocol::codec::{Packet, Address, Command};
//!
//! let packet = Packet::new(Address::Pc.into(), Address::FocuserTemp.into(), Command::MtrGetPos.into(), Vec::new())?;
//! assert_eq!(packet.encode(), vec![0x3B, 0x03, 0x20, 0x12, 0x01, 0xCA]);
//! # Ok::<(), aux_protocol::AuxError>(())
//! ```

pub mod checksum;
pub mod names;
pub mod packet;
pub mod reader;

pub use names::{Address, Command, address_name, command_name};
pub use packet::{ChecksumStatus, HEADER_LEN, MAX_PAYLOAD_LEN, Packet, SOM, int_to_three_bytes};
pub use reader::{PacketReader, ReadStep, ReaderState};

mod tests;
