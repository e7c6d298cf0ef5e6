//! Aux packet definition and framing.
//!
//! # Frame Format
//!
//! ```text
//! +------+-----+-----+-----+-----+-------------------+-----+
//! | SOM  | LEN | SRC | RCV | CMD | payload (LEN - 3) | CHK |
//! | 0x3B |     |     |     |     |                   |     |
//! +------+-----+-----+-----+-----+-------------------+-----+
//! ```
//!
//! LEN counts SRC, RCV, CMD and the payload. CHK is the two's complement of
//! the sum of LEN through the last payload byte.

use super::checksum;
use super::names::{address_name, command_name};
use crate::error::{AuxError, AuxResult};
use std::fmt;

/// Start-of-message marker.
pub const SOM: u8 = 0x3B;

/// LEN value of a packet with no payload (SRC, RCV, CMD).
pub const HEADER_LEN: u8 = 3;

/// Largest payload that still fits in the one-byte LEN field.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - HEADER_LEN as usize;

/// Result of comparing a received checksum with the calculated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// No checksum was received (outgoing packet).
    Unknown,
    Ok,
    Failed,
}

impl fmt::Display for ChecksumStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChecksumStatus::Unknown => "??",
            ChecksumStatus::Ok => "OK",
            ChecksumStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A single Aux packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    source_address: u8,
    receiver_address: u8,
    command: u8,
    data: Vec<u8>,
    received_checksum: Option<u8>,
}

impl Packet {
    /// Creates an outgoing packet.
    ///
    /// Fails if the payload does not fit in a single frame.
    pub fn new(
        source_address: u8,
        receiver_address: u8,
        command: u8,
        data: impl Into<Vec<u8>>,
    ) -> AuxResult<Self> {
        let data = data.into();
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(AuxError::PayloadTooLong { len: data.len() });
        }
        Ok(Packet {
            source_address,
            receiver_address,
            command,
            data,
            received_checksum: None,
        })
    }

    /// Creates a packet from wider integer values, rejecting any value
    /// outside `0..=255` instead of truncating it.
    pub fn from_values<I, T>(
        source_address: u8,
        receiver_address: u8,
        command: u8,
        values: I,
    ) -> AuxResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        let mut data = Vec::new();
        for value in values {
            let value = value.into();
            let byte = u8::try_from(value).map_err(|_| AuxError::DataByteOutOfRange { command, value })?;
            data.push(byte);
        }
        Self::new(source_address, receiver_address, command, data)
    }

    pub fn source_address(&self) -> u8 {
        self.source_address
    }

    pub fn receiver_address(&self) -> u8 {
        self.receiver_address
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checksum byte read off the wire, if this packet was received.
    pub fn received_checksum(&self) -> Option<u8> {
        self.received_checksum
    }

    pub fn set_received_checksum(&mut self, checksum: u8) {
        self.received_checksum = Some(checksum);
    }

    /// Value of the LEN field.
    pub fn len_field(&self) -> u8 {
        HEADER_LEN + self.data.len() as u8
    }

    /// Serializes the packet into a complete frame.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.wire_size());
        buffer.push(SOM);
        buffer.push(self.len_field());
        buffer.push(self.source_address);
        buffer.push(self.receiver_address);
        buffer.push(self.command);
        buffer.extend_from_slice(&self.data);

        // Everything after SOM takes part in the checksum
        let chk = checksum::compute(&buffer[1..]);
        buffer.push(chk);
        buffer
    }

    /// Total frame size: SOM, LEN, CHK plus LEN bytes.
    pub fn wire_size(&self) -> usize {
        self.len_field() as usize + 3
    }

    /// The checksum this packet should carry.
    pub fn calculated_checksum(&self) -> u8 {
        let mut sum = self
            .len_field()
            .wrapping_add(self.source_address)
            .wrapping_add(self.receiver_address)
            .wrapping_add(self.command);
        for &b in &self.data {
            sum = sum.wrapping_add(b);
        }
        sum.wrapping_neg()
    }

    /// Compares the received checksum against the calculated one.
    ///
    /// Returns `None` for packets that never came off the wire.
    pub fn is_checksum_ok(&self) -> Option<bool> {
        self.received_checksum
            .map(|received| received == self.calculated_checksum())
    }

    pub fn checksum_status(&self) -> ChecksumStatus {
        match self.is_checksum_ok() {
            None => ChecksumStatus::Unknown,
            Some(true) => ChecksumStatus::Ok,
            Some(false) => ChecksumStatus::Failed,
        }
    }

    /// Interprets the payload as a big-endian unsigned integer.
    ///
    /// Bytes beyond the eighth shift out of the result.
    pub fn parse_value(&self) -> u64 {
        self.data
            .iter()
            .fold(0u64, |value, &b| (value << 8) | b as u64)
    }

    /// Space separated uppercase hex of the encoded frame.
    pub fn to_hex_string(&self) -> String {
        self.encode()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Human readable, multi-line diagnostic rendering.
    pub fn describe(&self) -> String {
        let parsed = if self.data.len() <= 3 {
            self.parse_value().to_string()
        } else {
            "N/A".to_string()
        };

        format!(
            "Addr 0x{:02X} ({}) -> Addr 0x{:02X} ({}): Cmd={:02X} ({}) Data={:?}  [value: {}; checksum: {}]\n[hex bytes: {}]",
            self.source_address,
            address_name(self.source_address),
            self.receiver_address,
            address_name(self.receiver_address),
            self.command,
            command_name(self.command),
            self.data,
            parsed,
            self.checksum_status(),
            self.to_hex_string(),
        )
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Splits a value into three bytes, most significant first.
///
/// Bits above the 24th are dropped without warning; motor positions are
/// 24-bit on the wire.
pub fn int_to_three_bytes(value: u32) -> [u8; 3] {
    [
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty_payload() {
        let packet = Packet::new(0x20, 0x12, 0x01, Vec::new()).unwrap();
        assert_eq!(packet.encode(), vec![0x3B, 0x03, 0x20, 0x12, 0x01, 0xCA]);
        assert_eq!(packet.wire_size(), 6);
    }

    #[test]
    fn test_encode_with_payload() {
        let packet = Packet::new(0x20, 0x12, 0x17, int_to_three_bytes(0x0186A0)).unwrap();
        let bytes = packet.encode();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[1], 6);
        assert_eq!(&bytes[5..8], &[0x01, 0x86, 0xA0]);
        assert!(checksum::verify(&bytes[1..]));
    }

    #[test]
    fn test_calculated_checksum_matches_encoding() {
        let packet = Packet::new(0x20, 0x32, 0xFE, vec![0xFF, 0x80, 0x7F, 0x00]).unwrap();
        assert_eq!(packet.calculated_checksum(), *packet.encode().last().unwrap());
    }

    #[test]
    fn test_from_values_rejects_out_of_range() {
        let err = Packet::from_values(0x20, 0x12, 0x27, [1i32, 256]).unwrap_err();
        assert!(matches!(
            err,
            AuxError::DataByteOutOfRange { command: 0x27, value: 256 }
        ));

        let err = Packet::from_values(0x20, 0x12, 0x27, [-1i32]).unwrap_err();
        assert!(matches!(err, AuxError::DataByteOutOfRange { value: -1, .. }));

        let ok = Packet::from_values(0x20, 0x12, 0x27, [0i32, 255]).unwrap();
        assert_eq!(ok.data(), &[0, 255]);
    }

    #[test]
    fn test_payload_limit() {
        assert!(Packet::new(0x20, 0x12, 0x01, vec![0u8; MAX_PAYLOAD_LEN]).is_ok());
        let err = Packet::new(0x20, 0x12, 0x01, vec![0u8; MAX_PAYLOAD_LEN + 1]).unwrap_err();
        assert!(matches!(err, AuxError::PayloadTooLong { len: 253 }));
    }

    #[test]
    fn test_checksum_status() {
        let mut packet = Packet::new(0x12, 0x20, 0x01, vec![0x00, 0x10, 0x00]).unwrap();
        assert_eq!(packet.checksum_status(), ChecksumStatus::Unknown);
        assert_eq!(packet.is_checksum_ok(), None);

        let good = packet.calculated_checksum();
        packet.set_received_checksum(good);
        assert_eq!(packet.checksum_status(), ChecksumStatus::Ok);

        packet.set_received_checksum(good.wrapping_add(1));
        assert_eq!(packet.checksum_status(), ChecksumStatus::Failed);
    }

    #[test]
    fn test_parse_value_big_endian() {
        let packet = Packet::new(0x12, 0x20, 0x01, vec![0x0A, 0x0B, 0x0C]).unwrap();
        assert_eq!(packet.parse_value(), 0x0A0B0C);
        let empty = Packet::new(0x12, 0x20, 0x01, Vec::new()).unwrap();
        assert_eq!(empty.parse_value(), 0);
    }

    #[test]
    fn test_describe() {
        let packet = Packet::new(0x20, 0x12, 0x01, Vec::new()).unwrap();
        let text = packet.describe();
        assert!(text.contains("Addr 0x20 (PC) -> Addr 0x12 (FOC_TEMP)"));
        assert!(text.contains("Cmd=01 (MTR_GET_POS)"));
        assert!(text.contains("value: 0; checksum: ??"));
        assert!(text.contains("[hex bytes: 3B 03 20 12 01 CA]"));

        let long = Packet::new(0x12, 0x20, 0x99, vec![1, 2, 3, 4]).unwrap();
        let text = long.to_string();
        assert!(text.contains("value: N/A"));
        assert!(text.contains("UNKNOWN(0x99)"));
    }

    #[test]
    fn test_int_to_three_bytes() {
        assert_eq!(int_to_three_bytes(0x0A0B0C), [0x0A, 0x0B, 0x0C]);
        assert_eq!(int_to_three_bytes(0), [0, 0, 0]);
        // Truncates above 24 bits
        assert_eq!(int_to_three_bytes(0x12345678), [0x34, 0x56, 0x78]);
    }
}
