use thiserror::Error;

/// Errors raised by the Aux protocol engine.
///
/// Read timeouts are not errors; they surface as `Ok(None)` from the reader
/// and the session.
#[derive(Debug, Error)]
pub enum AuxError {
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("packet data byte out of range: cmd={command:02X}, value={value}")]
    DataByteOutOfRange { command: u8, value: i64 },

    #[error("payload of {len} bytes exceeds the {max} byte frame limit", max = crate::codec::MAX_PAYLOAD_LEN)]
    PayloadTooLong { len: usize },

    #[error("serial port error: {0}")]
    Serial(String),

    #[error("invalid session configuration: {0}")]
    Config(String),
}

pub type AuxResult<T> = std::result::Result<T, AuxError>;
