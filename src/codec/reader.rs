//! Incremental packet reader.
//!
//! The reader is fed one read result at a time: `Some(byte)` for a byte,
//! `None` for a read that timed out. It hunts for SOM, then commits to the
//! frame; a timeout after SOM throws the partial frame away.
//!
//! ```text
//!   Scanning --SOM--> Header --CMD--> Payload --last byte--> Checksum --> Complete
//!      ^                 |  (LEN < 3)                                        |
//!      +-----------------+-------------------- timeout ----------------------+
//! ```

use super::packet::{HEADER_LEN, Packet, SOM};
use crate::error::AuxResult;
use crate::logging::{AuxLogger, LogFacadeLogger, LogLevel};
use crate::transport::AuxTransport;
use std::sync::Arc;

const COMPONENT: &str = "Reader";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Looking for the start-of-message byte.
    Scanning,
    /// Collecting LEN, SRC, RCV and CMD.
    Header,
    /// Collecting LEN - 3 data bytes.
    Payload,
    /// Waiting for the trailing checksum byte.
    Checksum,
}

/// Outcome of feeding one read result into the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// More bytes are needed.
    Incomplete,
    /// A whole frame was consumed.
    Complete(Packet),
    /// A read timed out and the current read attempt is over.
    TimedOut,
}

pub struct PacketReader {
    state: ReaderState,
    header: [u8; 4],
    header_pos: usize,
    payload: Vec<u8>,
    abort_on_timeout: bool,
    debug: bool,
    logger: Arc<dyn AuxLogger>,
}

impl PacketReader {
    pub fn new() -> Self {
        PacketReader {
            state: ReaderState::Scanning,
            header: [0u8; 4],
            header_pos: 0,
            payload: Vec::new(),
            abort_on_timeout: true,
            debug: false,
            logger: LogFacadeLogger::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn AuxLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Whether a timeout while scanning for SOM ends the read.
    ///
    /// Timeouts inside a frame always end the read.
    pub fn set_abort_on_timeout(&mut self, abort: bool) {
        self.abort_on_timeout = abort;
    }

    pub fn abort_on_timeout(&self) -> bool {
        self.abort_on_timeout
    }

    /// Logs discarded bytes and idle timeouts.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Drops any partial frame and goes back to scanning.
    pub fn reset(&mut self) {
        self.state = ReaderState::Scanning;
        self.header_pos = 0;
        self.payload.clear();
    }

    fn declared_len(&self) -> u8 {
        self.header[0]
    }

    /// Advances the state machine by one read result.
    pub fn push(&mut self, input: Option<u8>) -> ReadStep {
        let byte = match input {
            Some(byte) => byte,
            None => return self.on_timeout(),
        };

        match self.state {
            ReaderState::Scanning => {
                if byte == SOM {
                    self.header_pos = 0;
                    self.payload.clear();
                    self.state = ReaderState::Header;
                } else if self.debug {
                    let shown = if byte.is_ascii_graphic() { byte as char } else { '.' };
                    self.logger.log(
                        LogLevel::Debug,
                        COMPONENT,
                        &format!("Ignore: {:02X} ({})", byte, shown),
                    );
                }
                ReadStep::Incomplete
            }
            ReaderState::Header => {
                self.header[self.header_pos] = byte;
                self.header_pos += 1;

                if self.header_pos == 1 && self.declared_len() < HEADER_LEN {
                    self.logger.log(
                        LogLevel::Warn,
                        COMPONENT,
                        &format!("Rejecting frame with LEN={} (minimum is {})", byte, HEADER_LEN),
                    );
                    self.reset();
                    return ReadStep::Incomplete;
                }

                if self.header_pos == self.header.len() {
                    let payload_len = (self.declared_len() - HEADER_LEN) as usize;
                    if payload_len == 0 {
                        self.state = ReaderState::Checksum;
                    } else {
                        self.payload.reserve(payload_len);
                        self.state = ReaderState::Payload;
                    }
                }
                ReadStep::Incomplete
            }
            ReaderState::Payload => {
                self.payload.push(byte);
                if self.payload.len() == (self.declared_len() - HEADER_LEN) as usize {
                    self.state = ReaderState::Checksum;
                }
                ReadStep::Incomplete
            }
            ReaderState::Checksum => {
                let [_, source, receiver, command] = self.header;
                let data = std::mem::take(&mut self.payload);
                self.reset();

                // LEN is a single byte so the payload can never exceed the limit
                let mut packet = match Packet::new(source, receiver, command, data) {
                    Ok(packet) => packet,
                    Err(e) => {
                        self.logger.log(LogLevel::Warn, COMPONENT, &format!("Dropping frame: {}", e));
                        return ReadStep::Incomplete;
                    }
                };
                packet.set_received_checksum(byte);
                ReadStep::Complete(packet)
            }
        }
    }

    fn on_timeout(&mut self) -> ReadStep {
        if self.state == ReaderState::Scanning {
            if self.abort_on_timeout {
                return ReadStep::TimedOut;
            }
            if self.debug {
                self.logger.log(LogLevel::Debug, COMPONENT, "...");
            }
            return ReadStep::Incomplete;
        }

        if self.debug {
            self.logger.log(
                LogLevel::Debug,
                COMPONENT,
                &format!("Timeout in {:?}, discarding partial frame", self.state),
            );
        }
        self.reset();
        ReadStep::TimedOut
    }

    /// Pulls bytes from the transport until a frame completes or a read
    /// times out.
    ///
    /// Transport faults other than timeouts are returned as errors and leave
    /// the reader back in `Scanning`.
    pub fn read_packet(&mut self, transport: &mut dyn AuxTransport) -> AuxResult<Option<Packet>> {
        self.reset();
        loop {
            let input = match transport.read_byte() {
                Ok(input) => input,
                Err(e) => {
                    self.reset();
                    return Err(e.into());
                }
            };
            match self.push(input) {
                ReadStep::Incomplete => continue,
                ReadStep::Complete(packet) => return Ok(Some(packet)),
                ReadStep::TimedOut => return Ok(None),
            }
        }
    }
}

impl Default for PacketReader {
    fn default() -> Self {
        Self::new()
    }
}
