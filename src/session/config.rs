use crate::error::{AuxError, AuxResult};
use crate::transport::DEFAULT_BAUD_RATE;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Which physical link a session talks over.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinkConfig {
    Serial {
        port: String,
        /// Shared EFA bus with hand controller; USB-native devices leave this off.
        #[serde(default)]
        use_rts_cts: bool,
    },
    Tcp {
        host: String,
        port: u16,
    },
}

/// Session settings.
/// All timing values are in milliseconds unless otherwise specified
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Address this session answers to (default: 0x20, the PC)
    #[serde(default = "default_my_address")]
    pub my_address: u8,
    /// Give up on a read that times out before SOM (default: true)
    #[serde(default = "default_abort_on_timeout")]
    pub abort_on_timeout: bool,
    /// Log every packet sent and received (default: false)
    #[serde(default)]
    pub debug: bool,
    /// Per-byte read timeout on serial links (default: 1000)
    #[serde(default = "default_serial_timeout")]
    pub serial_timeout_ms: u64,
    /// Per-byte read timeout on TCP links (default: 5000)
    #[serde(default = "default_tcp_timeout")]
    pub tcp_timeout_ms: u64,
    /// Serial baud rate (default: 19200)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default)]
    pub link: Option<LinkConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            my_address: default_my_address(),
            abort_on_timeout: default_abort_on_timeout(),
            debug: false,
            serial_timeout_ms: default_serial_timeout(),
            tcp_timeout_ms: default_tcp_timeout(),
            baud_rate: default_baud_rate(),
            link: None,
        }
    }
}

fn default_my_address() -> u8 { 0x20 }
fn default_abort_on_timeout() -> bool { true }
fn default_serial_timeout() -> u64 { 1000 }
fn default_tcp_timeout() -> u64 { 5000 }
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }

impl SessionConfig {
    pub fn from_json_str(json: &str) -> AuxResult<Self> {
        serde_json::from_str(json).map_err(|e| AuxError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> AuxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| AuxError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AuxError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial_timeout_ms)
    }

    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_timeout_ms)
    }
}
