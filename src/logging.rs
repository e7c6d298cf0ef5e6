use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for the protocol engine's diagnostic lines.
pub trait AuxLogger: Send + Sync {
    fn log(&self, level: LogLevel, component: &str, msg: &str);
}

/// Forwards to the `log` facade, using the component as the target.
pub struct LogFacadeLogger;

impl LogFacadeLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl AuxLogger for LogFacadeLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        let level = match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        };
        log::log!(target: component, level, "{}", msg);
    }
}

/// Writes `LEVEL component: msg` lines to stderr, bypassing the `log`
/// facade. Keeps packet dumps apart from a tool's stdout.
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }

    fn format_line(level: LogLevel, component: &str, msg: &str) -> String {
        let tag = match level {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        format!("{:<5} {}: {}", tag, component, msg)
    }
}

impl AuxLogger for ConsoleLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        eprintln!("{}", Self::format_line(level, component, msg));
    }
}

/// Keeps every line in memory.
#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the recorded messages.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl AuxLogger for MemoryLogger {
    fn log(&self, level: LogLevel, component: &str, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, format!("[{}] {}", component, msg)));
        }
    }
}
