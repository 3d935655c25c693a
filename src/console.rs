// src/console.rs
//
// Connection indicator and the append-only line log shown in the console view.

/// Line appended once a device has been opened.
pub const CONNECTED_LINE: &str = "Connected";

/// Prefix for every chunk of text received from the device.
pub const INBOUND_MARKER: &str = "← ";

/// Whether a device handle is currently open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// Ordered, append-only list of console lines.
///
/// There is no API to remove or rewrite an entry; the log only grows.
#[derive(Clone, Debug, Default)]
pub struct LineLog {
    lines: Vec<String>,
}

impl LineLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

/// Console line for a failed connect attempt.
pub fn connection_failed_line(reason: &str) -> String {
    format!("Connection failed: {}", reason)
}

/// Console line for a chunk of inbound text.
pub fn inbound_line(text: &str) -> String {
    format!("{}{}", INBOUND_MARKER, text)
}

/// Console line for a failed read.
pub fn read_error_line(reason: &str) -> String {
    format!("Read error: {}", reason)
}
