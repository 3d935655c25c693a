// src/io/serial/reader.rs
//
// Serial port backend for the device seams: opening a host port and pumping its
// bytes into a channel-fed stream.

use async_trait::async_trait;
use std::io::Read;
use std::time::Duration;
use tokio::sync::mpsc;

use super::utils::{is_listed_port, SerialPortInfo, DATA_BITS, PARITY, STOP_BITS};
use crate::io::device::{ChannelSource, DeviceHandle, DevicePicker, SerialDevice};

// ============================================================================
// Types and Configuration
// ============================================================================

/// Bit rate the t10 firmware listens at.
pub const BAUD_RATE: u32 = 115_200;

/// Error reported when the picker is dismissed without a choice.
pub const NO_PORT_SELECTED: &str = "NotFoundError: No port selected by the user.";

const READ_BUFFER_SIZE: usize = 256;
const CHUNK_QUEUE_DEPTH: usize = 64;

// ============================================================================
// Serial Port Device
// ============================================================================

/// A host serial port, not yet opened.
pub struct SerialPortDevice {
    port: String,
    /// Poll interval of the blocking reader. A timeout is not a read failure.
    read_timeout: Duration,
}

impl SerialPortDevice {
    pub fn new(port: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            port: port.into(),
            read_timeout,
        }
    }
}

#[async_trait]
impl SerialDevice for SerialPortDevice {
    fn name(&self) -> &str {
        &self.port
    }

    async fn open(&mut self, baud_rate: u32) -> Result<DeviceHandle, String> {
        let port_name = self.port.clone();
        let read_timeout = self.read_timeout;

        let serial_port = tokio::task::spawn_blocking(move || {
            serialport::new(&port_name, baud_rate)
                .data_bits(DATA_BITS)
                .parity(PARITY)
                .stop_bits(STOP_BITS)
                .timeout(read_timeout)
                .open()
        })
        .await
        .map_err(|e| format!("Open task failed for {}: {}", self.port, e))?
        .map_err(|e| format!("Failed to open {}: {}", self.port, e))?;

        tlog!("[serial] Opened {} at {} baud (8-N-1)", self.port, baud_rate);

        let (tx, source) = ChannelSource::channel(CHUNK_QUEUE_DEPTH);
        let port_name = self.port.clone();
        tokio::task::spawn_blocking(move || pump_serial_port(serial_port, port_name, tx));

        Ok(DeviceHandle::new(self.port.clone(), Box::new(source)))
    }
}

/// Blocking read loop feeding a `ChannelSource`.
/// Runs until EOF, a read error, or the consuming side going away.
fn pump_serial_port(
    mut serial_port: Box<dyn serialport::SerialPort>,
    port_name: String,
    tx: mpsc::Sender<std::io::Result<Vec<u8>>>,
) {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let reason;

    loop {
        if tx.is_closed() {
            reason = "released";
            break;
        }

        match serial_port.read(&mut buf) {
            Ok(0) => {
                // EOF - port closed/disconnected. Dropping tx ends the stream.
                reason = "disconnected";
                break;
            }
            Ok(n) => {
                if tx.blocking_send(Ok(buf[..n].to_vec())).is_err() {
                    reason = "released";
                    break;
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                // Timeout is expected for serial reads
            }
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                reason = "error";
                break;
            }
        }
    }

    tlog!("[serial] Reader for {} stopped ({})", port_name, reason);
}

// ============================================================================
// Port Selection
// ============================================================================

/// Picker holding the port the user chose, or `None` if they dismissed the choice.
pub struct SelectedPort {
    choice: Option<String>,
    read_timeout: Duration,
}

impl SelectedPort {
    pub fn new(choice: Option<String>, read_timeout: Duration) -> Self {
        Self {
            choice,
            read_timeout,
        }
    }
}

#[async_trait]
impl DevicePicker for SelectedPort {
    async fn request_port(&mut self) -> Result<Box<dyn SerialDevice>, String> {
        match self.choice.take() {
            Some(port) => Ok(Box::new(SerialPortDevice::new(port, self.read_timeout))),
            None => Err(NO_PORT_SELECTED.to_string()),
        }
    }
}

/// List the serial ports the host reports.
pub fn list_serial_ports() -> Result<Vec<SerialPortInfo>, String> {
    let ports = serialport::available_ports().map_err(|e| format!("Failed to enumerate ports: {}", e))?;

    Ok(ports
        .into_iter()
        .filter(|p| is_listed_port(&p.port_name))
        .map(|p| SerialPortInfo::from_port(p.port_name, p.port_type))
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
