// src/io/serial/utils.rs
//
// Shared helpers for the serialport crate: line settings and port descriptions.

use serde::Serialize;
use serialport::{DataBits, Parity, SerialPortType, StopBits};

// ============================================================================
// Line Settings
// ============================================================================

/// The t10 talks 8N1; only the bit rate is ever chosen.
pub const DATA_BITS: DataBits = DataBits::Eight;
pub const PARITY: Parity = Parity::None;
pub const STOP_BITS: StopBits = StopBits::One;

// ============================================================================
// Port Descriptions
// ============================================================================

/// Information about an available serial port
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SerialPortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Build from the serialport crate's description of a port.
    pub fn from_port(port_name: String, port_type: SerialPortType) -> Self {
        let (port_type, manufacturer, product, serial_number, vid, pid) = match port_type {
            SerialPortType::UsbPort(info) => (
                "USB".to_string(),
                info.manufacturer,
                info.product,
                info.serial_number,
                Some(info.vid),
                Some(info.pid),
            ),
            SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None, None, None, None),
            SerialPortType::PciPort => ("PCI".to_string(), None, None, None, None, None),
            SerialPortType::Unknown => ("Unknown".to_string(), None, None, None, None, None),
        };
        SerialPortInfo {
            port_name,
            port_type,
            manufacturer,
            product,
            serial_number,
            vid,
            pid,
        }
    }

    /// One-line label for pickers and listings, e.g. `/dev/ttyACM0  USB 2e8a:000a  t10 MIDI-CV`.
    pub fn label(&self) -> String {
        let mut label = format!("{}  {}", self.port_name, self.port_type);
        if let (Some(vid), Some(pid)) = (self.vid, self.pid) {
            label.push_str(&format!(" {:04x}:{:04x}", vid, pid));
        }
        if let Some(product) = &self.product {
            label.push_str("  ");
            label.push_str(product);
        }
        label
    }
}

/// Whether a port should be offered to the user.
/// On macOS only the /dev/cu.* (calling unit) side of each device is shown.
pub fn is_listed_port(port_name: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        !port_name.starts_with("/dev/tty.")
    }
    #[cfg(not(target_os = "macos"))]
    {
        let _ = port_name;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
