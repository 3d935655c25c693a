// src/io/serial/mod.rs
//
// Host serial ports for the t10 editor.
//
// Features:
// - Port enumeration for the port picker
// - Opening a port at the fixed bit rate (8-N-1)
// - A blocking reader thread that streams raw chunks to the read loop

pub mod reader;
pub(crate) mod utils;

pub use reader::{list_serial_ports, SelectedPort, SerialPortDevice, BAUD_RATE, NO_PORT_SELECTED};
pub use utils::SerialPortInfo;
