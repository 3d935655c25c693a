// src/io/mod.rs
//
// Device access: capability traits, the serial backend, and text decoding.

pub mod decoder;
pub mod device;
pub mod serial;

pub use decoder::TextDecoder;
pub use device::{ByteSource, ChannelSource, DeviceHandle, DevicePicker, SerialDevice, StreamReader};
