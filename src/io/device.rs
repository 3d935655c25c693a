// src/io/device.rs
//
// Host capability seams for device access: picking a device, opening it, and
// claiming its readable byte stream.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};

// ============================================================================
// Traits
// ============================================================================

/// A stream of opaque byte chunks from an open device.
#[async_trait]
pub trait ByteSource: Send {
    /// Wait for the next chunk. `Ok(None)` means the stream is done.
    async fn read_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>>;
}

/// A device the user has chosen but which is not open yet.
#[async_trait]
pub trait SerialDevice: Send {
    fn name(&self) -> &str;

    /// Open the device at the given bit rate.
    async fn open(&mut self, baud_rate: u32) -> Result<DeviceHandle, String>;
}

/// Asks the host (and the user) for a device.
#[async_trait]
pub trait DevicePicker: Send {
    async fn request_port(&mut self) -> Result<Box<dyn SerialDevice>, String>;
}

// ============================================================================
// Device Handle
// ============================================================================

type SharedSource = Arc<Mutex<Box<dyn ByteSource>>>;

/// An open device. Its readable stream can be claimed by one reader at a time.
pub struct DeviceHandle {
    name: String,
    readable: SharedSource,
}

impl DeviceHandle {
    pub fn new(name: impl Into<String>, source: Box<dyn ByteSource>) -> Self {
        Self {
            name: name.into(),
            readable: Arc::new(Mutex::new(source)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Claim the readable stream. Fails if another reader holds it.
    pub fn get_reader(&self) -> Result<StreamReader, String> {
        let guard = self
            .readable
            .clone()
            .try_lock_owned()
            .map_err(|_| format!("Stream of {} is already locked to a reader", self.name))?;
        Ok(StreamReader { guard })
    }

    /// Whether a reader currently holds the stream.
    pub fn is_locked(&self) -> bool {
        self.readable.try_lock().is_err()
    }
}

/// Exclusive claim on a device stream. Dropping it releases the claim.
pub struct StreamReader {
    guard: OwnedMutexGuard<Box<dyn ByteSource>>,
}

impl StreamReader {
    pub async fn read(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        self.guard.read_chunk().await
    }

    pub fn release_lock(self) {
        drop(self.guard);
    }
}

// ============================================================================
// Channel Source
// ============================================================================

/// A `ByteSource` fed through a channel. The stream ends when every sender is gone.
pub struct ChannelSource {
    rx: mpsc::Receiver<std::io::Result<Vec<u8>>>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<std::io::Result<Vec<u8>>>) -> Self {
        Self { rx }
    }

    /// Create a source together with the sender that feeds it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<std::io::Result<Vec<u8>>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ByteSource for ChannelSource {
    async fn read_chunk(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        match self.rx.recv().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
