// src/connection.rs
//
// Connection manager and read loop. Both run as background tasks and report to
// the owning `Editor` through an ordered event channel.

use tokio::sync::mpsc;

use crate::io::{DeviceHandle, DevicePicker, TextDecoder};

// ============================================================================
// Session Events
// ============================================================================

/// Messages from the connection task to the editor, delivered in the order sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The device was opened.
    Connected,
    /// Picking or opening the device failed.
    ConnectFailed(String),
    /// A decoded chunk of inbound text.
    Received(String),
    /// The stream raised an error. Followed by `StreamEnded`.
    ReadFailed(String),
    /// The read loop exited and released its reader claim.
    StreamEnded,
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// ============================================================================
// Connection Manager
// ============================================================================

/// Ask the picker for a device and open it.
pub async fn open_device(picker: &mut dyn DevicePicker, baud_rate: u32) -> Result<DeviceHandle, String> {
    let mut device = picker.request_port().await?;
    tlog!("[connection] Opening {} at {} baud", device.name(), baud_rate);
    device.open(baud_rate).await
}

/// Open a device and, on success, read from it until the stream ends.
pub async fn connect(mut picker: Box<dyn DevicePicker>, baud_rate: u32, events: EventSender) {
    match open_device(picker.as_mut(), baud_rate).await {
        Ok(handle) => {
            tlog!("[connection] Connected to {}", handle.name());
            let _ = events.send(SessionEvent::Connected);
            read_loop(&handle, &events).await;
        }
        Err(e) => {
            tlog!("[connection] Connection failed: {}", e);
            let _ = events.send(SessionEvent::ConnectFailed(e));
        }
    }
}

// ============================================================================
// Read Loop
// ============================================================================

/// Drain decoded text from the device until the stream completes or errors.
///
/// Every non-empty decoded chunk becomes one `Received` event; chunk boundaries
/// are not realigned to line boundaries. The reader claim is released on every
/// exit path, and `StreamEnded` is always the last event.
pub async fn read_loop(handle: &DeviceHandle, events: &EventSender) {
    let mut reader = match handle.get_reader() {
        Ok(reader) => reader,
        Err(e) => {
            let _ = events.send(SessionEvent::ReadFailed(e));
            let _ = events.send(SessionEvent::StreamEnded);
            return;
        }
    };

    let mut decoder = TextDecoder::new();
    let reason = loop {
        match reader.read().await {
            Ok(Some(chunk)) => {
                let text = decoder.decode(&chunk);
                if !text.is_empty() {
                    let _ = events.send(SessionEvent::Received(text));
                }
            }
            Ok(None) => break "complete",
            Err(e) => {
                flush_decoder(&mut decoder, events);
                let _ = events.send(SessionEvent::ReadFailed(e.to_string()));
                break "error";
            }
        }
    };

    flush_decoder(&mut decoder, events);
    reader.release_lock();
    tlog!("[connection] Read loop on {} ended ({})", handle.name(), reason);
    let _ = events.send(SessionEvent::StreamEnded);
}

/// Emit whatever partial sequence the decoder still holds.
fn flush_decoder(decoder: &mut TextDecoder, events: &EventSender) {
    let tail = decoder.finish();
    if !tail.is_empty() {
        let _ = events.send(SessionEvent::Received(tail));
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testing::{ScriptedDevice, ScriptedPicker};
    use super::*;
    use crate::io::ChannelSource;

    fn drain(rx: &mut EventReceiver) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn test_read_loop_emits_chunks_in_order() {
        let (tx, source) = ChannelSource::channel(8);
        let handle = DeviceHandle::new("test", Box::new(source));
        tx.send(Ok(b"A".to_vec())).await.unwrap();
        tx.send(Ok(b"BC".to_vec())).await.unwrap();
        drop(tx);

        let (events, mut rx) = event_channel();
        read_loop(&handle, &events).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Received("A".to_string()),
                SessionEvent::Received("BC".to_string()),
                SessionEvent::StreamEnded,
            ]
        );
        assert!(!handle.is_locked());
    }

    #[tokio::test]
    async fn test_read_loop_error_releases_reader() {
        let (tx, source) = ChannelSource::channel(8);
        let handle = DeviceHandle::new("test", Box::new(source));
        tx.send(Ok(b"hello".to_vec())).await.unwrap();
        tx.send(Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "device lost")))
            .await
            .unwrap();

        let (events, mut rx) = event_channel();
        read_loop(&handle, &events).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Received("hello".to_string()),
                SessionEvent::ReadFailed("device lost".to_string()),
                SessionEvent::StreamEnded,
            ]
        );
        assert!(!handle.is_locked());
        assert!(handle.get_reader().is_ok());
    }

    #[tokio::test]
    async fn test_read_loop_flushes_partial_before_error() {
        let (tx, source) = ChannelSource::channel(8);
        let handle = DeviceHandle::new("test", Box::new(source));
        tx.send(Ok(vec![b'A', 0xE2])).await.unwrap();
        tx.send(Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "lost")))
            .await
            .unwrap();

        let (events, mut rx) = event_channel();
        read_loop(&handle, &events).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Received("A".to_string()),
                SessionEvent::Received("\u{FFFD}".to_string()),
                SessionEvent::ReadFailed("lost".to_string()),
                SessionEvent::StreamEnded,
            ]
        );
        assert!(!handle.is_locked());
    }

    #[tokio::test]
    async fn test_read_loop_refuses_locked_stream() {
        let (_tx, source) = ChannelSource::channel(8);
        let handle = DeviceHandle::new("test", Box::new(source));
        let _held = handle.get_reader().unwrap();

        let (events, mut rx) = event_channel();
        read_loop(&handle, &events).await;

        let got = drain(&mut rx);
        assert_eq!(got.len(), 2);
        assert!(matches!(got[0], SessionEvent::ReadFailed(_)));
        assert_eq!(got[1], SessionEvent::StreamEnded);
    }

    #[tokio::test]
    async fn test_read_loop_joins_split_characters() {
        let (tx, source) = ChannelSource::channel(8);
        let handle = DeviceHandle::new("test", Box::new(source));
        tx.send(Ok(vec![b'x', 0xE2, 0x86])).await.unwrap();
        tx.send(Ok(vec![0x90])).await.unwrap();
        drop(tx);

        let (events, mut rx) = event_channel();
        read_loop(&handle, &events).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Received("x".to_string()),
                SessionEvent::Received("←".to_string()),
                SessionEvent::StreamEnded,
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_open_failure() {
        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: None,
            open_error: Some("timeout".to_string()),
        }));

        let (events, mut rx) = event_channel();
        connect(Box::new(picker), 115_200, events).await;

        assert_eq!(drain(&mut rx), vec![SessionEvent::ConnectFailed("timeout".to_string())]);
    }

    #[tokio::test]
    async fn test_connect_then_stream() {
        let (tx, source) = ChannelSource::channel(8);
        tx.send(Ok(b"ready\r\n".to_vec())).await.unwrap();
        drop(tx);
        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: Some(source),
            open_error: None,
        }));

        let (events, mut rx) = event_channel();
        connect(Box::new(picker), 115_200, events).await;

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionEvent::Connected,
                SessionEvent::Received("ready\r\n".to_string()),
                SessionEvent::StreamEnded,
            ]
        );
    }
}
