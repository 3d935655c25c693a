// src/editor.rs
//
// The single owner of editor state. Background connection tasks report through
// `SessionEvent`s; the UI reads state from here and forwards user actions.

use tokio::task::JoinHandle;

use crate::connection::{self, EventSender, SessionEvent};
use crate::console::{
    connection_failed_line, inbound_line, read_error_line, ConnectionState, LineLog, CONNECTED_LINE,
};
use crate::io::DevicePicker;
use crate::params::Parameters;

pub struct Editor {
    state: ConnectionState,
    /// A connect task is between the picker and the open result.
    connecting: bool,
    log: LineLog,
    pub params: Parameters,
    baud_rate: u32,
    events: EventSender,
}

impl Editor {
    pub fn new(baud_rate: u32, events: EventSender) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            connecting: false,
            log: LineLog::new(),
            params: Parameters::default(),
            baud_rate,
            events,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn log(&self) -> &LineLog {
        &self.log
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    /// Whether the Connect control is enabled.
    pub fn can_connect(&self) -> bool {
        !self.state.is_connected() && !self.connecting
    }

    /// Start a connect attempt on a background task.
    ///
    /// Returns `None` without doing anything while connected or while another
    /// attempt is still in flight.
    pub fn connect(&mut self, picker: Box<dyn DevicePicker>) -> Option<JoinHandle<()>> {
        if !self.can_connect() {
            tlog!(
                "[editor] Ignoring connect request (state: {:?}, connecting: {})",
                self.state,
                self.connecting
            );
            return None;
        }

        self.connecting = true;
        let events = self.events.clone();
        let baud_rate = self.baud_rate;
        Some(tokio::spawn(connection::connect(picker, baud_rate, events)))
    }

    /// Fold one background event into the editor state.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                self.connecting = false;
                self.state = ConnectionState::Connected;
                self.log.push(CONNECTED_LINE);
            }
            SessionEvent::ConnectFailed(reason) => {
                self.connecting = false;
                self.log.push(connection_failed_line(&reason));
            }
            SessionEvent::Received(text) => {
                self.log.push(inbound_line(&text));
            }
            SessionEvent::ReadFailed(reason) => {
                self.log.push(read_error_line(&reason));
            }
            SessionEvent::StreamEnded => {
                self.state = ConnectionState::Disconnected;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::{ScriptedDevice, ScriptedPicker};
    use crate::connection::{event_channel, EventReceiver};
    use crate::console::INBOUND_MARKER;
    use crate::io::ChannelSource;

    fn apply_all(editor: &mut Editor, rx: &mut EventReceiver) {
        while let Ok(event) = rx.try_recv() {
            editor.apply(event);
        }
    }

    #[tokio::test]
    async fn test_successful_connect() {
        let (events, mut rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        // Keep the sender alive so the stream stays open
        let (_device_tx, source) = ChannelSource::channel(8);
        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: Some(source),
            open_error: None,
        }));

        assert!(editor.can_connect());
        editor.connect(Box::new(picker)).unwrap();
        assert!(!editor.can_connect());

        let event = rx.recv().await.unwrap();
        editor.apply(event);

        assert_eq!(editor.log().lines(), &["Connected".to_string()]);
        assert!(editor.state().is_connected());
        assert!(!editor.can_connect());
    }

    #[tokio::test]
    async fn test_failed_connect() {
        let (events, mut rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: None,
            open_error: Some("timeout".to_string()),
        }));
        editor.connect(Box::new(picker)).unwrap().await.unwrap();
        apply_all(&mut editor, &mut rx);

        assert_eq!(editor.log().len(), 1);
        let line = &editor.log().lines()[0];
        assert!(line.contains("Connection failed"));
        assert!(line.contains("timeout"));
        assert!(!editor.state().is_connected());
        assert!(editor.can_connect());
    }

    #[tokio::test]
    async fn test_cancelled_picker() {
        let (events, mut rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        editor.connect(Box::new(ScriptedPicker(None))).unwrap().await.unwrap();
        apply_all(&mut editor, &mut rx);

        assert_eq!(
            editor.log().last(),
            Some("Connection failed: NotFoundError: No port selected by the user.")
        );
        assert!(editor.can_connect());
    }

    #[tokio::test]
    async fn test_second_connect_refused_while_in_flight() {
        let (events, _rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        let (_device_tx, source) = ChannelSource::channel(8);
        let first = ScriptedPicker(Some(ScriptedDevice {
            source: Some(source),
            open_error: None,
        }));
        assert!(editor.connect(Box::new(first)).is_some());
        assert!(editor.is_connecting());
        assert!(editor.connect(Box::new(ScriptedPicker(None))).is_none());
    }

    #[tokio::test]
    async fn test_stream_lines_then_completion() {
        let (events, mut rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        let (device_tx, source) = ChannelSource::channel(8);
        device_tx.send(Ok(b"A".to_vec())).await.unwrap();
        device_tx.send(Ok(b"BC".to_vec())).await.unwrap();
        drop(device_tx);
        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: Some(source),
            open_error: None,
        }));

        editor.connect(Box::new(picker)).unwrap().await.unwrap();
        apply_all(&mut editor, &mut rx);

        let expected: Vec<String> = vec![
            "Connected".to_string(),
            format!("{}A", INBOUND_MARKER),
            format!("{}BC", INBOUND_MARKER),
        ];
        assert_eq!(editor.log().lines(), &expected[..]);
        // Stream end re-enables the Connect control
        assert!(!editor.state().is_connected());
        assert!(editor.can_connect());
    }

    #[tokio::test]
    async fn test_stream_error_after_chunk() {
        let (events, mut rx) = event_channel();
        let mut editor = Editor::new(115_200, events);

        let (device_tx, source) = ChannelSource::channel(8);
        device_tx.send(Ok(b"CV 1.00V".to_vec())).await.unwrap();
        device_tx
            .send(Err(std::io::Error::new(std::io::ErrorKind::Other, "framing error")))
            .await
            .unwrap();
        let picker = ScriptedPicker(Some(ScriptedDevice {
            source: Some(source),
            open_error: None,
        }));

        editor.connect(Box::new(picker)).unwrap().await.unwrap();
        apply_all(&mut editor, &mut rx);

        assert_eq!(
            editor.log().lines(),
            &[
                "Connected".to_string(),
                "← CV 1.00V".to_string(),
                "Read error: framing error".to_string(),
            ]
        );
    }

    #[test]
    fn test_log_never_shrinks() {
        let (events, _rx) = event_channel();
        let mut editor = Editor::new(115_200, events);
        let script = vec![
            SessionEvent::ConnectFailed("busy".to_string()),
            SessionEvent::Connected,
            SessionEvent::Received("x".to_string()),
            SessionEvent::StreamEnded,
            SessionEvent::ReadFailed("gone".to_string()),
            SessionEvent::StreamEnded,
        ];

        let mut seen: Vec<String> = Vec::new();
        for event in script {
            editor.apply(event);
            let lines = editor.log().lines();
            assert!(lines.len() >= seen.len());
            assert_eq!(&lines[..seen.len()], &seen[..]);
            seen = lines.to_vec();
        }
    }
}
