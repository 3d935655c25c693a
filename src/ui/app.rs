// src/ui/app.rs
//
// Terminal UI state and key handling. Editor state itself lives in `Editor`;
// this adds focus, the port picker overlay, and console scrolling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::editor::Editor;
use crate::io::serial::{list_serial_ports, SelectedPort, SerialPortInfo};
use crate::params::ParamId;

// ============================================================================
// Types
// ============================================================================

/// Which control receives keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Connect,
    Console,
    Param(ParamId),
}

impl Focus {
    const ORDER: [Focus; 7] = [
        Focus::Connect,
        Focus::Console,
        Focus::Param(ParamId::NoteLow),
        Focus::Param(ParamId::NoteHigh),
        Focus::Param(ParamId::Transpose),
        Focus::Param(ParamId::Glide),
        Focus::Param(ParamId::BendRange),
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Port picker overlay, the terminal stand-in for the host's device chooser.
#[derive(Clone, Debug, Default)]
pub struct PortPicker {
    pub ports: Vec<SerialPortInfo>,
    pub selected: usize,
    /// Enumeration failure, shown in place of the list.
    pub error: Option<String>,
}

impl PortPicker {
    pub fn new(ports: Result<Vec<SerialPortInfo>, String>) -> Self {
        match ports {
            Ok(ports) => Self {
                ports,
                selected: 0,
                error: None,
            },
            Err(e) => Self {
                ports: Vec::new(),
                selected: 0,
                error: Some(e),
            },
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < self.ports.len() {
            self.selected += 1;
        }
    }

    pub fn choice(&self) -> Option<String> {
        self.ports.get(self.selected).map(|p| p.port_name.clone())
    }
}

/// Scroll position of the console, counted in entries up from the newest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsoleView {
    pub offset: usize,
    seen_len: usize,
}

impl ConsoleView {
    /// Jump back to the bottom whenever the log has grown.
    pub fn sync(&mut self, log_len: usize) {
        if log_len != self.seen_len {
            self.seen_len = log_len;
            self.offset = 0;
        }
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = (self.offset + rows).min(self.seen_len.saturating_sub(1));
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn follow(&mut self) {
        self.offset = 0;
    }
}

const COARSE_STEP: i32 = 10;
const PAGE_ROWS: usize = 5;

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub editor: Editor,
    pub focus: Focus,
    pub picker: Option<PortPicker>,
    pub console: ConsoleView,
    pub should_quit: bool,
    /// Port given on the command line; skips the picker.
    preset_port: Option<String>,
    read_timeout: Duration,
}

impl App {
    pub fn new(editor: Editor, preset_port: Option<String>, read_timeout: Duration) -> Self {
        Self {
            editor,
            focus: Focus::Connect,
            picker: None,
            console: ConsoleView::default(),
            should_quit: false,
            preset_port,
            read_timeout,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.picker.is_some() {
            self.handle_picker_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Down if self.focus != Focus::Console => self.focus = self.focus.next(),
            KeyCode::Up if self.focus != Focus::Console => self.focus = self.focus.prev(),
            KeyCode::Enter | KeyCode::Char(' ') if self.focus == Focus::Connect => self.request_connect(),
            KeyCode::Left | KeyCode::Right => {
                if let Focus::Param(id) = self.focus {
                    let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
                        COARSE_STEP
                    } else {
                        1
                    };
                    let delta = if key.code == KeyCode::Left { -step } else { step };
                    self.editor.params.nudge(id, delta);
                }
            }
            KeyCode::Up => self.console.scroll_up(1),
            KeyCode::Down => self.console.scroll_down(1),
            KeyCode::PageUp => self.console.scroll_up(PAGE_ROWS),
            KeyCode::PageDown => self.console.scroll_down(PAGE_ROWS),
            KeyCode::End => self.console.follow(),
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Up => picker.up(),
            KeyCode::Down => picker.down(),
            KeyCode::Enter => {
                let choice = picker.choice();
                self.picker = None;
                self.start_connect(choice);
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.picker = None;
                self.start_connect(None);
            }
            _ => {}
        }
    }

    /// The Connect control was activated.
    pub fn request_connect(&mut self) {
        if !self.editor.can_connect() {
            return;
        }
        match self.preset_port.clone() {
            Some(port) => self.start_connect(Some(port)),
            None => self.picker = Some(PortPicker::new(list_serial_ports())),
        }
    }

    fn start_connect(&mut self, choice: Option<String>) {
        let picker = SelectedPort::new(choice, self.read_timeout);
        let _ = self.editor.connect(Box::new(picker));
    }
}
