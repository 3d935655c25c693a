// src/ui/render.rs
//
// Drawing for the editor screen: title, about card, connect control, console,
// note output sliders, the other output panels, help line and the port picker
// overlay.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{App, Focus, PortPicker};
use crate::params::{ParamId, Parameters};

const TITLE: &str = "Thonk Synth t10 Midi-CV Editor";
const ABOUT: &str = "Welcome to the Thonk Synth t10 Midi-CV Settings Editor. This tool is still under development.";
const FOOTER: &str = "thonk.co.uk";
/// Outputs the module has but the editor cannot configure yet.
const OTHER_OUTPUTS: [&str; 5] = ["Gate Output", "Vel Output", "CC Output", "Clock Output", "Reset Output"];

pub fn draw(frame: &mut Frame, app: &App) {
    let rows = Layout::vertical([
        Constraint::Length(1), // title
        Constraint::Length(4), // about
        Constraint::Length(3), // connect
        Constraint::Min(6),    // console
        Constraint::Length(12), // note output
        Constraint::Length(3), // other outputs
        Constraint::Length(2), // help
        Constraint::Length(1), // footer
    ])
    .split(frame.area());

    frame.render_widget(
        Paragraph::new(TITLE).style(Style::default().bold()).alignment(Alignment::Center),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(ABOUT),
            Line::from("To get started, press Enter on the Connect button below."),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("About")),
        rows[1],
    );

    draw_connect(frame, app, rows[2]);
    draw_console(frame, app, rows[3]);
    draw_params(frame, app, rows[4]);
    draw_other_outputs(frame, rows[5]);
    draw_help(frame, app, rows[6]);

    frame.render_widget(
        Paragraph::new(FOOTER)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        rows[7],
    );

    if let Some(picker) = &app.picker {
        draw_picker(frame, picker);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default()
    }
}

fn draw_connect(frame: &mut Frame, app: &App, area: Rect) {
    let (caption, style) = if app.editor.state().is_connected() {
        ("Connected", Style::default().fg(Color::DarkGray))
    } else if app.editor.is_connecting() {
        ("Connecting...", Style::default().fg(Color::DarkGray))
    } else {
        ("Connect", focus_style(app.focus == Focus::Connect))
    };

    frame.render_widget(
        Paragraph::new(caption)
            .style(style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style)),
        area,
    );
}

/// Console entries are rendered one per row.
/// Carriage returns are dropped and embedded newlines folded into spaces.
pub fn display_text(line: &str) -> String {
    line.replace('\r', "").replace('\n', " ")
}

/// Index range of log entries visible in `height` rows, `offset` entries up from the bottom.
pub fn visible_window(total: usize, height: usize, offset: usize) -> std::ops::Range<usize> {
    let end = total.saturating_sub(offset);
    let start = end.saturating_sub(height);
    start..end
}

fn draw_console(frame: &mut Frame, app: &App, area: Rect) {
    let lines = app.editor.log().lines();
    let height = area.height.saturating_sub(2) as usize;
    let window = visible_window(lines.len(), height, app.console.offset);

    let text: Vec<Line> = lines[window]
        .iter()
        .map(|line| Line::from(display_text(line)))
        .collect();

    let title = if app.console.offset > 0 {
        format!("Console (scrolled {} up, End to follow)", app.console.offset)
    } else {
        "Console".to_string()
    };

    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(focus_style(app.focus == Focus::Console)),
        ),
        area,
    );
}

/// Single-thumb slider, e.g. `━━━━●─────`.
pub fn slider_bar(width: usize, ratio: f64) -> String {
    if width == 0 {
        return String::new();
    }
    let thumb = thumb_position(width, ratio);
    (0..width)
        .map(|i| match i.cmp(&thumb) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

/// Two-thumb slider, e.g. `──●━━━━●──`.
pub fn range_bar(width: usize, low_ratio: f64, high_ratio: f64) -> String {
    if width == 0 {
        return String::new();
    }
    let low = thumb_position(width, low_ratio);
    let high = thumb_position(width, high_ratio).max(low);
    (0..width)
        .map(|i| {
            if i == low || i == high {
                '●'
            } else if i > low && i < high {
                '━'
            } else {
                '─'
            }
        })
        .collect()
}

fn thumb_position(width: usize, ratio: f64) -> usize {
    let ratio = ratio.clamp(0.0, 1.0);
    ((width - 1) as f64 * ratio).round() as usize
}

fn draw_params(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Note Output");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let params: &Parameters = &app.editor.params;
    let width = inner.width.saturating_sub(2) as usize;
    let focused = match app.focus {
        Focus::Param(id) => Some(id),
        _ => None,
    };

    let mut lines: Vec<Line> = Vec::new();

    // Note range: one caption, one two-thumb bar
    let range_focused = matches!(focused, Some(ParamId::NoteLow | ParamId::NoteHigh));
    let thumb_hint = match focused {
        Some(ParamId::NoteLow) => "  [low]",
        Some(ParamId::NoteHigh) => "  [high]",
        _ => "",
    };
    lines.push(Line::styled(
        format!("{}{}", params.label(ParamId::NoteLow), thumb_hint),
        focus_style(range_focused),
    ));
    lines.push(Line::from(format!(
        " {}",
        range_bar(
            width,
            params.ratio(ParamId::NoteLow),
            params.ratio(ParamId::NoteHigh)
        )
    )));

    for id in [ParamId::Transpose, ParamId::Glide, ParamId::BendRange] {
        lines.push(Line::styled(params.label(id), focus_style(focused == Some(id))));
        lines.push(Line::from(format!(" {}", slider_bar(width, params.ratio(id)))));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_other_outputs(frame: &mut Frame, area: Rect) {
    let cells = Layout::horizontal([Constraint::Ratio(1, OTHER_OUTPUTS.len() as u32); OTHER_OUTPUTS.len()])
        .split(area);
    for (title, cell) in OTHER_OUTPUTS.iter().zip(cells.iter()) {
        frame.render_widget(
            Paragraph::new("Not editable yet")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(*title)),
            *cell,
        );
    }
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.focus {
        Focus::Param(id) => id.help().to_string(),
        Focus::Console => "Up/Down/PgUp/PgDn scroll, End follows new output.".to_string(),
        Focus::Connect => "Enter connects. Tab moves between controls, q quits.".to_string(),
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Cyan))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_picker(frame: &mut Frame, picker: &PortPicker) {
    let area = centered(frame.area(), 64, 12);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Select a serial port (Enter to connect, Esc to cancel)");

    if let Some(error) = &picker.error {
        frame.render_widget(
            Paragraph::new(error.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    if picker.ports.is_empty() {
        frame.render_widget(Paragraph::new("No serial ports found.").block(block), area);
        return;
    }

    let items: Vec<ListItem> = picker.ports.iter().map(|p| ListItem::new(p.label())).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(picker.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::event_channel;
    use crate::editor::Editor;
    use crate::ui::app::App;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    #[test]
    fn test_slider_bar() {
        assert_eq!(slider_bar(5, 0.0), "●────");
        assert_eq!(slider_bar(5, 0.5), "━━●──");
        assert_eq!(slider_bar(5, 1.0), "━━━━●");
        assert_eq!(slider_bar(0, 0.5), "");
    }

    #[test]
    fn test_range_bar() {
        assert_eq!(range_bar(6, 0.0, 1.0), "●━━━━●");
        assert_eq!(range_bar(6, 0.2, 0.6), "─●━●──");
    }

    #[test]
    fn test_visible_window_follows_bottom() {
        assert_eq!(visible_window(10, 4, 0), 6..10);
        assert_eq!(visible_window(10, 4, 3), 3..7);
        assert_eq!(visible_window(2, 4, 0), 0..2);
        assert_eq!(visible_window(10, 4, 50), 0..0);
    }

    #[test]
    fn test_display_text_folds_newlines() {
        assert_eq!(display_text("← a\r\nb\r\n"), "← a b ");
    }

    #[test]
    fn test_draw_shows_labels_and_log() {
        let (events, _rx) = event_channel();
        let mut editor = Editor::new(115_200, events);
        editor.apply(crate::connection::SessionEvent::ConnectFailed("timeout".to_string()));
        let app = App::new(editor, None, Duration::from_millis(10));

        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains(TITLE));
        assert!(text.contains("Connection failed: timeout"));
        assert!(text.contains("Note Range: 0 to 127"));
        assert!(text.contains("Pitch Bend Range: +/- 2"));
        for title in OTHER_OUTPUTS {
            assert!(text.contains(title), "missing {}", title);
        }
    }
}
