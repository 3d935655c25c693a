// src/ui/mod.rs
//
// Terminal front end. Owns the screen while running and multiplexes terminal
// input, connection events and the redraw tick on one task.

pub mod app;
pub mod render;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use std::time::Duration;

use crate::connection::EventReceiver;
use crate::logging;
pub use app::App;

/// Run the editor UI until the user quits.
pub async fn run(mut app: App, mut events: EventReceiver, refresh: Duration) -> Result<(), String> {
    // try_init installs a panic hook that puts the terminal back before reporting
    let mut terminal = restore_on_error(ratatui::try_init(), || {
        let _ = ratatui::try_restore();
    })
    .map_err(|e| format!("Failed to set up terminal: {}", e))?;
    logging::set_stderr_echo(false);

    let result = event_loop(&mut terminal, &mut app, &mut events, refresh).await;

    // Always hand the terminal back, even after an error
    let _ = ratatui::try_restore();
    logging::set_stderr_echo(true);

    result
}

/// Run `restore` when terminal setup failed part way through.
fn restore_on_error<T, E>(result: Result<T, E>, restore: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        restore();
    }
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    events: &mut EventReceiver,
    refresh: Duration,
) -> Result<(), String> {
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(refresh);

    loop {
        app.console.sync(app.editor.log().len());
        terminal
            .draw(|f| render::draw(f, app))
            .map_err(|e| format!("Failed to draw: {}", e))?;

        if app.should_quit {
            tlog!("[ui] Quit requested");
            return Ok(());
        }

        tokio::select! {
            Some(event) = events.recv() => {
                app.editor.apply(event);
                // Fold in whatever else is already queued before redrawing
                while let Ok(event) = events.try_recv() {
                    app.editor.apply(event);
                }
            }
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(format!("Terminal event error: {}", e)),
                    None => return Ok(()),
                }
            }
            _ = tick_interval.tick() => {}
        }
    }
}
