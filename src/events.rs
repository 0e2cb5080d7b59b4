use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::app::{App, View};

/// Poll for terminal events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // View switching
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Temperature),
        KeyCode::Char('2') => app.set_view(View::Control),

        // Pause/resume draining
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            app.toggle_pause();
            let msg = if app.paused { "Paused" } else { "Resumed" };
            app.set_status_message(msg.to_string());
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export current view to JSON
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("thermwatch_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}
