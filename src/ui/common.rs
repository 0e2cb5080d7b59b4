//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with the newest sample's values.
///
/// Displays: link indicator, setpoint, outlet temperature, flow, sample
/// count, and window coverage.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(newest) = app.buffer.newest() else {
        let line = Line::from(vec![
            Span::styled(
                " THERMWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Waiting for data..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (link_icon, link_style) = if newest.link_ok {
        ("●", app.theme.link_style(true))
    } else {
        ("●", app.theme.link_style(false))
    };

    let coverage_s = app
        .buffer
        .oldest()
        .map(|oldest| (newest.timestamp_ms - oldest.timestamp_ms) as f64 / 1000.0)
        .unwrap_or(0.0);

    let line = Line::from(vec![
        Span::styled(format!(" {} ", link_icon), link_style),
        Span::styled("THERMWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("set {:.1}°F", newest.setpoint),
            Style::default().fg(app.theme.setpoint),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("out {:.1}°F", newest.outlet_filtered),
            Style::default().fg(app.theme.outlet_filtered),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("flow {:.1} L/min", newest.flow_lpm),
            Style::default().fg(app.theme.flow),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", app.buffer.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" samples / {:.0}s", coverage_s)),
        if app.spans.is_empty() {
            Span::raw("")
        } else {
            Span::styled(
                format!(" │ {} link drop(s)", app.spans.len()),
                app.theme.link_style(false),
            )
        },
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Temperature "), Line::from(" 2:Control ")];

    let selected = match app.current_view {
        View::Temperature => 0,
        View::Control => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, drop counters, pause state, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit", err)
    } else {
        let dropped = app.rejects.suspicious();
        let drops = if dropped > 0 {
            format!(" | {} dropped", dropped)
        } else {
            String::new()
        };
        let paused = if app.paused { " | PAUSED" } else { "" };
        format!(
            " {}{}{} | Tab:switch Space:pause e:export ?:help q:quit",
            app.source_description(),
            drops,
            paused,
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  Tab         Next view"),
        Line::from("  1/2         Jump to view"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space/p   Pause/resume ingest"),
        Line::from("  e         Export view to JSON"),
        Line::from("  q/Esc     Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
