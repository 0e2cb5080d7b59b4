//! Temperature view rendering.
//!
//! Charts the setpoint against raw and filtered outlet temperature over the
//! buffered window.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::App;

/// Render the Temperature view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let setpoint: Vec<(f64, f64)> = series(app, |s| s.setpoint);
    let raw: Vec<(f64, f64)> = series(app, |s| s.outlet_raw);
    let filtered: Vec<(f64, f64)> = series(app, |s| s.outlet_filtered);

    let block = Block::default()
        .title(" Outlet Temperature (°F) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if filtered.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let (x_min, x_max) = super::time_bounds(app);
    let (y_min, y_max) =
        super::value_bounds(setpoint.iter().chain(&raw).chain(&filtered).map(|p| p.1));

    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(app.theme.outlet_raw))
            .data(&raw),
        Dataset::default()
            .name("setpoint")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.setpoint))
            .data(&setpoint),
        Dataset::default()
            .name("filtered")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.outlet_filtered))
            .data(&filtered),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("t (s)")
                .style(Style::default().fg(app.theme.border))
                .bounds([x_min, x_max])
                .labels(super::x_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn series(app: &App, f: impl Fn(&crate::data::Sample) -> f64) -> Vec<(f64, f64)> {
    app.buffer
        .samples()
        .map(|s| (s.timestamp_ms as f64 / 1000.0, f(s)))
        .collect()
}
