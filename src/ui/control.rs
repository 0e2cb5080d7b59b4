//! Control view rendering.
//!
//! Charts mix ratio and controller output on one panel and flow on another,
//! with link-loss spans overlaid on the ratio panel and listed below. Only
//! the first span carries the "link lost" legend entry; the rest would just
//! repeat it.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::LinkSpan;

/// Render the Control view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Min(8),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .split(area);

    render_ratio_panel(frame, app, chunks[0]);
    render_flow_panel(frame, app, chunks[1]);
    render_span_list(frame, app, chunks[2]);
}

fn render_ratio_panel(frame: &mut Frame, app: &App, area: Rect) {
    let ratio: Vec<(f64, f64)> = series(app, |s| s.ratio);
    let output: Vec<(f64, f64)> = series(app, |s| s.control_output);

    let block = Block::default()
        .title(" Mix Ratio / PI Output ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if ratio.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let (x_min, x_max) = super::time_bounds(app);
    let (y_min, y_max) = super::value_bounds(ratio.iter().chain(&output).map(|p| p.1));

    // Flatten each span into points along the top edge of the panel so the
    // drop reads as a shaded strip
    let overlay: Vec<Vec<(f64, f64)>> = app
        .spans
        .iter()
        .map(|span| span_strip(app, span, y_max))
        .collect();

    let mut datasets = vec![
        Dataset::default()
            .name("ratio")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.ratio))
            .data(&ratio),
        Dataset::default()
            .name("u")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.control_output))
            .data(&output),
    ];
    for (i, strip) in overlay.iter().enumerate() {
        let mut set = Dataset::default()
            .marker(symbols::Marker::Block)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.link_lost))
            .data(strip);
        if i == 0 {
            set = set.name("link lost");
        }
        datasets.push(set);
    }

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([x_min, x_max])
                .labels(super::x_labels(x_min, x_max)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.2}", y_min)),
                    Span::raw(format!("{:.2}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn render_flow_panel(frame: &mut Frame, app: &App, area: Rect) {
    let flow: Vec<(f64, f64)> = series(app, |s| s.flow_lpm);

    let block = Block::default()
        .title(" Flow (L/min) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if flow.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    let (x_min, x_max) = super::time_bounds(app);
    let (y_min, y_max) = super::value_bounds(flow.iter().map(|p| p.1));

    let datasets = vec![Dataset::default()
        .name("flow")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.flow))
        .data(&flow)];

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
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// One-line summary of link-loss spans within the window.
fn render_span_list(frame: &mut Frame, app: &App, area: Rect) {
    if app.spans.is_empty() {
        let line = Line::from(Span::styled(" link: no drops", app.theme.link_style(true)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut text = String::from(" link lost:");
    for span in &app.spans {
        text.push_str(&format!(
            " {:.1}-{:.1}s",
            span.start_ms as f64 / 1000.0,
            span.end_ms as f64 / 1000.0
        ));
    }
    let line = Line::from(Span::styled(text, app.theme.link_style(false)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Points across the top of the panel for the samples a span covers.
fn span_strip(app: &App, span: &LinkSpan, y: f64) -> Vec<(f64, f64)> {
    app.buffer
        .samples()
        .filter(|s| span.start_ms <= s.timestamp_ms && s.timestamp_ms <= span.end_ms)
        .map(|s| (s.timestamp_ms as f64 / 1000.0, y))
        .collect()
}

fn series(app: &App, f: impl Fn(&crate::data::Sample) -> f64) -> Vec<(f64, f64)> {
    app.buffer
        .samples()
        .map(|s| (s.timestamp_ms as f64 / 1000.0, f(s)))
        .collect()
}
