//! Terminal rendering.
//!
//! The renderer consumes what the core hands it - the buffered sample
//! snapshot and the link-loss spans - and draws charts with ratatui. It
//! makes no ingestion decisions of its own.

pub mod common;
pub mod control;
pub mod temperature;
pub mod theme;

pub use theme::Theme;

use ratatui::text::Span;

use crate::app::App;

/// Sliding x-axis bounds in seconds, pinned to the buffer's window.
///
/// Mirrors the window on the time axis so the newest sample sits at the
/// right edge even while the buffer is still filling.
pub(crate) fn time_bounds(app: &App) -> (f64, f64) {
    let newest = app.buffer.newest().map(|s| s.timestamp_ms).unwrap_or(0);
    let window = app.buffer.window_ms().min(newest.max(1));
    let x_max = newest as f64 / 1000.0;
    let x_min = (newest.saturating_sub(window)) as f64 / 1000.0;
    (x_min, x_max.max(x_min + 0.001))
}

/// Min/max over a value series, padded so flat lines stay visible.
pub(crate) fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.1);
    (min - pad, max + pad)
}

/// Three x-axis labels: left edge, midpoint, right edge.
pub(crate) fn x_labels(x_min: f64, x_max: f64) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!("{:.0}", x_min)),
        Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
        Span::raw(format!("{:.0}", x_max)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_bounds_pads_flat_series() {
        let (min, max) = value_bounds([5.0, 5.0, 5.0].into_iter());
        assert!(min < 5.0);
        assert!(max > 5.0);
    }

    #[test]
    fn test_value_bounds_empty_defaults() {
        let (min, max) = value_bounds(std::iter::empty());
        assert_eq!((min, max), (0.0, 1.0));
    }
}
