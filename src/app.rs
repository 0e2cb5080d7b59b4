//! Application state and the tick-driven ingestion loop.

use anyhow::{anyhow, Result};

use crate::data::{link_loss_spans, parse_record, LinkSpan, RecordRejection, WindowedBuffer};
use crate::sink::RecordSink;
use crate::source::TelemetrySource;
use crate::ui::Theme;

/// The current chart view in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Setpoint vs raw/filtered outlet temperature.
    Temperature,
    /// Mix ratio, controller output, and flow, with link-loss overlay.
    Control,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Temperature => View::Control,
            View::Control => View::Temperature,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views, so prev == next
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Temperature => "Temperature",
            View::Control => "Control",
        }
    }
}

/// Scheduler state for the ingestion loop.
///
/// The loop sits in `Idle` between ticks and enters `Draining` while it
/// consumes whatever the source has buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Draining,
}

/// Running totals of dropped records, by reason.
///
/// Rejections are diagnostics, not failures: a bad line never interrupts an
/// otherwise healthy stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionCounters {
    pub empty: u64,
    pub header: u64,
    pub not_data: u64,
    pub too_few_fields: u64,
    pub field_parse: u64,
    pub out_of_order: u64,
}

impl RejectionCounters {
    /// Count one parser rejection.
    pub fn record(&mut self, rejection: RecordRejection) {
        match rejection {
            RecordRejection::EmptyLine => self.empty += 1,
            RecordRejection::HeaderLine => self.header += 1,
            RecordRejection::NotDataLine => self.not_data += 1,
            RecordRejection::TooFewFields => self.too_few_fields += 1,
            RecordRejection::FieldParse { .. } => self.field_parse += 1,
        }
    }

    /// Total dropped records across all reasons.
    pub fn total(&self) -> u64 {
        self.empty
            + self.header
            + self.not_data
            + self.too_few_fields
            + self.field_parse
            + self.out_of_order
    }

    /// Dropped records excluding expected protocol noise (header rows and
    /// blank lines), for the status bar.
    pub fn suspicious(&self) -> u64 {
        self.not_data + self.too_few_fields + self.field_parse + self.out_of_order
    }
}

/// What one tick of the ingestion loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Samples accepted into the buffer this tick.
    pub accepted: usize,
    /// Records dropped this tick (parse rejections + out-of-order).
    pub rejected: usize,
    /// Whether the derived view (snapshot + spans) was recomputed.
    pub refreshed: bool,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub paused: bool,
    pub show_help: bool,
    pub current_view: View,

    source: Box<dyn TelemetrySource>,
    sink: Option<Box<dyn RecordSink>>,
    closed: bool,

    /// Recent samples, bounded by the configured time window.
    pub buffer: WindowedBuffer,
    /// Link-loss spans over the current buffer contents.
    pub spans: Vec<LinkSpan>,
    pub rejects: RejectionCounters,
    pub load_error: Option<String>,

    state: LoopState,
    max_records_per_tick: usize,
    pub last_tick: Option<TickOutcome>,

    // UI
    pub theme: Theme,
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App over the given source.
    ///
    /// `window_ms` must be positive; `max_records_per_tick` bounds how much
    /// of a burst one tick will drain so a flood cannot starve the redraw.
    pub fn new(
        source: Box<dyn TelemetrySource>,
        sink: Option<Box<dyn RecordSink>>,
        window_ms: u64,
        max_records_per_tick: usize,
    ) -> Result<Self> {
        Ok(Self {
            running: true,
            paused: false,
            show_help: false,
            current_view: View::Temperature,
            source,
            sink,
            closed: false,
            buffer: WindowedBuffer::new(window_ms)?,
            spans: Vec::new(),
            rejects: RejectionCounters::default(),
            load_error: None,
            state: LoopState::Idle,
            max_records_per_tick: max_records_per_tick.max(1),
            last_tick: None,
            theme: Theme::auto_detect(),
            status_message: None,
        })
    }

    /// Returns a description of the data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Current scheduler state.
    pub fn loop_state(&self) -> LoopState {
        self.state
    }

    /// Run one tick: drain the source, feed the buffer, refresh the view.
    ///
    /// Returns `Err` only for source-level faults, which end the session.
    /// Per-record problems are counted in [`RejectionCounters`] and dropped.
    pub fn drain_tick(&mut self) -> Result<TickOutcome> {
        self.state = LoopState::Draining;
        let mut accepted = 0;
        let mut rejected = 0;

        while accepted + rejected < self.max_records_per_tick {
            let Some(line) = self.source.poll() else {
                break;
            };

            match parse_record(&line) {
                Ok(sample) => match self.buffer.append(sample) {
                    Ok(()) => {
                        accepted += 1;
                        // Mirror accepted rows only, so the capture replays clean
                        if let Some(sink) = self.sink.as_mut() {
                            if let Err(e) = sink.write_line(&line) {
                                tracing::warn!("capture write failed: {}", e);
                            }
                        }
                    }
                    Err(_) => {
                        self.rejects.out_of_order += 1;
                        rejected += 1;
                    }
                },
                Err(rejection) => {
                    self.rejects.record(rejection);
                    rejected += 1;
                }
            }
        }

        // One trim per batch: the invariant only needs restoring after the
        // newest timestamp may have advanced.
        self.buffer.trim();

        let refreshed = accepted > 0;
        if refreshed {
            self.spans = link_loss_spans(self.buffer.link_states());
        }

        self.state = LoopState::Idle;
        let outcome = TickOutcome {
            accepted,
            rejected,
            refreshed,
        };
        self.last_tick = Some(outcome);

        if let Some(err) = self.source.error() {
            let msg = err.to_string();
            self.load_error = Some(msg.clone());
            return Err(anyhow!("source fault: {}", msg));
        }

        Ok(outcome)
    }

    /// Release the source and sink. Idempotent; called on every exit path.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.source.close();
        if let Some(sink) = self.sink.as_mut() {
            sink.close();
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Pause/resume draining. A paused app still redraws; it just stops
    /// pulling from the source, letting the backend buffer.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Set a temporary status message shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Export the current `{snapshot, spans}` view to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        use std::io::Write;

        let export = serde_json::json!({
            "snapshot": self.buffer.snapshot(),
            "spans": self.spans,
            "rejected": self.rejects.total(),
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::replay_lines;
    use crate::source::ChannelSource;

    fn line(ts: u64, link_ok: u8) -> String {
        format!("{},105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,{}", ts, link_ok)
    }

    fn app_over_channel(window_ms: u64) -> (std::sync::mpsc::Sender<String>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), None, window_ms, 512).unwrap();
        (tx, app)
    }

    #[test]
    fn test_tick_accepts_and_refreshes() {
        let (tx, mut app) = app_over_channel(10_000);
        tx.send(line(0, 1)).unwrap();
        tx.send(line(100, 0)).unwrap();
        tx.send(line(200, 1)).unwrap();

        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 3);
        assert_eq!(outcome.rejected, 0);
        assert!(outcome.refreshed);
        assert_eq!(app.buffer.len(), 3);
        assert_eq!(app.spans.len(), 1);
        assert_eq!(app.spans[0].start_ms, 100);
        assert_eq!(app.spans[0].end_ms, 100);
    }

    #[test]
    fn test_empty_tick_skips_refresh() {
        let (_tx, mut app) = app_over_channel(10_000);
        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 0);
        assert!(!outcome.refreshed);
        assert_eq!(app.loop_state(), LoopState::Idle);
    }

    #[test]
    fn test_garbage_line_counted_not_fatal() {
        let (tx, mut app) = app_over_channel(10_000);
        tx.send("abc,1,2".to_string()).unwrap();
        tx.send(line(0, 1)).unwrap();

        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(app.rejects.not_data, 1);
        assert_eq!(app.buffer.len(), 1);
    }

    #[test]
    fn test_out_of_order_counted_like_parse_reject() {
        let (tx, mut app) = app_over_channel(10_000);
        tx.send(line(200, 1)).unwrap();
        tx.send(line(100, 1)).unwrap();

        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(app.rejects.out_of_order, 1);
        assert_eq!(app.buffer.len(), 1);
        assert_eq!(app.buffer.newest().unwrap().timestamp_ms, 200);
    }

    #[test]
    fn test_burst_bounded_by_max_per_tick() {
        let (tx, source) = ChannelSource::create("test");
        let mut app = App::new(Box::new(source), None, 1_000_000, 4).unwrap();
        for ts in 0..10u64 {
            tx.send(line(ts * 100, 1)).unwrap();
        }

        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 4);

        // The rest drains on later ticks, still in order
        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 4);
        let outcome = app.drain_tick().unwrap();
        assert_eq!(outcome.accepted, 2);
        assert_eq!(app.buffer.len(), 10);
    }

    #[test]
    fn test_trim_applied_after_batch() {
        let (tx, mut app) = app_over_channel(1_000);
        for ts in [0u64, 500, 1000, 1600] {
            tx.send(line(ts, 1)).unwrap();
        }
        app.drain_tick().unwrap();

        let newest = app.buffer.newest().unwrap().timestamp_ms;
        let oldest = app.buffer.oldest().unwrap().timestamp_ms;
        assert!(newest - oldest <= 1_000);
        assert_eq!(newest, 1600);
    }

    #[test]
    fn test_source_fault_is_fatal() {
        let (tx, mut app) = app_over_channel(10_000);
        tx.send(line(0, 1)).unwrap();
        drop(tx);

        // Queued line drains first, then the disconnect surfaces
        assert!(app.drain_tick().is_err());
        assert!(app.load_error.is_some());
        assert_eq!(app.buffer.len(), 1);
    }

    #[test]
    fn test_sink_mirrors_accepted_rows_only() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.csv");

        let (tx, source) = ChannelSource::create("test");
        let sink = Box::new(crate::sink::FileSink::create(&capture).unwrap());
        let mut app = App::new(Box::new(source), Some(sink), 10_000, 512).unwrap();
        tx.send("boot banner".to_string()).unwrap();
        tx.send(line(0, 1)).unwrap();
        tx.send(line(100, 1)).unwrap();
        app.drain_tick().unwrap();
        app.shutdown();

        let contents = std::fs::read_to_string(&capture).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], crate::data::HEADER);
        assert_eq!(lines.len(), 3);
        assert!(!contents.contains("boot banner"));
    }

    #[test]
    fn test_live_matches_replay_over_same_lines() {
        let lines: Vec<String> = vec![
            line(0, 1),
            line(100, 0),
            "bogus banner text".to_string(),
            line(200, 0),
            line(300, 1),
            line(400, 0),
        ];

        // Live path: one line per tick
        let (tx, mut app) = app_over_channel(1_000_000);
        for l in &lines {
            tx.send(l.clone()).unwrap();
            app.drain_tick().unwrap();
        }

        // Replay path: everything at once
        let summary = replay_lines(lines.iter(), Some(1_000_000)).unwrap();

        assert_eq!(app.buffer.snapshot(), summary.snapshot);
        assert_eq!(app.spans, summary.spans);
        assert_eq!(app.rejects.total() as usize, summary.rejected);
    }
}
