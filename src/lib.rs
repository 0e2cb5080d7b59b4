// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # thermwatch
//!
//! A live TUI and replay tool for the thermal mix-valve controller's CSV
//! telemetry stream.
//!
//! The control firmware logs one CSV row per control cycle (timestamp,
//! setpoint, outlet temperatures, mix ratio, PI output, flow, link flag).
//! This crate ingests that stream from a file tail, a TCP connection, or an
//! in-process channel, keeps a time-bounded window of recent samples, and
//! renders temperature and control charts with link-loss intervals
//! highlighted. The same buffer and span logic replays archived captures.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Application                           │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (ticks) │    │(buffer +  │   │(charts) │    │         │  │
//! │  └────┬────┘    │  spans)  │    └─────────┘    └─────────┘  │
//! │       │         └──────────┘                                 │
//! │       ▼               ▲                                      │
//! │  ┌─────────┐          │                                      │
//! │  │ source  │◀── TailSource | StreamSource | ChannelSource   │
//! │  │ (input) │          │                                      │
//! │  └─────────┘     ┌────┴────┐                                 │
//! │                  │ replay  │◀── archived capture files       │
//! │                  └─────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: the tick-driven ingestion loop, rejection counters, and
//!   view state
//! - **[`data`]**: record parsing, the time-windowed buffer, and link-loss
//!   span extraction
//! - **[`source`]**: raw line sources behind the [`TelemetrySource`] trait
//! - **[`sink`]**: optional write-through mirror of the raw stream to disk
//! - **[`replay`]**: one-shot processing of a finite capture through the
//!   same buffer/span path
//! - **[`ui`]**: ratatui chart rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Tail a capture another process is writing
//! thermwatch --file bench_run.csv
//!
//! # Live over TCP (e.g. a serial-to-TCP bridge on the bench)
//! thermwatch --connect rig:9090 --window 120 --outfile capture.csv
//!
//! # Replay an archived capture and export the spans
//! thermwatch --replay capture.csv --export summary.json
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use thermwatch::{App, ChannelSource};
//!
//! let (tx, source) = ChannelSource::create("simulator");
//! let mut app = App::new(Box::new(source), None, 120_000, 512).unwrap();
//!
//! tx.send("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1".to_string()).unwrap();
//! let outcome = app.drain_tick().unwrap();
//! assert_eq!(outcome.accepted, 1);
//! ```
//!
//! ### Replaying a capture
//!
//! ```no_run
//! use thermwatch::replay::replay_file;
//!
//! let summary = replay_file("capture.csv", None)?;
//! println!("{} samples, {} link drops", summary.snapshot.len(), summary.spans.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod replay;
pub mod sink;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, LoopState, RejectionCounters, TickOutcome, View};
pub use data::{
    link_loss_spans, parse_record, LinkSpan, OutOfOrderSample, RecordRejection, Sample,
    WindowedBuffer, HEADER,
};
pub use replay::{replay_file, replay_lines, ReplaySummary};
pub use sink::{FileSink, RecordSink};
pub use source::{ChannelSource, StreamSource, TailSource, TelemetrySource};
