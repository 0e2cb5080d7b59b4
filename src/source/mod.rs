//! Raw record sources for the ingestion loop.
//!
//! This module provides a trait-based abstraction over "where the telemetry
//! lines come from" - a growing CSV file, a TCP stream, or an in-memory
//! channel. The core only ever sees "next raw line or none".

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::TailSource;
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for pulling raw telemetry lines from a backend.
///
/// # Example
///
/// ```
/// use thermwatch::{ChannelSource, TelemetrySource};
///
/// let (tx, mut source) = ChannelSource::create("test rig");
/// tx.send("1500,105.0,103.2,103.5,0.42,0.40,2.0,0.1,6.3,1".to_string()).unwrap();
/// assert!(source.poll().is_some());
/// assert!(source.poll().is_none());
/// ```
pub trait TelemetrySource: Send + Debug {
    /// Pull the next raw line, if one is currently available.
    ///
    /// Must never block waiting for data: the tick cadence depends on this
    /// returning `None` promptly when the backend has nothing buffered.
    fn poll(&mut self) -> Option<String>;

    /// Human-readable description of the source, for the status bar.
    fn description(&self) -> &str;

    /// Sticky source-level fault from the backend, if any.
    ///
    /// Per-line garbage is not a fault; this reports conditions like a
    /// vanished file or a dropped connection. A set fault terminates the
    /// session.
    fn error(&self) -> Option<&str>;

    /// Release the backend. Called once on shutdown; default is a no-op.
    fn close(&mut self) {}
}
