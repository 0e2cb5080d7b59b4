//! Data models and processing for control telemetry.
//!
//! ## Submodules
//!
//! - [`sample`]: the [`Sample`] record and the CSV line parser
//! - [`window`]: the time-bounded [`WindowedBuffer`]
//! - [`spans`]: link-loss span extraction over buffer contents
//!
//! ## Data Flow
//!
//! ```text
//! raw line
//!    │
//!    ▼
//! parse_record()
//!    │
//!    ├──▶ Sample ──▶ WindowedBuffer (append + trim)
//!    │                     │
//!    │                     └──▶ link_loss_spans() (for the renderer)
//!    │
//!    └──▶ RecordRejection (counted, dropped)
//! ```

pub mod sample;
pub mod spans;
pub mod window;

pub use sample::{parse_record, RecordRejection, Sample, HEADER, MIN_FIELDS};
pub use spans::{link_loss_spans, LinkSpan};
pub use window::{OutOfOrderSample, WindowedBuffer};
