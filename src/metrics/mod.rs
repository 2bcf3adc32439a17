//! Prometheus metrics for a render.
//!
//! # Metrics Exposed
//!
//! - `abrz_frames_requested_total` - Frame requests seen by the core, dependencies included
//! - `abrz_frames_produced_total` - Frames successfully produced
//! - `abrz_frame_failures_total` - Frame requests that ended in an error
//! - `abrz_threshold_c` - Threshold the filter was built with
//! - `abrz_sample_bytes` - Bytes per sample of the filtered clip
//!
//! # Example
//!
//! ```no_run
//! use adaptive_binarize::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot {
//!     frames_requested: 30,
//!     frames_produced: 30,
//!     frame_failures: 0,
//!     threshold_c: 3,
//!     sample_bytes: 1,
//! });
//!
//! println!("{}", registry.encode().expect("Failed to encode"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
