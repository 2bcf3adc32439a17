//! Adaptive Binarize
//!
//! A two-input video filter that marks where the first clip is darker than
//! the second by at least a threshold `c`. Output samples are the format's
//! maximum where `clip - clip2 <= -c` and zero elsewhere, computed per
//! plane through a lookup table built once per filter instance.
//!
//! # Architecture
//!
//! ```text
//! plugin registry → AdaptiveBinarize (node) → transform → lut
//!                          ↑
//!          host core (two-phase request/ready scheduling)
//! ```
//!
//! The filter talks to the frame graph only through the
//! [`host::VideoNode`] and [`host::FrameContext`] traits. The [`host`]
//! module supplies an in-process core, in-memory sources and a plugin
//! registry so the filter can be driven without an external host.
//!
//! # Example
//!
//! ```no_run
//! use adaptive_binarize::{
//!     filter,
//!     format::{VideoFormat, VideoInfo},
//!     host::{ArgMap, Core, MemoryClip},
//! };
//!
//! let info = VideoInfo::new(VideoFormat::GRAY8, 640, 480, 10);
//! let plugin = filter::plugin().unwrap();
//!
//! let mut args = ArgMap::new();
//! args.set_node("clip", MemoryClip::noise(info, 0).into_node())
//!     .set_node("clip2", MemoryClip::noise(info, 1).into_node())
//!     .set_int("c", 3);
//!
//! let node = plugin.invoke("AdaptiveBinarize", &args).unwrap();
//! for frame in Core::new().render(&node).unwrap() {
//!     println!("{}", frame.digest());
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod filter;
pub mod format;
pub mod frame;
pub mod host;
pub mod lut;
pub mod metrics;
pub mod transform;

// Re-export commonly used types at crate root
pub use config::{ConfigError, FileConfig};
pub use filter::{AdaptiveBinarize, FilterError};
pub use format::{SampleWidth, VideoFormat, VideoInfo};
pub use frame::{Frame, Plane};
pub use host::{Core, HostError, MemoryClip, Node, Plugin, PluginError};
pub use lut::{Lut, LutSet};
pub use transform::{transform_frame, TransformError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
