//! Frames, planes and strided 2D views over plane memory.
//!
//! A frame owns one buffer per plane. Rows are `stride` samples apart and
//! the stride may exceed the logical width, so every pixel access goes
//! through [`PlaneView`] / [`PlaneViewMut`], which check the geometry once
//! and hand out exactly `width` samples per row.

#[allow(clippy::module_inception)]
mod frame;
mod plane;
mod sample;

pub use frame::{Frame, FrameError, FRAME_ALIGNMENT};
pub use plane::{Plane, PlaneView, PlaneViewMut, ViewError};
pub use sample::{PlaneBuffer, Sample};
