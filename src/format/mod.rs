//! Video format and clip metadata.
//!
//! Describes how samples are laid out (color family, sample type, bit
//! depth, chroma subsampling) and the per-clip geometry that the filter
//! validates at construction time.

mod video_format;
mod video_info;

pub use video_format::{ColorFamily, SampleType, SampleWidth, UnknownFormat, VideoFormat};
pub use video_info::VideoInfo;
