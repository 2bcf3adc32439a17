//! Per-clip metadata: format, dimensions, length and frame rate.

use super::VideoFormat;

/// Metadata describing every frame a node can produce.
///
/// A `None` format or a zero width/height marks a clip whose frames may
/// change format or size from one index to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    /// Frame format, `None` when it varies.
    pub format: Option<VideoFormat>,
    /// Width of plane 0, zero when it varies.
    pub width: usize,
    /// Height of plane 0, zero when it varies.
    pub height: usize,
    /// Clip length.
    pub num_frames: usize,
    /// Frame rate numerator.
    pub fps_num: u64,
    /// Frame rate denominator.
    pub fps_den: u64,
}

impl VideoInfo {
    /// Creates metadata for a constant-format clip at 24 fps.
    pub fn new(format: VideoFormat, width: usize, height: usize, num_frames: usize) -> Self {
        Self {
            format: Some(format),
            width,
            height,
            num_frames,
            fps_num: 24,
            fps_den: 1,
        }
    }

    /// Overrides the frame rate.
    pub fn with_fps(mut self, fps_num: u64, fps_den: u64) -> Self {
        self.fps_num = fps_num;
        self.fps_den = fps_den;
        self
    }

    /// True when format and dimensions are fixed for the whole clip.
    #[inline]
    pub fn is_constant_format(&self) -> bool {
        self.format.is_some() && self.width > 0 && self.height > 0
    }

    /// True when both clips share format and dimensions.
    ///
    /// Frame count and frame rate are not compared.
    #[inline]
    pub fn same_video_info(&self, other: &VideoInfo) -> bool {
        self.format == other.format && self.width == other.width && self.height == other.height
    }
}
