//! Multi-plane video frame.

use crate::format::{SampleType, SampleWidth, VideoFormat};

use super::plane::{Plane, ViewError};
use super::sample::{PlaneBuffer, Sample};

/// Row alignment, in bytes, of frames allocated by [`Frame::new`].
pub const FRAME_ALIGNMENT: usize = 32;

/// Errors raised while allocating or assembling a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Float or wider than 16-bit formats.
    #[error("no sample storage for format {0}")]
    UnsupportedStorage(String),
    /// Wrong number of planes for the format.
    #[error("format has {expected} planes, got {actual}")]
    PlaneCount { expected: usize, actual: usize },
    /// A plane's dimensions disagree with the format's subsampling.
    #[error("plane {plane} is {actual:?}, format requires {expected:?}")]
    PlaneGeometry {
        plane: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A plane stores the wrong sample type.
    #[error("plane {plane} stores {actual} samples, format requires {expected}")]
    PlaneSampleWidth {
        plane: usize,
        expected: SampleWidth,
        actual: SampleWidth,
    },
    /// Plane geometry does not fit its buffer.
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Storage width for an integer format of up to 16 bits.
fn storage_width(format: &VideoFormat) -> Result<SampleWidth, FrameError> {
    match (format.sample_type, format.bytes_per_sample()) {
        (SampleType::Integer, 1) => Ok(SampleWidth::Byte),
        (SampleType::Integer, 2) => Ok(SampleWidth::Word),
        _ => Err(FrameError::UnsupportedStorage(format.name())),
    }
}

/// A video frame: one [`Plane`] per format plane.
///
/// Frames are immutable once handed to the graph; nodes share them as
/// `Arc<Frame>` and release them by dropping the handle.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    format: VideoFormat,
    width: usize,
    height: usize,
    planes: Vec<Plane>,
}

impl Frame {
    /// Allocates a zeroed frame with aligned strides.
    pub fn new(format: VideoFormat, width: usize, height: usize) -> Result<Self, FrameError> {
        let sample_width = storage_width(&format)?;
        let planes = (0..format.num_planes())
            .map(|plane| {
                let (w, h) = format.plane_dimensions(plane, width, height);
                Plane::zeroed(sample_width, w, h, FRAME_ALIGNMENT)
            })
            .collect();

        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    /// Allocates a zeroed frame with the format and dimensions of `template`.
    pub fn new_like(template: &Frame) -> Result<Self, FrameError> {
        Self::new(template.format, template.width, template.height)
    }

    /// Assembles a frame from existing planes, checking them against `format`.
    pub fn from_planes(
        format: VideoFormat,
        width: usize,
        height: usize,
        planes: Vec<Plane>,
    ) -> Result<Self, FrameError> {
        let sample_width = storage_width(&format)?;

        if planes.len() != format.num_planes() {
            return Err(FrameError::PlaneCount {
                expected: format.num_planes(),
                actual: planes.len(),
            });
        }

        for (index, plane) in planes.iter().enumerate() {
            let expected = format.plane_dimensions(index, width, height);
            let actual = (plane.width(), plane.height());
            if expected != actual {
                return Err(FrameError::PlaneGeometry {
                    plane: index,
                    expected,
                    actual,
                });
            }
            if plane.sample_width() != sample_width {
                return Err(FrameError::PlaneSampleWidth {
                    plane: index,
                    expected: sample_width,
                    actual: plane.sample_width(),
                });
            }
        }

        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    /// Format of every plane.
    #[inline]
    pub fn format(&self) -> VideoFormat {
        self.format
    }

    /// Width of plane 0.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of plane 0.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of planes.
    #[inline]
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Returns plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_planes()`.
    #[inline]
    pub fn plane(&self, index: usize) -> &Plane {
        &self.planes[index]
    }

    /// Mutable access to plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= num_planes()`.
    #[inline]
    pub fn plane_mut(&mut self, index: usize) -> &mut Plane {
        &mut self.planes[index]
    }

    /// Iterates over all planes.
    pub fn planes(&self) -> impl Iterator<Item = &Plane> {
        self.planes.iter()
    }

    /// Row pitch of plane `index` in bytes.
    #[inline]
    pub fn stride(&self, index: usize) -> usize {
        self.planes[index].stride_bytes()
    }

    /// BLAKE3 digest of the visible samples, row by row, little-endian.
    ///
    /// Padding never contributes, so frames with different strides but
    /// equal pixels hash the same.
    pub fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        let mut row_bytes = Vec::new();

        for plane in &self.planes {
            let (width, height, stride) = (plane.width(), plane.height(), plane.stride());
            for y in 0..height {
                let start = y * stride;
                row_bytes.clear();
                match plane.buffer() {
                    PlaneBuffer::Byte(data) => u8::extend_le_bytes(&data[start..start + width], &mut row_bytes),
                    PlaneBuffer::Word(data) => u16::extend_le_bytes(&data[start..start + width], &mut row_bytes),
                }
                hasher.update(&row_bytes);
            }
        }

        hasher.finalize()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("format", &self.format.name())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("planes", &self.planes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(VideoFormat::YUV420P8, 64, 48).unwrap();

        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.num_planes(), 3);
        assert_eq!(frame.plane(1).width(), 32);
        assert_eq!(frame.plane(1).height(), 24);
        assert_eq!(frame.stride(0) % FRAME_ALIGNMENT, 0);
    }

    #[test]
    fn test_sixteen_bit_storage() {
        let frame = Frame::new(VideoFormat::GRAY16, 10, 2).unwrap();
        assert_eq!(frame.plane(0).sample_width(), SampleWidth::Word);
        assert_eq!(frame.stride(0), 32);
    }

    #[test]
    fn test_float_frame_unsupported() {
        assert!(matches!(
            Frame::new(VideoFormat::GRAYS, 4, 4),
            Err(FrameError::UnsupportedStorage(_))
        ));
    }

    #[test]
    fn test_from_planes_checks_geometry() {
        let plane = Plane::packed(vec![0u8; 6], 3, 2).unwrap();
        let err = Frame::from_planes(VideoFormat::GRAY8, 4, 2, vec![plane]).unwrap_err();
        assert!(matches!(err, FrameError::PlaneGeometry { plane: 0, .. }));

        let err = Frame::from_planes(VideoFormat::YUV444P8, 3, 2, vec![]).unwrap_err();
        assert_eq!(
            err,
            FrameError::PlaneCount {
                expected: 3,
                actual: 0
            }
        );
    }

    #[test]
    fn test_from_planes_checks_sample_width() {
        let plane = Plane::packed(vec![0u16; 4], 2, 2).unwrap();
        assert!(matches!(
            Frame::from_planes(VideoFormat::GRAY8, 2, 2, vec![plane]),
            Err(FrameError::PlaneSampleWidth { .. })
        ));
    }

    #[test]
    fn test_digest_ignores_padding() {
        let packed = Plane::packed(vec![1u8, 2, 3, 4], 2, 2).unwrap();
        let padded = Plane::from_samples(vec![1u8, 2, 77, 3, 4, 88], 2, 2, 3).unwrap();

        let a = Frame::from_planes(VideoFormat::GRAY8, 2, 2, vec![packed]).unwrap();
        let b = Frame::from_planes(VideoFormat::GRAY8, 2, 2, vec![padded]).unwrap();
        assert_eq!(a.digest(), b.digest());
    }
}
