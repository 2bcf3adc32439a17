//! Sample layout description for a clip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color family of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFamily {
    /// Single luma plane.
    Gray,
    /// Three planes, R, G and B, never subsampled.
    Rgb,
    /// Luma plus two chroma planes, optionally subsampled.
    Yuv,
}

/// How individual samples are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleType {
    /// Unsigned integer samples.
    Integer,
    /// IEEE floating point samples.
    Float,
}

/// Storage width of an integer sample the filter can process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 8-bit samples stored in one byte.
    Byte,
    /// 16-bit samples stored in two bytes.
    Word,
}

impl SampleWidth {
    /// Resolves the sample width of an integer 8 or 16 bit format.
    ///
    /// Returns `None` for float formats and any other bit depth.
    pub fn from_format(format: &VideoFormat) -> Option<Self> {
        match (format.sample_type, format.bits_per_sample) {
            (SampleType::Integer, 8) => Some(SampleWidth::Byte),
            (SampleType::Integer, 16) => Some(SampleWidth::Word),
            _ => None,
        }
    }

    /// Bytes occupied by one sample.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::Byte => 1,
            SampleWidth::Word => 2,
        }
    }
}

impl fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleWidth::Byte => write!(f, "8-bit"),
            SampleWidth::Word => write!(f, "16-bit"),
        }
    }
}

/// Sample layout shared by every frame of a constant-format clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoFormat {
    /// Color family.
    pub color_family: ColorFamily,
    /// Integer or float samples.
    pub sample_type: SampleType,
    /// Significant bits per sample.
    pub bits_per_sample: u8,
    /// Horizontal chroma subsampling as a power of two.
    pub sub_sampling_w: u8,
    /// Vertical chroma subsampling as a power of two.
    pub sub_sampling_h: u8,
}

impl VideoFormat {
    /// 8-bit gray.
    pub const GRAY8: Self = Self::new(ColorFamily::Gray, SampleType::Integer, 8, 0, 0);
    /// 16-bit gray.
    pub const GRAY16: Self = Self::new(ColorFamily::Gray, SampleType::Integer, 16, 0, 0);
    /// 32-bit float gray.
    pub const GRAYS: Self = Self::new(ColorFamily::Gray, SampleType::Float, 32, 0, 0);
    /// 8-bit YUV 4:2:0.
    pub const YUV420P8: Self = Self::new(ColorFamily::Yuv, SampleType::Integer, 8, 1, 1);
    /// 10-bit YUV 4:2:0.
    pub const YUV420P10: Self = Self::new(ColorFamily::Yuv, SampleType::Integer, 10, 1, 1);
    /// 16-bit YUV 4:2:0.
    pub const YUV420P16: Self = Self::new(ColorFamily::Yuv, SampleType::Integer, 16, 1, 1);
    /// 8-bit YUV 4:4:4.
    pub const YUV444P8: Self = Self::new(ColorFamily::Yuv, SampleType::Integer, 8, 0, 0);
    /// 16-bit YUV 4:4:4.
    pub const YUV444P16: Self = Self::new(ColorFamily::Yuv, SampleType::Integer, 16, 0, 0);
    /// 8-bit planar RGB.
    pub const RGB24: Self = Self::new(ColorFamily::Rgb, SampleType::Integer, 8, 0, 0);
    /// 16-bit planar RGB.
    pub const RGB48: Self = Self::new(ColorFamily::Rgb, SampleType::Integer, 16, 0, 0);

    /// Creates a format description.
    pub const fn new(
        color_family: ColorFamily,
        sample_type: SampleType,
        bits_per_sample: u8,
        sub_sampling_w: u8,
        sub_sampling_h: u8,
    ) -> Self {
        Self {
            color_family,
            sample_type,
            bits_per_sample,
            sub_sampling_w,
            sub_sampling_h,
        }
    }

    /// Number of planes in a frame of this format.
    #[inline]
    pub fn num_planes(&self) -> usize {
        match self.color_family {
            ColorFamily::Gray => 1,
            ColorFamily::Rgb | ColorFamily::Yuv => 3,
        }
    }

    /// Bytes used to store one sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize + 7) / 8
    }

    /// Dimensions of `plane` for a frame of `width` x `height`.
    ///
    /// Chroma planes of YUV formats are shrunk by the subsampling factors.
    pub fn plane_dimensions(&self, plane: usize, width: usize, height: usize) -> (usize, usize) {
        if plane == 0 || self.color_family != ColorFamily::Yuv {
            (width, height)
        } else {
            (width >> self.sub_sampling_w, height >> self.sub_sampling_h)
        }
    }

    /// Short lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> String {
        let depth = self.bits_per_sample;
        match (self.color_family, self.sample_type) {
            (ColorFamily::Gray, SampleType::Float) => format!("grayf{depth}"),
            (ColorFamily::Gray, SampleType::Integer) => format!("gray{depth}"),
            (ColorFamily::Rgb, SampleType::Integer) => format!("rgb{}", depth as u32 * 3),
            (ColorFamily::Rgb, SampleType::Float) => format!("rgbf{depth}"),
            (ColorFamily::Yuv, sample_type) => {
                let layout = match (self.sub_sampling_w, self.sub_sampling_h) {
                    (1, 1) => "420",
                    (1, 0) => "422",
                    (0, 0) => "444",
                    _ => "xxx",
                };
                let float = if sample_type == SampleType::Float { "f" } else { "" };
                format!("yuv{layout}p{float}{depth}")
            }
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Unrecognized format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown video format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for VideoFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.to_ascii_lowercase().as_str() {
            "gray8" => Self::GRAY8,
            "gray16" => Self::GRAY16,
            "grayf32" | "grays" => Self::GRAYS,
            "yuv420p8" => Self::YUV420P8,
            "yuv420p10" => Self::YUV420P10,
            "yuv420p16" => Self::YUV420P16,
            "yuv444p8" => Self::YUV444P8,
            "yuv444p16" => Self::YUV444P16,
            "rgb24" => Self::RGB24,
            "rgb48" => Self::RGB48,
            _ => return Err(UnknownFormat(s.to_string())),
        };
        Ok(format)
    }
}
