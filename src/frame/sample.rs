//! Sample storage types.

use std::fmt;

use crate::format::SampleWidth;

/// Typed storage behind a plane.
#[derive(Clone, PartialEq, Eq)]
pub enum PlaneBuffer {
    /// 8-bit samples.
    Byte(Vec<u8>),
    /// 9 to 16 bit samples.
    Word(Vec<u16>),
}

impl PlaneBuffer {
    /// Allocates a zeroed buffer of `len` samples.
    pub fn zeroed(width: SampleWidth, len: usize) -> Self {
        match width {
            SampleWidth::Byte => PlaneBuffer::Byte(vec![0; len]),
            SampleWidth::Word => PlaneBuffer::Word(vec![0; len]),
        }
    }

    /// Storage width of the samples.
    #[inline]
    pub fn sample_width(&self) -> SampleWidth {
        match self {
            PlaneBuffer::Byte(_) => SampleWidth::Byte,
            PlaneBuffer::Word(_) => SampleWidth::Word,
        }
    }

    /// Number of samples, padding included.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            PlaneBuffer::Byte(data) => data.len(),
            PlaneBuffer::Word(data) => data.len(),
        }
    }

    /// True when the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PlaneBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaneBuffer")
            .field("sample_width", &self.sample_width())
            .field("len", &self.len())
            .finish()
    }
}

/// An integer sample type a plane can hold.
///
/// Implemented for `u8` (8-bit formats) and `u16` (9 to 16 bit formats).
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Storage width matching this type.
    const WIDTH: SampleWidth;
    /// Largest representable sample value.
    const MAX: Self;

    /// Widens the sample for signed arithmetic.
    fn to_i32(self) -> i32;

    /// Keeps the low bits of `value`.
    fn from_u32_truncating(value: u32) -> Self;

    /// Borrows the samples if the buffer holds this type.
    fn slice(buffer: &PlaneBuffer) -> Option<&[Self]>;

    /// Mutably borrows the samples if the buffer holds this type.
    fn slice_mut(buffer: &mut PlaneBuffer) -> Option<&mut [Self]>;

    /// Wraps owned samples into a buffer.
    fn into_buffer(data: Vec<Self>) -> PlaneBuffer;

    /// Appends the little-endian encoding of `samples` to `out`.
    fn extend_le_bytes(samples: &[Self], out: &mut Vec<u8>);
}

impl Sample for u8 {
    const WIDTH: SampleWidth = SampleWidth::Byte;
    const MAX: Self = u8::MAX;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_u32_truncating(value: u32) -> Self {
        value as u8
    }

    fn slice(buffer: &PlaneBuffer) -> Option<&[Self]> {
        match buffer {
            PlaneBuffer::Byte(data) => Some(data.as_slice()),
            PlaneBuffer::Word(_) => None,
        }
    }

    fn slice_mut(buffer: &mut PlaneBuffer) -> Option<&mut [Self]> {
        match buffer {
            PlaneBuffer::Byte(data) => Some(data.as_mut_slice()),
            PlaneBuffer::Word(_) => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> PlaneBuffer {
        PlaneBuffer::Byte(data)
    }

    fn extend_le_bytes(samples: &[Self], out: &mut Vec<u8>) {
        out.extend_from_slice(samples);
    }
}

impl Sample for u16 {
    const WIDTH: SampleWidth = SampleWidth::Word;
    const MAX: Self = u16::MAX;

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline]
    fn from_u32_truncating(value: u32) -> Self {
        value as u16
    }

    fn slice(buffer: &PlaneBuffer) -> Option<&[Self]> {
        match buffer {
            PlaneBuffer::Word(data) => Some(data.as_slice()),
            PlaneBuffer::Byte(_) => None,
        }
    }

    fn slice_mut(buffer: &mut PlaneBuffer) -> Option<&mut [Self]> {
        match buffer {
            PlaneBuffer::Word(data) => Some(data.as_mut_slice()),
            PlaneBuffer::Byte(_) => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> PlaneBuffer {
        PlaneBuffer::Word(data)
    }

    fn extend_le_bytes(samples: &[Self], out: &mut Vec<u8>) {
        out.extend(samples.iter().flat_map(|s| s.to_le_bytes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_matches_storage() {
        let buffer = u16::into_buffer(vec![1, 2, 3]);
        assert_eq!(buffer.sample_width(), SampleWidth::Word);
        assert_eq!(u16::slice(&buffer), Some(&[1u16, 2, 3][..]));
        assert!(u8::slice(&buffer).is_none());
    }

    #[test]
    fn test_le_bytes() {
        let mut out = Vec::new();
        u16::extend_le_bytes(&[0x0102, 0xA0B0], &mut out);
        assert_eq!(out, vec![0x02, 0x01, 0xB0, 0xA0]);
    }
}
