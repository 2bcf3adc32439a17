//! Per-plane difference transform.
//!
//! Walks two source planes and one destination plane of identical
//! geometry and writes `lut[index(src1, src2)]` for every visible sample.
//! Each plane keeps its own stride; padding is neither read nor written.

use crate::format::SampleWidth;
use crate::frame::{Frame, PlaneView, PlaneViewMut, Sample, ViewError};
use crate::lut::{Lut, LutSet};

/// Errors raised when the planes handed to the transformer disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Planes differ in width or height.
    #[error("plane geometry mismatch: src1 {src1:?}, src2 {src2:?}, dst {dst:?}")]
    GeometryMismatch {
        src1: (usize, usize),
        src2: (usize, usize),
        dst: (usize, usize),
    },
    /// A frame's format does not match the table width.
    #[error("format {format} is not stored as {expected} samples")]
    UnsupportedFormat { format: String, expected: SampleWidth },
    /// Frames differ in plane count.
    #[error("frames have {src1}, {src2} and {dst} planes")]
    PlaneCountMismatch { src1: usize, src2: usize, dst: usize },
    /// A plane could not be viewed as the table's sample type.
    #[error("plane {plane}: {source}")]
    View {
        plane: usize,
        #[source]
        source: ViewError,
    },
}

/// Applies `lut` to every sample pair of `src1` and `src2`, writing `dst`.
pub fn transform_plane<T: Sample>(
    src1: &PlaneView<'_, T>,
    src2: &PlaneView<'_, T>,
    dst: &mut PlaneViewMut<'_, T>,
    lut: &Lut<T>,
) -> Result<(), TransformError> {
    let a = (src1.width(), src1.height());
    let b = (src2.width(), src2.height());
    let d = (dst.width(), dst.height());
    if a != b || a != d {
        return Err(TransformError::GeometryMismatch {
            src1: a,
            src2: b,
            dst: d,
        });
    }

    for y in 0..src1.height() {
        let (row1, row2) = (src1.row(y), src2.row(y));
        let out = dst.row_mut(y);
        for ((out, &p1), &p2) in out.iter_mut().zip(row1).zip(row2) {
            *out = lut.lookup(p1, p2);
        }
    }

    Ok(())
}

fn transform_planes<T: Sample>(
    src1: &Frame,
    src2: &Frame,
    dst: &mut Frame,
    lut: &Lut<T>,
) -> Result<(), TransformError> {
    for plane in 0..dst.num_planes() {
        let view_err = |source| TransformError::View { plane, source };

        let a = src1.plane(plane).view::<T>().map_err(view_err)?;
        let b = src2.plane(plane).view::<T>().map_err(view_err)?;
        let mut d = dst.plane_mut(plane).view_mut::<T>().map_err(view_err)?;

        transform_plane(&a, &b, &mut d, lut)?;
    }
    Ok(())
}

/// Transforms every plane of `dst` from the matching planes of the sources.
///
/// The sample width of `luts` selects the arithmetic. Every frame must be
/// an integer format of exactly that width; 9 to 15 bit formats are
/// rejected since the table assumes a full-range bias.
pub fn transform_frame(
    src1: &Frame,
    src2: &Frame,
    dst: &mut Frame,
    luts: &LutSet,
) -> Result<(), TransformError> {
    let expected = luts.sample_width();
    for frame in [src1, src2, &*dst] {
        if SampleWidth::from_format(&frame.format()) != Some(expected) {
            return Err(TransformError::UnsupportedFormat {
                format: frame.format().name(),
                expected,
            });
        }
    }

    if src1.num_planes() != dst.num_planes() || src2.num_planes() != dst.num_planes() {
        return Err(TransformError::PlaneCountMismatch {
            src1: src1.num_planes(),
            src2: src2.num_planes(),
            dst: dst.num_planes(),
        });
    }

    match luts {
        LutSet::Byte(lut) => transform_planes::<u8>(src1, src2, dst, lut),
        LutSet::Word(lut) => transform_planes::<u16>(src1, src2, dst, lut),
    }
}

/// Builds the table for `width` and `c`, then transforms the frame.
///
/// Filters keep their table across frames; this is for one-off use.
pub fn binarize_frame(
    src1: &Frame,
    src2: &Frame,
    dst: &mut Frame,
    width: SampleWidth,
    c: i32,
) -> Result<(), TransformError> {
    transform_frame(src1, src2, dst, &LutSet::build(width, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ColorFamily, SampleType, VideoFormat};
    use crate::frame::Plane;
    use crate::lut::DEFAULT_THRESHOLD;
    use proptest::prelude::*;

    fn gray8(data: Vec<u8>, width: usize, height: usize, stride: usize) -> Frame {
        let plane = Plane::from_samples(data, width, height, stride).unwrap();
        Frame::from_planes(VideoFormat::GRAY8, width, height, vec![plane]).unwrap()
    }

    fn gray16(data: Vec<u16>, width: usize, height: usize, stride: usize) -> Frame {
        let plane = Plane::from_samples(data, width, height, stride).unwrap();
        Frame::from_planes(VideoFormat::GRAY16, width, height, vec![plane]).unwrap()
    }

    fn samples<T: Sample>(frame: &Frame, plane: usize) -> Vec<T> {
        let view = frame.plane(plane).view::<T>().unwrap();
        view.rows().flatten().copied().collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let src1 = gray8(vec![10, 250, 0, 200], 4, 1, 4);
        let src2 = gray8(vec![10, 10, 100, 0], 4, 1, 4);
        let mut dst = Frame::new_like(&src1).unwrap();

        binarize_frame(&src1, &src2, &mut dst, SampleWidth::Byte, DEFAULT_THRESHOLD).unwrap();

        assert_eq!(samples::<u8>(&dst, 0), vec![255, 255, 255, 0]);
    }

    #[test]
    fn test_identical_sources_give_zero() {
        let src = gray8((0..64).collect(), 8, 8, 8);
        let mut dst = Frame::new_like(&src).unwrap();

        binarize_frame(&src, &src, &mut dst, SampleWidth::Byte, 1).unwrap();

        assert!(samples::<u8>(&dst, 0).iter().all(|&v| v == 0));
    }

    #[test]
    fn test_padding_neither_read_nor_written() {
        // Source padding holds values that would flip the decision if read.
        let src1 = gray8(vec![0, 0, 255, 255, 0, 0, 255, 255], 2, 2, 4);
        let src2 = gray8(vec![0, 0, 0, 0, 0, 0, 0, 0], 2, 2, 4);

        let dst_plane = Plane::from_samples(vec![42u8; 6], 2, 2, 3).unwrap();
        let mut dst = Frame::from_planes(VideoFormat::GRAY8, 2, 2, vec![dst_plane]).unwrap();

        binarize_frame(&src1, &src2, &mut dst, SampleWidth::Byte, 3).unwrap();

        assert_eq!(samples::<u8>(&dst, 0), vec![0, 0, 0, 0]);
        // padding sample between rows is untouched
        match dst.plane(0).buffer() {
            crate::frame::PlaneBuffer::Byte(data) => assert_eq!(data[2], 42),
            other => panic!("unexpected storage {other:?}"),
        }
    }

    #[test]
    fn test_word_planes() {
        let a = Plane::packed(vec![1000u16, 40000, 0], 3, 1).unwrap();
        let b = Plane::packed(vec![1768u16, 0, 40000], 3, 1).unwrap();
        let src1 = Frame::from_planes(VideoFormat::GRAY16, 3, 1, vec![a]).unwrap();
        let src2 = Frame::from_planes(VideoFormat::GRAY16, 3, 1, vec![b]).unwrap();
        let mut dst = Frame::new_like(&src1).unwrap();

        binarize_frame(&src1, &src2, &mut dst, SampleWidth::Word, 3).unwrap();

        assert_eq!(samples::<u16>(&dst, 0), vec![65535, 0, 65535]);
    }

    #[test]
    fn test_subsampled_planes_follow_geometry() {
        let src1 = Frame::new(VideoFormat::YUV420P8, 8, 4).unwrap();
        let src2 = Frame::new(VideoFormat::YUV420P8, 8, 4).unwrap();
        let mut dst = Frame::new_like(&src1).unwrap();

        // zero difference, negative threshold: every sample becomes max
        binarize_frame(&src1, &src2, &mut dst, SampleWidth::Byte, -1).unwrap();

        assert_eq!(samples::<u8>(&dst, 0).len(), 32);
        assert_eq!(samples::<u8>(&dst, 1).len(), 8);
        for plane in 0..3 {
            assert!(samples::<u8>(&dst, plane).iter().all(|&v| v == 255));
        }
    }

    #[test]
    fn test_geometry_mismatch_reported() {
        let data = vec![0u8; 16];
        let mut out = vec![0u8; 16];
        let a = PlaneView::new(&data, 4, 4, 4).unwrap();
        let b = PlaneView::new(&data, 2, 4, 4).unwrap();
        let mut d = PlaneViewMut::new(&mut out, 4, 4, 4).unwrap();

        let lut = Lut::<u8>::new(3);
        assert!(matches!(
            transform_plane(&a, &b, &mut d, &lut),
            Err(TransformError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_table_width_reported() {
        let src = gray8(vec![0; 4], 2, 2, 2);
        let mut dst = Frame::new_like(&src).unwrap();
        assert_eq!(
            binarize_frame(&src, &src, &mut dst, SampleWidth::Word, 3),
            Err(TransformError::UnsupportedFormat {
                format: "gray8".to_string(),
                expected: SampleWidth::Word,
            })
        );
    }

    #[test]
    fn test_partial_depth_formats_rejected() {
        // 0 - 600 is far below -c, but a 10-bit clip cannot use the 16-bit bias
        let gray10 = VideoFormat::new(ColorFamily::Gray, SampleType::Integer, 10, 0, 0);
        let plane = |v: u16| vec![Plane::packed(vec![v], 1, 1).unwrap()];
        let src1 = Frame::from_planes(gray10, 1, 1, plane(0)).unwrap();
        let src2 = Frame::from_planes(gray10, 1, 1, plane(600)).unwrap();
        let mut dst = Frame::new_like(&src1).unwrap();

        let result = binarize_frame(&src1, &src2, &mut dst, SampleWidth::Word, 3);
        assert!(matches!(
            result,
            Err(TransformError::UnsupportedFormat { expected: SampleWidth::Word, .. })
        ));
        assert_eq!(samples::<u16>(&dst, 0), vec![0]);

        let yuv = Frame::new(VideoFormat::YUV420P10, 4, 4).unwrap();
        let mut out = Frame::new_like(&yuv).unwrap();
        assert!(matches!(
            binarize_frame(&yuv, &yuv, &mut out, SampleWidth::Word, 3),
            Err(TransformError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_mixed_destination_format_rejected() {
        let src = gray8(vec![0; 4], 2, 2, 2);
        let mut dst = Frame::new(VideoFormat::GRAY16, 2, 2).unwrap();
        assert!(matches!(
            binarize_frame(&src, &src, &mut dst, SampleWidth::Byte, 3),
            Err(TransformError::UnsupportedFormat { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_stride_independent(
            (width, height, pixels1, pixels2) in (1usize..9, 1usize..6).prop_flat_map(|(w, h)| {
                let n = w * h;
                (Just(w), Just(h), prop::collection::vec(any::<u8>(), n), prop::collection::vec(any::<u8>(), n))
            }),
            pad1 in 0usize..5,
            pad2 in 0usize..5,
            c in -20i32..20,
        ) {
            let packed1 = gray8(pixels1.clone(), width, height, width);
            let packed2 = gray8(pixels2.clone(), width, height, width);
            let mut expected = Frame::new_like(&packed1).unwrap();
            binarize_frame(&packed1, &packed2, &mut expected, SampleWidth::Byte, c).unwrap();

            let spread = |pixels: &[u8], pad: usize| -> Vec<u8> {
                pixels
                    .chunks(width)
                    .flat_map(|row| row.iter().copied().chain(std::iter::repeat(0xA5).take(pad)))
                    .collect()
            };
            let padded1 = gray8(spread(&pixels1, pad1), width, height, width + pad1);
            let padded2 = gray8(spread(&pixels2, pad2), width, height, width + pad2);
            let mut actual = Frame::new_like(&padded1).unwrap();
            binarize_frame(&padded1, &padded2, &mut actual, SampleWidth::Byte, c).unwrap();

            prop_assert_eq!(samples::<u8>(&expected, 0), samples::<u8>(&actual, 0));
        }

        #[test]
        fn prop_word_stride_independent(
            (width, height, pixels1, pixels2) in (1usize..7, 1usize..5).prop_flat_map(|(w, h)| {
                let n = w * h;
                (Just(w), Just(h), prop::collection::vec(any::<u16>(), n), prop::collection::vec(any::<u16>(), n))
            }),
            pad1 in 1usize..4,
            pad2 in 1usize..4,
            c in -40i32..40,
        ) {
            // src1 padding 0 against src2 padding 65535 would always binarize to max if read
            let spread = |pixels: &[u16], pad: usize, fill: u16| -> Vec<u16> {
                pixels
                    .chunks(width)
                    .flat_map(|row| row.iter().copied().chain(std::iter::repeat(fill).take(pad)))
                    .collect()
            };
            let padded1 = gray16(spread(&pixels1, pad1, 0), width, height, width + pad1);
            let padded2 = gray16(spread(&pixels2, pad2, u16::MAX), width, height, width + pad2);
            let mut actual = Frame::new_like(&padded1).unwrap();
            binarize_frame(&padded1, &padded2, &mut actual, SampleWidth::Word, c).unwrap();

            let expected: Vec<u16> = pixels1
                .iter()
                .zip(&pixels2)
                .map(|(&a, &b)| {
                    let z = (a as i64 - b as i64 + 65535) / 256;
                    if z - 255 <= -(c as i64) { u16::MAX } else { 0 }
                })
                .collect();
            prop_assert_eq!(samples::<u16>(&actual, 0), expected);
        }

        #[test]
        fn prop_matches_direct_rule(a in any::<u8>(), b in any::<u8>(), c in -300i32..300) {
            let src1 = gray8(vec![a], 1, 1, 1);
            let src2 = gray8(vec![b], 1, 1, 1);
            let mut dst = Frame::new_like(&src1).unwrap();
            binarize_frame(&src1, &src2, &mut dst, SampleWidth::Byte, c).unwrap();

            let diff = a as i32 - b as i32;
            let expected = if diff <= -c { 255u8 } else { 0 };
            prop_assert_eq!(samples::<u8>(&dst, 0), vec![expected]);
        }
    }
}
