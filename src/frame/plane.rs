//! A single plane and the strided views used to walk it.

use crate::format::SampleWidth;

use super::sample::{PlaneBuffer, Sample};

/// Geometry errors raised when a view does not fit its buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// Rows would overlap.
    #[error("stride {stride} is smaller than row width {width}")]
    StrideTooSmall { stride: usize, width: usize },
    /// The last row runs past the buffer.
    #[error("buffer holds {actual} samples, view needs {needed}")]
    BufferTooSmall { needed: usize, actual: usize },
    /// The plane holds a different sample type.
    #[error("plane stores {actual} samples, view expects {expected}")]
    SampleWidthMismatch {
        expected: SampleWidth,
        actual: SampleWidth,
    },
}

/// Samples needed to hold `height` rows of `width` samples `stride` apart.
#[inline]
fn required_len(width: usize, height: usize, stride: usize) -> usize {
    if height == 0 || width == 0 {
        0
    } else {
        (height - 1) * stride + width
    }
}

fn check_geometry(len: usize, width: usize, height: usize, stride: usize) -> Result<(), ViewError> {
    if stride < width {
        return Err(ViewError::StrideTooSmall { stride, width });
    }
    let needed = required_len(width, height, stride);
    if len < needed {
        return Err(ViewError::BufferTooSmall {
            needed,
            actual: len,
        });
    }
    Ok(())
}

/// Read-only 2D view: `height` rows of `width` samples, `stride` apart.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Sample> PlaneView<'a, T> {
    /// Creates a view after checking that every row fits in `data`.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> Result<Self, ViewError> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Visible samples per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The visible samples of row `y`, padding excluded.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row {y} out of range");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Iterates over the visible part of every row.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    /// Sample at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.row(y)[x]
    }
}

/// Mutable 2D view with the same geometry rules as [`PlaneView`].
#[derive(Debug)]
pub struct PlaneViewMut<'a, T> {
    data: &'a mut [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T: Sample> PlaneViewMut<'a, T> {
    /// Creates a view after checking that every row fits in `data`.
    pub fn new(
        data: &'a mut [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, ViewError> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Visible samples per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The visible samples of row `y`, padding excluded.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} out of range");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Sets every visible sample to `value`.
    pub fn fill(&mut self, value: T) {
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }
}

/// One plane of a frame: typed samples plus row geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    buffer: PlaneBuffer,
    width: usize,
    height: usize,
    /// Row pitch in samples.
    stride: usize,
}

impl Plane {
    /// Allocates a zeroed plane whose stride is `width` rounded up to
    /// `alignment` bytes.
    pub fn zeroed(sample_width: SampleWidth, width: usize, height: usize, alignment: usize) -> Self {
        let bytes = sample_width.bytes();
        let row_bytes = width * bytes;
        let aligned = row_bytes.div_ceil(alignment.max(1)) * alignment.max(1);
        let stride = aligned / bytes;
        Self {
            buffer: PlaneBuffer::zeroed(sample_width, stride * height),
            width,
            height,
            stride,
        }
    }

    /// Wraps existing samples laid out `stride` samples per row.
    pub fn from_samples<T: Sample>(
        data: Vec<T>,
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, ViewError> {
        check_geometry(data.len(), width, height, stride)?;
        Ok(Self {
            buffer: T::into_buffer(data),
            width,
            height,
            stride,
        })
    }

    /// Wraps tightly packed rows (stride equal to width).
    pub fn packed<T: Sample>(data: Vec<T>, width: usize, height: usize) -> Result<Self, ViewError> {
        Self::from_samples(data, width, height, width)
    }

    /// Visible samples per row.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row pitch in samples.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row pitch in bytes.
    #[inline]
    pub fn stride_bytes(&self) -> usize {
        self.stride * self.sample_width().bytes()
    }

    /// Storage width of the samples.
    #[inline]
    pub fn sample_width(&self) -> SampleWidth {
        self.buffer.sample_width()
    }

    /// Raw storage, padding included.
    pub fn buffer(&self) -> &PlaneBuffer {
        &self.buffer
    }

    /// Read-only view typed as `T`.
    pub fn view<T: Sample>(&self) -> Result<PlaneView<'_, T>, ViewError> {
        let data = T::slice(&self.buffer).ok_or(ViewError::SampleWidthMismatch {
            expected: T::WIDTH,
            actual: self.sample_width(),
        })?;
        PlaneView::new(data, self.width, self.height, self.stride)
    }

    /// Mutable view typed as `T`.
    pub fn view_mut<T: Sample>(&mut self) -> Result<PlaneViewMut<'_, T>, ViewError> {
        let actual = self.sample_width();
        let data = T::slice_mut(&mut self.buffer).ok_or(ViewError::SampleWidthMismatch {
            expected: T::WIDTH,
            actual,
        })?;
        PlaneViewMut::new(data, self.width, self.height, self.stride)
    }
}
