//! Threshold lookup tables.
//!
//! The filter decision for one pixel is
//!
//! ```text
//! out = (d - 255 <= -c) ? MAX : 0
//! ```
//!
//! where `d` is the biased difference between the two sources. `d` is
//! precomputed into a 768-entry table so the plane walk is a subtraction
//! and a load, with no branch.
//!
//! | width  | bias  | index                         | outputs      |
//! |--------|-------|-------------------------------|--------------|
//! | 8-bit  | 255   | `a - b + 255`                 | {0, 255}     |
//! | 16-bit | 65535 | `(a - b + 65535) / 256`       | {0, 65535}   |
//!
//! The 16-bit path quantizes the difference to 8-bit resolution before
//! the lookup, so 16-bit clips get the same 256-step decision as 8-bit
//! ones.

use crate::format::SampleWidth;
use crate::frame::Sample;

/// Number of table entries for every sample width.
pub const LUT_SIZE: usize = 768;

/// Table index of a zero difference.
pub const CENTER: i64 = 255;

/// Default threshold when the caller does not provide one.
pub const DEFAULT_THRESHOLD: i32 = 3;

/// Whether biased index `z` lies at or below the threshold.
///
/// Evaluated in 64-bit so that `c = i32::MIN` cannot overflow on negation.
#[inline]
pub fn below_threshold(z: usize, c: i32) -> bool {
    z as i64 - CENTER <= -(c as i64)
}

/// Lookup table producing `T::MAX` or zero for a pair of samples.
#[derive(Clone, PartialEq, Eq)]
pub struct Lut<T: Sample> {
    table: [T; LUT_SIZE],
    threshold: i32,
}

impl<T: Sample> Lut<T> {
    /// Builds the table for threshold `c`.
    pub fn new(c: i32) -> Self {
        let mut table = [T::default(); LUT_SIZE];
        for (z, entry) in table.iter_mut().enumerate() {
            if below_threshold(z, c) {
                *entry = T::MAX;
            }
        }
        Self {
            table,
            threshold: c,
        }
    }

    /// Threshold the table was built for.
    #[inline]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Table entries, indexed by biased difference.
    #[inline]
    pub fn table(&self) -> &[T; LUT_SIZE] {
        &self.table
    }

    /// Biased, width-normalized index for `a - b`.
    ///
    /// The bias equals `T::MAX`, so the result is never negative; for
    /// 16-bit samples it is divided by 256 before use.
    #[inline(always)]
    pub fn index(a: T, b: T) -> usize {
        let biased = (a.to_i32() - b.to_i32() + T::MAX.to_i32()) as usize;
        match T::WIDTH {
            SampleWidth::Byte => biased,
            SampleWidth::Word => biased >> 8,
        }
    }

    /// Output for the sample pair `(a, b)`.
    #[inline(always)]
    pub fn lookup(&self, a: T, b: T) -> T {
        self.table[Self::index(a, b)]
    }
}

impl<T: Sample> std::fmt::Debug for Lut<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cutoff = self.table.iter().take_while(|&&v| v == T::MAX).count();
        f.debug_struct("Lut")
            .field("width", &T::WIDTH)
            .field("threshold", &self.threshold)
            .field("max_entries", &cutoff)
            .finish()
    }
}

/// The table matching a clip's sample width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LutSet {
    /// Table for 8-bit clips.
    Byte(Box<Lut<u8>>),
    /// Table for 16-bit clips.
    Word(Box<Lut<u16>>),
}

impl LutSet {
    /// Builds the table for `width` and threshold `c`.
    pub fn build(width: SampleWidth, c: i32) -> Self {
        match width {
            SampleWidth::Byte => LutSet::Byte(Box::new(Lut::new(c))),
            SampleWidth::Word => LutSet::Word(Box::new(Lut::new(c))),
        }
    }

    /// Sample width of the table.
    #[inline]
    pub fn sample_width(&self) -> SampleWidth {
        match self {
            LutSet::Byte(_) => SampleWidth::Byte,
            LutSet::Word(_) => SampleWidth::Word,
        }
    }

    /// Threshold `c`.
    #[inline]
    pub fn threshold(&self) -> i32 {
        match self {
            LutSet::Byte(lut) => lut.threshold(),
            LutSet::Word(lut) => lut.threshold(),
        }
    }
}
