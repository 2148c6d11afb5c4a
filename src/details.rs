//! Immutable descriptors that parameterize one step of the counting sort,
//! the radix sort, and the tree descent.
//!
//! A descriptor is never changed in place. Descending into a bucket creates a
//! fresh value with [`CountSortDetails::next`] or [`RadixSortDetails::next`],
//! so concurrently recursing branches each own their descriptor.

use crate::config::SortThresholds;
use crate::morton::MortonKey;

/// Contains all of the details needed for one counting sort pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountSortDetails {
    bitlen: u32,
    dims: usize,
    levels: usize,
    lo: usize,
    hi: usize,
    depth: usize,
}

impl CountSortDetails {
    /// Constructs a root descriptor.
    ///
    /// # Arguments
    ///
    /// * `bitlen` - The bit length of one digit.
    /// * `dims` - The dimension count of the encoded points.
    /// * `levels` - The number of digits in a key, i.e. the maximum tree depth.
    /// * `lo` - Lower array bound.
    /// * `hi` - Higher array bound (exclusive).
    pub fn new(bitlen: u32, dims: usize, levels: usize, lo: usize, hi: usize) -> Self {
        Self { bitlen, dims, levels, lo, hi, depth: 0 }
    }

    /// Descriptor one level deeper covering `[lo, hi)`.
    #[must_use]
    pub fn next(&self, lo: usize, hi: usize) -> Self {
        Self { lo, hi, depth: self.depth + 1, ..*self }
    }

    /// The same pass over `[0, len)`, for views that begin at `lo`.
    #[must_use]
    pub fn relative(&self) -> Self {
        Self { lo: 0, hi: self.len(), ..*self }
    }

    pub fn bitlen(&self) -> u32 {
        self.bitlen
    }

    /// Mask selecting one digit.
    pub fn bitmask(&self) -> usize {
        (1usize << self.bitlen) - 1
    }

    /// Number of buckets of one digit.
    pub fn buckets(&self) -> usize {
        1usize << self.bitlen
    }

    /// The dimension count.
    pub fn leaddim(&self) -> usize {
        self.dims
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn low(&self) -> usize {
        self.lo
    }

    pub fn high(&self) -> usize {
        self.hi
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }

    /// Selects the digit of `x` for this descriptor's depth.
    #[inline]
    pub fn radixsel<E: MortonKey>(&self, x: E) -> usize {
        radixsel(self, x)
    }
}

/// Shifts `x` right by `level` digits of `bitlen` bits.
#[inline]
pub fn radixshft<E: MortonKey>(x: E, level: usize, bitlen: u32) -> E {
    let bits = u32::try_from(level).unwrap_or(u32::MAX).saturating_mul(bitlen);
    x.shr_or_zero(bits)
}

/// Selects the radix of `x` at the depth of `csd`.
///
/// Depth zero reads the most significant digit; every level below consumes the
/// next less significant one.
#[inline]
pub fn radixsel<E: MortonKey>(csd: &CountSortDetails, x: E) -> usize {
    let level = csd.levels.saturating_sub(csd.depth + 1);
    radixshft(x, level, csd.bitlen).low_usize() & csd.bitmask()
}

/// Leaf predicate shared by the radix sort and both tree passes.
#[inline]
pub fn is_terminal(len: usize, depth: usize, small: usize, maxdepth: usize) -> bool {
    len <= small || depth >= maxdepth
}

/// How one radix sort step executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    /// Sequential counting sort, sequential recursion.
    SeqSeq,
    /// Parallel counting sort, sequential recursion.
    ParSeq,
    /// Parallel counting sort, parallel recursion.
    ParPar,
}

/// Contains all of the details needed for one radix sort step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadixSortDetails {
    csd: CountSortDetails,
    thresholds: SortThresholds,
}

impl RadixSortDetails {
    /// Constructs a root descriptor.
    ///
    /// # Arguments
    ///
    /// * `bitlen` - The bit length of one digit.
    /// * `dims` - The dimension count of the encoded points.
    /// * `levels` - The number of digits in a key, i.e. the maximum tree depth.
    /// * `lo` - Lower array bound.
    /// * `hi` - Higher array bound (exclusive).
    /// * `thresholds` - Parallel, sequential, small and depth thresholds.
    pub fn new(bitlen: u32, dims: usize, levels: usize, lo: usize, hi: usize, thresholds: SortThresholds) -> Self {
        Self { csd: CountSortDetails::new(bitlen, dims, levels, lo, hi), thresholds }
    }

    /// Descriptor one level deeper covering `[lo, hi)`.
    #[must_use]
    pub fn next(&self, lo: usize, hi: usize) -> Self {
        Self { csd: self.csd.next(lo, hi), ..*self }
    }

    pub fn thresholds(&self) -> &SortThresholds {
        &self.thresholds
    }

    pub fn depth(&self) -> usize {
        self.csd.depth
    }

    pub fn low(&self) -> usize {
        self.csd.lo
    }

    pub fn high(&self) -> usize {
        self.csd.hi
    }

    pub fn len(&self) -> usize {
        self.csd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csd.is_empty()
    }

    /// Whether the active range is a leaf bucket that stays unsorted.
    pub fn is_terminal(&self) -> bool {
        is_terminal(self.len(), self.depth(), self.thresholds.small, self.csd.levels)
    }

    /// Picks the execution mode from the range length and depth.
    pub fn mode(&self) -> SortMode {
        let len = self.len();
        if len > self.thresholds.parallel && self.depth() < self.thresholds.depth {
            SortMode::ParPar
        } else if len > self.thresholds.sequential {
            SortMode::ParSeq
        } else {
            SortMode::SeqSeq
        }
    }
}

impl From<&RadixSortDetails> for CountSortDetails {
    fn from(rsd: &RadixSortDetails) -> Self {
        rsd.csd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_consumed_most_significant_first() {
        // 2D, one bit per dimension, three levels: key 0b10_01_11
        let root = CountSortDetails::new(2, 2, 3, 0, 8);
        let key = 0b10_01_11u32;
        assert_eq!(root.radixsel(key), 0b10);
        assert_eq!(root.next(0, 4).radixsel(key), 0b01);
        assert_eq!(root.next(0, 4).next(0, 2).radixsel(key), 0b11);
    }

    #[test]
    fn next_leaves_the_parent_untouched() {
        let root = RadixSortDetails::new(3, 3, 4, 0, 100, SortThresholds::default());
        let child = root.next(10, 20);
        assert_eq!((root.low(), root.high(), root.depth()), (0, 100, 0));
        assert_eq!((child.low(), child.high(), child.depth()), (10, 20, 1));
        assert_eq!(CountSortDetails::from(&child).bitmask(), 0b111);

        let local = CountSortDetails::from(&child).relative();
        assert_eq!((local.low(), local.high(), local.depth()), (0, 10, 1));
    }

    #[test]
    fn mode_follows_thresholds() {
        let th = SortThresholds { parallel: 100, sequential: 10, small: 2, depth: 2 };
        let root = RadixSortDetails::new(2, 2, 8, 0, 1000, th);
        assert_eq!(root.mode(), SortMode::ParPar);
        assert_eq!(root.next(0, 50).mode(), SortMode::ParSeq);
        assert_eq!(root.next(0, 5).mode(), SortMode::SeqSeq);
        assert_eq!(root.next(0, 500).next(0, 500).mode(), SortMode::ParSeq);
        assert!(root.next(0, 2).is_terminal());
    }

    #[test]
    fn radixshft_saturates() {
        assert_eq!(radixshft(0xFFu8, 4, 2), 0);
        assert_eq!(radixshft(0xF0u8, 2, 2), 0x0F);
    }
}
