use crate::error::{BinError, Result};
use crate::morton::MortonKey;

/// Widest radix digit the counting sort accepts. Each level histogram has
/// `2^MAX_DIGIT_BITS` buckets at most, and the parallel sort keeps one such
/// column per worker.
pub const MAX_DIGIT_BITS: u32 = 20;

/// Memory layout of a flat coordinate buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Coordinates of one point are contiguous: `[x0, y0, z0, x1, y1, z1, ...]`.
    #[default]
    PointMajor,
    /// Coordinates of one dimension are contiguous: `[x0, x1, ..., y0, y1, ...]`.
    DimensionMajor,
}

/// Size and depth thresholds steering the radix sort between sequential and
/// parallel execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortThresholds {
    /// Ranges longer than this recurse into their buckets in parallel.
    pub parallel: usize,
    /// Ranges longer than this use the parallel counting sort.
    pub sequential: usize,
    /// Ranges of at most this length are left as terminal buckets.
    pub small: usize,
    /// Parallel recursion stops spawning below this depth.
    pub depth: usize,
}

impl Default for SortThresholds {
    fn default() -> Self {
        Self {
            parallel: 1 << 16,
            sequential: 1 << 12,
            small: 16,
            depth: 4,
        }
    }
}

impl SortThresholds {
    /// Thresholds that keep every step on the calling thread.
    pub fn all_sequential(small: usize) -> Self {
        Self { parallel: usize::MAX, sequential: usize::MAX, small, depth: 1 }
    }

    pub fn validate(&self) -> Result<()> {
        positive("parallel threshold", self.parallel)?;
        positive("sequential threshold", self.sequential)?;
        positive("small threshold", self.small)?;
        positive("depth threshold", self.depth)
    }
}

/// Configuration of a binning run.
///
/// The tree has `max_depth` levels below the root, and every level consumes
/// `bits_per_dim` bits of each coordinate, so the tree is
/// `2^(bits_per_dim * D)`-ary and each coordinate is quantized to
/// `bits_per_dim * max_depth` bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinConfig {
    pub max_depth: usize,
    pub bits_per_dim: u32,
    /// Use one shared scale for all dimensions and split the slack evenly.
    pub center: bool,
    pub thresholds: SortThresholds,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            bits_per_dim: 1,
            center: false,
            thresholds: SortThresholds::default(),
        }
    }
}

impl BinConfig {
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// Sets the leaf size; the tree and the sort share this threshold.
    pub fn with_small_threshold(self, small: usize) -> Self {
        Self { thresholds: SortThresholds { small, ..self.thresholds }, ..self }
    }

    pub fn with_bits_per_dim(self, bits_per_dim: u32) -> Self {
        Self { bits_per_dim, ..self }
    }

    pub fn with_center(self, center: bool) -> Self {
        Self { center, ..self }
    }

    pub fn with_thresholds(self, thresholds: SortThresholds) -> Self {
        Self { thresholds, ..self }
    }

    pub fn small_threshold(&self) -> usize {
        self.thresholds.small
    }

    /// Width in bits of one radix digit, i.e. one tree level.
    pub fn digit_bits(&self, dims: usize) -> u32 {
        self.bits_per_dim.saturating_mul(dims as u32)
    }

    /// Quantization bits per coordinate.
    pub fn levels(&self) -> u32 {
        self.bits_per_dim.saturating_mul(self.max_depth as u32)
    }

    /// Checks every setting against the key type `E` and dimension count.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint: zero dimensions, a non-positive
    /// threshold or depth, a digit wider than [`MAX_DIGIT_BITS`], or more key
    /// bits than `E` holds.
    ///
    /// The digit limit bounds histogram memory and applies even when the key
    /// type could hold the digits: `bits_per_dim * dims` must stay within
    /// [`MAX_DIGIT_BITS`], so up to 20 dimensions at one bit per level.
    pub fn validate<E: MortonKey>(&self, dims: usize) -> Result<()> {
        if dims == 0 {
            return Err(BinError::InvalidDimensions(dims));
        }
        positive("max depth", self.max_depth)?;
        positive("bits per dimension", self.bits_per_dim as usize)?;
        self.thresholds.validate()?;

        let digit = self.digit_bits(dims);
        if digit > MAX_DIGIT_BITS {
            return Err(BinError::DigitTooWide { bits: digit, max: MAX_DIGIT_BITS });
        }
        let required = (digit as u64).saturating_mul(self.max_depth as u64);
        if required > E::BITS as u64 {
            return Err(BinError::KeyOverflow {
                required: u32::try_from(required).unwrap_or(u32::MAX),
                available: E::BITS,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(BinError::InvalidThreshold { name, value })
    } else {
        Ok(())
    }
}

/// Converts a flat coordinate buffer into points.
///
/// # Errors
///
/// [`BinError::InvalidDimensions`] when `D == 0` and
/// [`BinError::DimensionMismatch`] when `data.len()` is not a multiple of `D`.
pub fn points_from_flat<const D: usize>(data: &[f64], layout: Layout) -> Result<Vec<[f64; D]>> {
    if D == 0 {
        return Err(BinError::InvalidDimensions(D));
    }
    if data.len() % D != 0 {
        return Err(BinError::DimensionMismatch { len: data.len(), dims: D });
    }
    let count = data.len() / D;
    let points = match layout {
        Layout::PointMajor => data
            .chunks_exact(D)
            .map(|c| std::array::from_fn(|d| c[d]))
            .collect(),
        Layout::DimensionMajor => (0..count)
            .map(|i| std::array::from_fn(|d| data[d * count + i]))
            .collect(),
    };
    Ok(points)
}
