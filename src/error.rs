//! Error types for building a binning tree.

/// Result type alias using [`BinError`].
pub type Result<T> = std::result::Result<T, BinError>;

/// Everything that can go wrong while validating input or building a tree.
///
/// All variants are detected before any encoding or sorting work starts, so a
/// failed build never leaves partially sorted buffers behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinError {
    /// The point cloud has no points.
    #[error("point cloud is empty")]
    EmptyCloud,

    /// A threshold or depth that must be positive was zero.
    #[error("invalid {name}: {value} (must be positive)")]
    InvalidThreshold {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Points must have at least one dimension.
    #[error("invalid dimension count: {0}")]
    InvalidDimensions(usize),

    /// The encoded key cannot hold `max_depth` digits.
    #[error("key overflow: {required} bits required but the key type holds {available}")]
    KeyOverflow {
        /// Bits per dimension per level × dimensions × max depth.
        required: u32,
        /// Bit width of the key type.
        available: u32,
    },

    /// A single radix digit is too wide for a histogram.
    #[error("radix digit of {bits} bits exceeds the supported {max} bits")]
    DigitTooWide {
        /// Requested digit width.
        bits: u32,
        /// Largest supported digit width.
        max: u32,
    },

    /// A flat coordinate buffer does not split into whole points.
    #[error("buffer of {len} coordinates is not a multiple of {dims} dimensions")]
    DimensionMismatch {
        /// Number of coordinates in the buffer.
        len: usize,
        /// Configured dimension count.
        dims: usize,
    },

    /// Co-sorted arrays disagree in length.
    #[error("length mismatch: {points} points, {keys} keys, {perm} permutation entries")]
    LengthMismatch {
        /// Length of the point array.
        points: usize,
        /// Length of the key array.
        keys: usize,
        /// Length of the permutation array.
        perm: usize,
    },

    /// A sort range does not fit inside the arrays it addresses.
    #[error("range {lo}..{hi} is out of bounds for length {len}")]
    RangeOutOfBounds {
        /// Lower bound of the range.
        lo: usize,
        /// Upper bound of the range (exclusive).
        hi: usize,
        /// Length of the arrays.
        len: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("point {point} has a non-finite coordinate in dimension {dim}")]
    NonFiniteCoordinate {
        /// Index of the point in input order.
        point: usize,
        /// Dimension of the coordinate.
        dim: usize,
    },
}
