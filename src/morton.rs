//! Quantization and Morton (Z-order) encoding.
//!
//! A point is mapped to a key in three steps: every normalized coordinate is
//! quantized to `L` bits, each per-dimension code is spread out with `D - 1`
//! zero bits between its original bits, and the spread codes are shifted by
//! their dimension index and OR-ed together. Bit `i` of dimension `d` ends up
//! at key bit `i * D + d`, so the top `D` bits of a key select the top-level
//! orthant, the next `D` bits the sub-orthant, and so on.

use std::fmt::Debug;
use std::ops::{BitAnd, BitOr, Not, Shl, Shr, Sub};

use rayon::prelude::*;

use crate::normalize::Normalization;

/// Unsigned integer types usable as Morton keys.
pub trait MortonKey:
    Copy
    + Ord
    + Default
    + Debug
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Sub<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;

    fn trailing_zeros(self) -> u32;

    /// Saturating conversion: negative and NaN map to zero, overflow to `MAX`.
    fn from_f64(x: f64) -> Self;

    /// Truncating conversion used for radix digits.
    fn low_usize(self) -> usize;

    fn to_f64(self) -> f64;

    /// Mask of the `bits` lowest bits.
    fn low_mask(bits: u32) -> Self {
        if bits >= Self::BITS {
            Self::MAX
        } else {
            (Self::ONE << bits) - Self::ONE
        }
    }

    /// Right shift that yields zero instead of overflowing.
    fn shr_or_zero(self, bits: u32) -> Self {
        if bits >= Self::BITS { Self::ZERO } else { self >> bits }
    }

    /// Left shift that yields zero instead of overflowing.
    fn shl_or_zero(self, bits: u32) -> Self {
        if bits >= Self::BITS { Self::ZERO } else { self << bits }
    }
}

macro_rules! impl_morton_key {
    ($($t:ty),*) => {
        $(
            impl MortonKey for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$t>::MAX;

                #[inline]
                fn trailing_zeros(self) -> u32 {
                    <$t>::trailing_zeros(self)
                }

                #[inline]
                fn from_f64(x: f64) -> Self {
                    x as $t
                }

                #[inline]
                fn low_usize(self) -> usize {
                    self as usize
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_morton_key!(u8, u16, u32, u64, u128);

/// Quantizes a normalized coordinate to `levels` bits.
///
/// `x` is scaled by `2^levels` and truncated; the result is clamped to
/// `[0, 2^levels - 1]` so that `x == 1.0` lands in the last cell.
///
/// # Arguments
///
/// * `x` - The coordinate, expected in `[0, 1]`.
/// * `levels` - The number of bits of the quantizer.
pub fn quantize<E: MortonKey>(x: f64, levels: u32) -> E {
    let cap = E::low_mask(levels);
    let scaled = x * 2f64.powi(levels as i32);
    if !(scaled > 0.0) {
        return E::ZERO;
    }
    E::from_f64(scaled).min(cap)
}

/// Evenly spaces out the bits of `w`, inserting `n` zero bits after each one.
///
/// Bit `i` of `w` moves to bit `i * (n + 1) + n`; bits that would move past
/// the width of `E` are dropped.
///
/// ```
/// use regbin::bit_space;
///
/// assert_eq!(bit_space(0x00AB_CDEFu32, 0), 0x00AB_CDEF);
/// assert_eq!(bit_space(0x00AB_CDEFu32, 1), 0b1010_0000_1010_0010_1010_1000_1010_1010);
/// assert_eq!(bit_space(0x00AB_CDEFu32, 3), 0b1000_1000_1000_0000_1000_1000_1000_1000);
/// ```
pub fn bit_space<E: MortonKey>(w: E, n: u32) -> E {
    spread_low(w, n).shl_or_zero(n)
}

/// Mask selecting every `(n + 1)`-th bit, starting at bit zero.
///
/// ```
/// use regbin::bit_space_mask;
///
/// assert_eq!(bit_space_mask::<u8>(0), 0b1111_1111);
/// assert_eq!(bit_space_mask::<u8>(1), 0b0101_0101);
/// assert_eq!(bit_space_mask::<u8>(2), 0b0100_1001);
/// assert_eq!(bit_space_mask::<u8>(3), 0b0001_0001);
/// ```
pub fn bit_space_mask<E: MortonKey>(n: u32) -> E {
    spread_low(E::MAX, n)
}

/// Inverse of [`bit_space`]: gathers bits `i * (n + 1) + n` of `w` into bit `i`.
pub fn bit_compact<E: MortonKey>(w: E, n: u32) -> E {
    gather_low(w.shr_or_zero(n), n)
}

// Bit i -> bit i * (n + 1).
fn spread_low<E: MortonKey>(w: E, n: u32) -> E {
    let stride = n.saturating_add(1);
    let mut out = E::ZERO;
    let mut rest = w;
    while rest != E::ZERO {
        let i = rest.trailing_zeros();
        let target = match i.checked_mul(stride) {
            Some(t) if t < E::BITS => t,
            _ => break,
        };
        out = out | (E::ONE << target);
        rest = rest & !(E::ONE << i);
    }
    out
}

// Bit i * (n + 1) -> bit i; all other bits are ignored.
fn gather_low<E: MortonKey>(w: E, n: u32) -> E {
    let stride = n.saturating_add(1);
    let mut out = E::ZERO;
    let mut rest = w & bit_space_mask::<E>(n);
    while rest != E::ZERO {
        let i = rest.trailing_zeros();
        out = out | (E::ONE << (i / stride));
        rest = rest & !(E::ONE << i);
    }
    out
}

/// Interleaves per-dimension codes into one Morton key.
///
/// Code `d` contributes its bit `i` at key bit `i * codes.len() + d`.
///
/// ```
/// use regbin::bit_interleave;
///
/// assert_eq!(bit_interleave(&[0x00FFu16, 0x000F]), 0b0101_0101_1111_1111);
/// assert_eq!(bit_interleave(&[0x000Fu16, 0x00FF]), 0b1010_1010_1111_1111);
/// assert_eq!(bit_interleave(&[0x0080u16, 0x0001]), 0b0100_0000_0000_0010);
/// assert_eq!(bit_interleave(&[0x0001u16, 0x0080]), 0b1000_0000_0000_0001);
/// ```
pub fn bit_interleave<E: MortonKey>(codes: &[E]) -> E {
    let n = codes.len().saturating_sub(1) as u32;
    codes
        .iter()
        .enumerate()
        .fold(E::ZERO, |key, (d, &c)| key | spread_low(c, n).shl_or_zero(d as u32))
}

/// Splits a Morton key back into its `D` per-dimension codes.
pub fn bit_deinterleave<E: MortonKey, const D: usize>(key: E) -> [E; D] {
    let n = D.saturating_sub(1) as u32;
    std::array::from_fn(|d| gather_low(key.shr_or_zero(d as u32), n))
}

/// Encodes one point with an already fitted normalization.
pub fn encode_point<E: MortonKey, const D: usize>(p: &[f64; D], norm: &Normalization<D>, levels: u32) -> E {
    let u = norm.apply(p);
    let codes: [E; D] = std::array::from_fn(|d| quantize(u[d], levels));
    bit_interleave(&codes)
}

/// Encodes a set of points using the Morton encoding.
///
/// # Arguments
///
/// * `points` - The point cloud, in input order.
/// * `norm` - The map placing the cloud inside the unit hypercube.
/// * `levels` - Quantization bits per coordinate.
pub fn spatial_encode<E: MortonKey, const D: usize>(
    points: &[[f64; D]],
    norm: &Normalization<D>,
    levels: u32,
) -> Vec<E> {
    points.par_iter().map(|p| encode_point(p, norm, levels)).collect()
}
