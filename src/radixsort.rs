//! Most-significant-digit radix sort whose recursion is the tree.
//!
//! Every step sorts one range by the digit of its depth and recurses into the
//! resulting buckets one level deeper. Data ping-pongs between two buffer
//! sets, `a` (the caller's arrays) and `b` (scratch). Each call carries a
//! `live_in_a` flag telling which side holds the current order of its range;
//! a counting sort moves the range to the other side, so children recurse with
//! the flag flipped. Terminal ranges are copied back into `a` if needed, after
//! which `a` holds the final order everywhere.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::allocator::ScratchAllocator;
use crate::config::MAX_DIGIT_BITS;
use crate::countsort::{countsort_par, countsort_seq};
use crate::details::{CountSortDetails, RadixSortDetails, SortMode};
use crate::error::{BinError, Result};
use crate::lanes::Lanes;
use crate::morton::MortonKey;

type Child<'a, P, E> = (Lanes<'a, P, E>, Lanes<'a, P, E>, RadixSortDetails);

/// Sorts `points`, `keys` and `perm` together by key over the range of `rsd`.
///
/// Ranges that become terminal (at most `small` long, or at the last level)
/// keep their relative input order. The result does not depend on the
/// thresholds or on the number of rayon threads.
///
/// # Errors
///
/// [`BinError::LengthMismatch`] when the arrays differ in length,
/// [`BinError::RangeOutOfBounds`] when the range of `rsd` exceeds them, and
/// [`BinError::InvalidThreshold`], [`BinError::DigitTooWide`] or
/// [`BinError::KeyOverflow`] for an unusable descriptor.
pub fn radix_sort<P, E>(points: &mut [P], keys: &mut [E], perm: &mut [usize], rsd: &RadixSortDetails) -> Result<()>
where
    P: Copy + Send + Sync,
    E: MortonKey,
{
    if points.len() != keys.len() || keys.len() != perm.len() {
        return Err(BinError::LengthMismatch { points: points.len(), keys: keys.len(), perm: perm.len() });
    }
    let (lo, hi) = (rsd.low(), rsd.high());
    if lo > hi || hi > keys.len() {
        return Err(BinError::RangeOutOfBounds { lo, hi, len: keys.len() });
    }
    rsd.thresholds().validate()?;
    let csd = CountSortDetails::from(rsd);
    if csd.bitlen() > MAX_DIGIT_BITS {
        return Err(BinError::DigitTooWide { bits: csd.bitlen(), max: MAX_DIGIT_BITS });
    }
    let required = (csd.bitlen() as u64).saturating_mul(csd.levels() as u64);
    if required > E::BITS as u64 {
        return Err(BinError::KeyOverflow { required: u32::try_from(required).unwrap_or(u32::MAX), available: E::BITS });
    }

    let points = &mut points[lo..hi];
    let keys = &mut keys[lo..hi];
    let perm = &mut perm[lo..hi];
    let mut scratch_points = points.to_vec();
    let mut scratch_keys = keys.to_vec();
    let mut scratch_perm = perm.to_vec();

    let alloc = ScratchAllocator::new();
    let a = Lanes::new(points, keys, perm);
    let b = Lanes::new(&mut scratch_points, &mut scratch_keys, &mut scratch_perm);
    debug!(lo, hi, mode = ?rsd.mode(), "radix sort");
    radixsort_impl(a, b, true, *rsd, &alloc);
    Ok(())
}

fn radixsort_impl<P, E>(a: Lanes<'_, P, E>, b: Lanes<'_, P, E>, live_in_a: bool, rsd: RadixSortDetails, alloc: &ScratchAllocator)
where
    P: Copy + Send + Sync,
    E: MortonKey,
{
    match rsd.mode() {
        SortMode::SeqSeq => radixsort_seq_seq(a, b, live_in_a, rsd, alloc),
        SortMode::ParSeq => radixsort_par_seq(a, b, live_in_a, rsd, alloc),
        SortMode::ParPar => radixsort_par_par(a, b, live_in_a, rsd, alloc),
    }
}

/// Sequential-to-sequential radixsort.
///
/// # Arguments
///
/// * `a` - The primary arrays of the range; hold the result on return.
/// * `b` - The auxiliary arrays of the same range.
/// * `live_in_a` - Whether `a` (rather than `b`) holds the current order.
/// * `rsd` - The details of this step.
/// * `alloc` - Shared scratch allocator.
pub fn radixsort_seq_seq<P, E>(
    mut a: Lanes<'_, P, E>,
    mut b: Lanes<'_, P, E>,
    live_in_a: bool,
    rsd: RadixSortDetails,
    alloc: &ScratchAllocator,
) where
    P: Copy,
    E: MortonKey,
{
    if rsd.is_terminal() {
        settle(&mut a, &b, live_in_a);
        return;
    }
    let csd = CountSortDetails::from(&rsd).relative();
    let bounds = if live_in_a {
        countsort_seq(&a, &mut b, &csd, alloc)
    } else {
        countsort_seq(&b, &mut a, &csd, alloc)
    };
    let children = split_buckets(a, b, &bounds, &rsd);
    drop(bounds);

    for (a, b, child) in children {
        radixsort_seq_seq(a, b, !live_in_a, child, alloc);
    }
}

/// Parallel-to-sequential radixsort: a parallel counting sort at this level,
/// then the buckets one after another.
///
/// Arguments as in [`radixsort_seq_seq`].
pub fn radixsort_par_seq<P, E>(
    mut a: Lanes<'_, P, E>,
    mut b: Lanes<'_, P, E>,
    live_in_a: bool,
    rsd: RadixSortDetails,
    alloc: &ScratchAllocator,
) where
    P: Copy + Send + Sync,
    E: MortonKey,
{
    if rsd.is_terminal() {
        settle(&mut a, &b, live_in_a);
        return;
    }
    let csd = CountSortDetails::from(&rsd).relative();
    let bounds = if live_in_a {
        countsort_par(&a, &mut b, &csd, alloc)
    } else {
        countsort_par(&b, &mut a, &csd, alloc)
    };
    let children = split_buckets(a, b, &bounds, &rsd);
    drop(bounds);

    for (a, b, child) in children {
        match child.mode() {
            SortMode::SeqSeq => radixsort_seq_seq(a, b, !live_in_a, child, alloc),
            SortMode::ParSeq | SortMode::ParPar => radixsort_par_seq(a, b, !live_in_a, child, alloc),
        }
    }
}

/// Parallel-to-parallel radixsort: a parallel counting sort at this level,
/// then all buckets concurrently.
///
/// Siblings own disjoint sub-views of `a` and `b`, so they never touch each
/// other's data. Each child picks its own mode; past the depth threshold no
/// child spawns further parallel recursion.
///
/// Arguments as in [`radixsort_seq_seq`].
pub fn radixsort_par_par<P, E>(
    mut a: Lanes<'_, P, E>,
    mut b: Lanes<'_, P, E>,
    live_in_a: bool,
    rsd: RadixSortDetails,
    alloc: &ScratchAllocator,
) where
    P: Copy + Send + Sync,
    E: MortonKey,
{
    if rsd.is_terminal() {
        settle(&mut a, &b, live_in_a);
        return;
    }
    let csd = CountSortDetails::from(&rsd).relative();
    let bounds = if live_in_a {
        countsort_par(&a, &mut b, &csd, alloc)
    } else {
        countsort_par(&b, &mut a, &csd, alloc)
    };
    let children = split_buckets(a, b, &bounds, &rsd);
    drop(bounds);
    trace!(depth = rsd.depth(), buckets = children.len(), "parallel recursion");

    children
        .into_par_iter()
        .for_each(|(a, b, child)| radixsort_impl(a, b, !live_in_a, child, alloc));
}

/// Moves a terminal range into `a` if it currently lives in `b`.
fn settle<P: Copy, E: MortonKey>(a: &mut Lanes<'_, P, E>, b: &Lanes<'_, P, E>, live_in_a: bool) {
    if !live_in_a {
        a.copy_from(b);
    }
}

/// Cuts both sides into the non-empty buckets described by `bounds` and
/// derives the child descriptor of each.
fn split_buckets<'a, P: Copy, E: MortonKey>(
    a: Lanes<'a, P, E>,
    b: Lanes<'a, P, E>,
    bounds: &[usize],
    rsd: &RadixSortDetails,
) -> Vec<Child<'a, P, E>> {
    let lengths = || bounds.windows(2).map(|w| w[1] - w[0]);
    let side_a = a.split_lengths(lengths());
    let side_b = b.split_lengths(lengths());
    side_a
        .into_iter()
        .zip(side_b)
        .zip(bounds.windows(2))
        .filter(|(_, w)| w[1] > w[0])
        .map(|((a, b), w)| (a, b, rsd.next(rsd.low() + w[0], rsd.low() + w[1])))
        .collect()
}
