//! Stable counting sort of one radix digit.
//!
//! Both variants sort the range `[lo, hi)` of a source view into the same
//! range of a destination view, leaving the source untouched and the rest of
//! the destination as it was. They return the bucket bounds: `buckets + 1`
//! offsets relative to `lo`, so bucket `b` occupies
//! `lo + bounds[b]..lo + bounds[b + 1]` of the destination.

use rayon::prelude::*;

use crate::allocator::{ScratchAllocator, ScratchBuf};
use crate::details::CountSortDetails;
use crate::lanes::Lanes;
use crate::morton::MortonKey;

/// Sequential countsort.
///
/// # Arguments
///
/// * `src` - The current points, keys and permutation.
/// * `dst` - Receives the range of `csd` ordered by the digit at `csd.depth()`.
/// * `csd` - The details of this pass.
/// * `alloc` - Source of the histogram buffers.
///
/// # Panics
///
/// If the range of `csd` exceeds either view.
pub fn countsort_seq<'p, P, E>(
    src: &Lanes<'_, P, E>,
    dst: &mut Lanes<'_, P, E>,
    csd: &CountSortDetails,
    alloc: &'p ScratchAllocator,
) -> ScratchBuf<'p>
where
    P: Copy,
    E: MortonKey,
{
    let (lo, hi) = (csd.low(), csd.high());
    assert!(hi <= src.len() && hi <= dst.len(), "range {lo}..{hi} exceeds the views");
    let buckets = csd.buckets();

    let mut bounds = alloc.take(buckets + 1);
    for &k in &src.keys[lo..hi] {
        bounds[csd.radixsel(k) + 1] += 1;
    }
    for b in 0..buckets {
        bounds[b + 1] += bounds[b];
    }

    let mut cursor = alloc.take(buckets);
    cursor.copy_from_slice(&bounds[..buckets]);
    for i in lo..hi {
        let b = csd.radixsel(src.keys[i]);
        dst.put(lo + cursor[b], src, i);
        cursor[b] += 1;
    }
    bounds
}

/// Parallel countsort.
///
/// The range is cut into one contiguous chunk per worker. Every worker counts
/// its chunk into its own column of a `buckets × workers` matrix, a single
/// pass turns the matrix into write offsets (buckets outer, workers inner),
/// and every worker then scatters its chunk into the destination slots it
/// alone owns. The output is identical to [`countsort_seq`].
///
/// # Panics
///
/// If the range of `csd` exceeds either view.
pub fn countsort_par<'p, P, E>(
    src: &Lanes<'_, P, E>,
    dst: &mut Lanes<'_, P, E>,
    csd: &CountSortDetails,
    alloc: &'p ScratchAllocator,
) -> ScratchBuf<'p>
where
    P: Copy + Send + Sync,
    E: MortonKey,
{
    let (lo, hi) = (csd.low(), csd.high());
    assert!(hi <= src.len() && hi <= dst.len(), "range {lo}..{hi} exceeds the views");
    let n = hi - lo;
    let buckets = csd.buckets();
    let chunk = n.div_ceil(rayon::current_num_threads().max(1)).max(1);
    let workers = n.div_ceil(chunk).max(1);

    // counts[w * buckets + b]: elements of chunk w falling into bucket b
    let mut counts = alloc.take(buckets * workers);
    counts
        .par_chunks_mut(buckets)
        .zip(src.keys[lo..hi].par_chunks(chunk))
        .for_each(|(column, keys)| {
            for &k in keys {
                column[csd.radixsel(k)] += 1;
            }
        });

    let mut bounds = alloc.take(buckets + 1);
    let mut running = 0;
    for b in 0..buckets {
        bounds[b] = running;
        for w in 0..workers {
            let c = counts[w * buckets + b];
            counts[w * buckets + b] = running;
            running += c;
        }
    }
    bounds[buckets] = running;

    let mut slots: Vec<Vec<Lanes<'_, P, E>>> = (0..workers).map(|_| Vec::with_capacity(buckets)).collect();
    let (_, mut rest) = dst.reborrow().split_at(lo);
    for b in 0..buckets {
        for w in 0..workers {
            let start = counts[w * buckets + b];
            let end = if w + 1 < workers { counts[(w + 1) * buckets + b] } else { bounds[b + 1] };
            let (head, tail) = rest.split_at(end - start);
            slots[w].push(head);
            rest = tail;
        }
    }
    drop(counts);

    slots.into_par_iter().enumerate().for_each(|(w, mut outs)| {
        let first = lo + w * chunk;
        let last = (first + chunk).min(hi);
        let mut cursor = alloc.take(buckets);
        for i in first..last {
            let b = csd.radixsel(src.keys[i]);
            outs[b].put(cursor[b], src, i);
            cursor[b] += 1;
        }
    });
    bounds
}
