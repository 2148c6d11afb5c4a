use tracing::{debug, debug_span};

use crate::config::BinConfig;
use crate::details::RadixSortDetails;
use crate::error::Result;
use crate::morton::{MortonKey, spatial_encode};
use crate::normalize::Normalization;
use crate::radixsort::radix_sort;
use crate::tree::{TreeInfo, make_tree};

/// Constructs the tree.
///
/// Normalizes the cloud into the unit hypercube, encodes every point as a
/// Morton key of type `E`, radix sorts points, keys and permutation together,
/// and turns the sort's buckets into a [`TreeInfo`].
///
/// # Arguments
///
/// * `points` - The cloud of points.
/// * `config` - Maximum depth, small threshold, centering and sort thresholds.
///
/// # Errors
///
/// Configuration errors from [`BinConfig::validate`] are reported before any
/// work starts; an empty cloud or a non-finite coordinate is reported by the
/// normalization step.
///
/// # Example
///
/// ```
/// use regbin::{BinConfig, TreeInfo, regular_bin};
///
/// let points = [[0.0, 0.0], [0.1, 0.1], [0.9, 0.9], [0.5, 0.5]];
/// let config = BinConfig::default().with_max_depth(2).with_small_threshold(1);
/// let tree: TreeInfo<2, u32> = regular_bin(&points, &config).unwrap();
/// assert_eq!(tree.permutation(), &[0, 1, 3, 2]);
/// assert_eq!(tree.root().num_children(), 2);
/// ```
pub fn regular_bin<E: MortonKey, const D: usize>(points: &[[f64; D]], config: &BinConfig) -> Result<TreeInfo<D, E>> {
    let _span = debug_span!("regular_bin", points = points.len(), dims = D).entered();
    config.validate::<E>(D)?;

    let norm = Normalization::fit(points, config.center)?;
    debug!(scale = ?norm.scale, offset = ?norm.offset, "normalized");

    let levels = config.levels();
    let mut keys: Vec<E> = spatial_encode(points, &norm, levels);
    debug!(levels, key_bits = E::BITS, "encoded");

    let n = points.len();
    let mut sorted = points.to_vec();
    let mut perm: Vec<usize> = (0..n).collect();
    let rsd = RadixSortDetails::new(config.digit_bits(D), D, config.max_depth, 0, n, config.thresholds);
    radix_sort(&mut sorted, &mut keys, &mut perm, &rsd)?;
    debug!("sorted");

    let tree = make_tree(sorted, keys, perm, norm, config)?;
    debug!(nodes = tree.num_nodes(), "tree built");
    Ok(tree)
}
