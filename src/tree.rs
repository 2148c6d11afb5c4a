//! Flat tree over a radix-sorted key array.
//!
//! Nodes live in one arena vector and are addressed by index. A node covers a
//! contiguous range of the sorted arrays; its children split that range by the
//! digit of the node's depth, in increasing key order. The tree is built in
//! two passes over the keys: [`count_nodes`] sizes the arrays and
//! [`make_tree`] fills them, both descending with the same leaf predicate as
//! the sort.

use std::ops::Range;

use crate::config::BinConfig;
use crate::details::{CountSortDetails, is_terminal};
use crate::error::{BinError, Result};
use crate::morton::MortonKey;
use crate::normalize::Normalization;
use crate::spatial_tree::SpatialTree;

/// Represents a node of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    /// Start index of the represented group in the sorted arrays.
    pub lo: usize,
    /// Stop index (exclusive) of the represented group.
    pub hi: usize,
    /// Depth of the node; the root has depth 0.
    pub depth: usize,
    /// Index of this node.
    pub nidx: usize,
    /// Index of the parent node, `None` for the root.
    pub pidx: Option<usize>,
}

impl NodeInfo {
    pub fn range(&self) -> Range<usize> {
        self.lo..self.hi
    }

    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    pub fn is_empty(&self) -> bool {
        self.hi == self.lo
    }
}

/// Represents the tree information: the sorted cloud, its keys, the
/// normalization that produced them and the node arena.
///
/// Read-only after construction. Navigate it through [`TreeInfo::root`].
#[derive(Clone, Debug)]
pub struct TreeInfo<const D: usize, E> {
    points: Vec<[f64; D]>,
    encoded: Vec<E>,
    perm: Vec<usize>,
    norm: Normalization<D>,
    nodes: Vec<NodeInfo>,
    children: Vec<Range<usize>>,
    maxdepth: usize,
    smlth: usize,
    bitlen: u32,
}

impl<const D: usize, E: MortonKey> TreeInfo<D, E> {
    /// Facade positioned at the root node.
    pub fn root(&self) -> SpatialTree<'_, D, E> {
        SpatialTree::new(self, 0)
    }

    /// Facade positioned at node `nidx`, if it exists.
    pub fn subtree(&self, nidx: usize) -> Option<SpatialTree<'_, D, E>> {
        (nidx < self.nodes.len()).then(|| SpatialTree::new(self, nidx))
    }

    /// Points in sorted order.
    pub fn points(&self) -> &[[f64; D]] {
        &self.points
    }

    /// Morton keys in sorted order.
    pub fn keys(&self) -> &[E] {
        &self.encoded
    }

    /// Original index of every sorted position.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Maps a sorted position back to the input order.
    pub fn original_index(&self, sorted: usize) -> usize {
        self.perm[sorted]
    }

    pub fn normalization(&self) -> &Normalization<D> {
        &self.norm
    }

    pub fn scale(&self) -> &[f64; D] {
        &self.norm.scale
    }

    pub fn offset(&self) -> &[f64; D] {
        &self.norm.offset
    }

    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    pub fn node(&self, nidx: usize) -> &NodeInfo {
        &self.nodes[nidx]
    }

    /// Indices of the children of `nidx`, in increasing key order.
    pub fn children(&self, nidx: usize) -> Range<usize> {
        self.children[nidx].clone()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    pub fn maxdepth(&self) -> usize {
        self.maxdepth
    }

    /// Small (leaf size) threshold.
    pub fn smlth(&self) -> usize {
        self.smlth
    }

    /// Bits of one digit.
    pub fn bitlen(&self) -> u32 {
        self.bitlen
    }

    /// Quantization bits every level consumes per dimension.
    pub fn bits_per_dim(&self) -> u32 {
        self.bitlen / D as u32
    }
}

/// Linear searches the end of the node starting at `lo`: the first index in
/// `lo..hi` whose digit at `csd.depth()` differs from that of `keys[lo]`, or
/// `hi`.
pub fn get_node_hi<E: MortonKey>(keys: &[E], lo: usize, hi: usize, csd: &CountSortDetails) -> usize {
    let digit = csd.radixsel(keys[lo]);
    let mut end = lo + 1;
    while end < hi && csd.radixsel(keys[end]) == digit {
        end += 1;
    }
    end
}

/// Counts all nodes of the subtree rooted at the range of `csd`, the root
/// included.
pub fn count_nodes<E: MortonKey>(keys: &[E], csd: &CountSortDetails, smlth: usize) -> usize {
    if is_terminal(csd.len(), csd.depth(), smlth, csd.levels()) {
        return 1;
    }
    let mut count = 1;
    let mut lo = csd.low();
    while lo < csd.high() {
        let hi = get_node_hi(keys, lo, csd.high(), csd);
        count += count_nodes(keys, &csd.next(lo, hi), smlth);
        lo = hi;
    }
    count
}

/// Creates the tree representation of a radix-sorted cloud.
///
/// # Arguments
///
/// * `points` - The cloud in sorted order.
/// * `keys` - The sorted Morton keys.
/// * `perm` - Original index of every sorted position.
/// * `norm` - The normalization the keys were encoded with.
/// * `config` - Supplies the maximum depth, small threshold and digit width.
///
/// # Errors
///
/// [`BinError::LengthMismatch`] when the arrays differ in length, or any
/// error of [`BinConfig::validate`].
pub fn make_tree<E: MortonKey, const D: usize>(
    points: Vec<[f64; D]>,
    keys: Vec<E>,
    perm: Vec<usize>,
    norm: Normalization<D>,
    config: &BinConfig,
) -> Result<TreeInfo<D, E>> {
    if points.len() != keys.len() || keys.len() != perm.len() {
        return Err(BinError::LengthMismatch { points: points.len(), keys: keys.len(), perm: perm.len() });
    }
    config.validate::<E>(D)?;

    let n = keys.len();
    let smlth = config.small_threshold();
    let bitlen = config.digit_bits(D);
    let root = CountSortDetails::new(bitlen, D, config.max_depth, 0, n);

    let total = count_nodes(&keys, &root, smlth);
    let mut nodes = Vec::with_capacity(total);
    let mut children = vec![0..0; total];
    nodes.push(NodeInfo { lo: 0, hi: n, depth: 0, nidx: 0, pidx: None });
    make_tree_impl(&keys, &root, 0, smlth, &mut nodes, &mut children);
    debug_assert_eq!(nodes.len(), total);

    Ok(TreeInfo {
        points,
        encoded: keys,
        perm,
        norm,
        nodes,
        children,
        maxdepth: config.max_depth,
        smlth,
        bitlen,
    })
}

/// Expands node `nidx`: all of its children get consecutive indices taken
/// from the end of `nodes`, then each child is expanded in turn.
fn make_tree_impl<E: MortonKey>(
    keys: &[E],
    csd: &CountSortDetails,
    nidx: usize,
    smlth: usize,
    nodes: &mut Vec<NodeInfo>,
    children: &mut [Range<usize>],
) {
    if is_terminal(csd.len(), csd.depth(), smlth, csd.levels()) {
        return;
    }
    let first = nodes.len();
    let mut lo = csd.low();
    while lo < csd.high() {
        let hi = get_node_hi(keys, lo, csd.high(), csd);
        let idx = nodes.len();
        nodes.push(NodeInfo { lo, hi, depth: csd.depth() + 1, nidx: idx, pidx: Some(nidx) });
        lo = hi;
    }
    children[nidx] = first..nodes.len();

    for c in children[nidx].clone() {
        let node = nodes[c];
        make_tree_impl(keys, &csd.next(node.lo, node.hi), c, smlth, nodes, children);
    }
}
