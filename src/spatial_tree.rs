use std::ops::Range;

use crate::bounds::BoundingBox;
use crate::details::radixshft;
use crate::morton::{MortonKey, bit_deinterleave};
use crate::tree::{NodeInfo, TreeInfo};

/// A view of a [`TreeInfo`] rooted at one of its nodes.
///
/// Descending yields another view over the same arrays; nothing is copied.
#[derive(Debug)]
pub struct SpatialTree<'a, const D: usize, E> {
    info: &'a TreeInfo<D, E>,
    nidx: usize,
}

impl<const D: usize, E> Clone for SpatialTree<'_, D, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const D: usize, E> Copy for SpatialTree<'_, D, E> {}

impl<'a, const D: usize, E: MortonKey> SpatialTree<'a, D, E> {
    pub(crate) fn new(info: &'a TreeInfo<D, E>, nidx: usize) -> Self {
        Self { info, nidx }
    }

    /// The underlying tree information.
    pub fn info(&self) -> &'a TreeInfo<D, E> {
        self.info
    }

    /// Index of the current node.
    pub fn index(&self) -> usize {
        self.nidx
    }

    pub fn node(&self) -> &'a NodeInfo {
        self.info.node(self.nidx)
    }

    /// Range of the current node in the sorted arrays.
    pub fn range(&self) -> Range<usize> {
        self.node().range()
    }

    /// Number of points below the current node.
    pub fn len(&self) -> usize {
        self.node().len()
    }

    pub fn is_empty(&self) -> bool {
        self.node().is_empty()
    }

    pub fn depth(&self) -> usize {
        self.node().depth
    }

    pub fn is_root(&self) -> bool {
        self.node().pidx.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.info.children(self.nidx).is_empty()
    }

    pub fn num_children(&self) -> usize {
        self.info.children(self.nidx).len()
    }

    /// The `i`-th child in key order, or `None` if there is no such child.
    pub fn child(&self, i: usize) -> Option<Self> {
        let children = self.info.children(self.nidx);
        (i < children.len()).then(|| Self::new(self.info, children.start + i))
    }

    pub fn children(self) -> impl Iterator<Item = SpatialTree<'a, D, E>> {
        let info = self.info;
        info.children(self.nidx).map(move |c| SpatialTree::new(info, c))
    }

    pub fn parent(&self) -> Option<Self> {
        self.node().pidx.map(|p| Self::new(self.info, p))
    }

    /// Points of the current node, in sorted order.
    pub fn points(&self) -> &'a [[f64; D]] {
        &self.info.points()[self.range()]
    }

    pub fn keys(&self) -> &'a [E] {
        &self.info.keys()[self.range()]
    }

    /// Original indices of the points of the current node.
    pub fn permutation(&self) -> &'a [usize] {
        &self.info.permutation()[self.range()]
    }

    /// Leaves below the current node, depth first in key order.
    pub fn leaves(&self) -> Leaves<'a, D, E> {
        Leaves { info: self.info, stack: vec![self.nidx] }
    }

    /// The cell of the current node in the original coordinate system.
    ///
    /// A node at depth `d` is the cell of the regular grid with
    /// `2^(d * bits_per_dim)` cells per dimension that contains all of its
    /// points; the root is the whole normalized cube.
    pub fn bounds(&self) -> BoundingBox<D> {
        let info = self.info;
        let depth = self.depth();
        let bits = info.bits_per_dim() as usize * depth;
        let side = 0.5f64.powi(bits as i32);

        let codes: [E; D] = match self.keys().first() {
            Some(&key) => {
                let prefix = radixshft(key, info.maxdepth() - depth, info.bitlen());
                bit_deinterleave(prefix)
            }
            None => [E::ZERO; D],
        };
        let lower: [f64; D] = std::array::from_fn(|d| codes[d].to_f64() * side);
        let upper: [f64; D] = std::array::from_fn(|d| lower[d] + side);
        let norm = info.normalization();
        BoundingBox::new(norm.invert(&lower), norm.invert(&upper))
    }
}

/// Depth-first iterator over the leaves of a subtree.
#[derive(Debug)]
pub struct Leaves<'a, const D: usize, E> {
    info: &'a TreeInfo<D, E>,
    stack: Vec<usize>,
}

impl<'a, const D: usize, E: MortonKey> Iterator for Leaves<'a, D, E> {
    type Item = SpatialTree<'a, D, E>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(nidx) = self.stack.pop() {
            let children = self.info.children(nidx);
            if children.is_empty() {
                return Some(SpatialTree::new(self.info, nidx));
            }
            self.stack.extend(children.rev());
        }
        None
    }
}
