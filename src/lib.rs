//! # regbin
//!
//! `regbin` builds an adaptive hierarchical regular binning of a D-dimensional
//! point cloud: a `2^D`-ary tree (quadtree in 2D, octree in 3D) stored as flat
//! arrays over the points sorted in Morton order.
//!
//! ## Features
//!
//! - **Morton encoding**: Per-dimension normalization, optional centering, and bit interleaving into `u8` to `u128` keys.
//! - **Radix sort as tree build**: A most-significant-digit radix sort with one digit per tree level; its buckets are the tree nodes.
//! - **Parallel**: Sequential, parallel-to-sequential and parallel-to-parallel execution on `rayon`, all producing identical output.
//! - **Flat tree**: Nodes are ranges into the sorted arrays; sub-tree views never copy data.
//!
//! ## Main Interface
//!
//! The primary entry point is [`regular_bin`], which returns a [`TreeInfo`].
//! Navigate it with [`TreeInfo::root`] and the [`SpatialTree`] facade.

mod allocator;
mod binning;
mod bounds;
mod config;
mod countsort;
mod details;
mod error;
mod lanes;
mod morton;
mod normalize;
mod radixsort;
mod spatial_tree;
mod tree;

pub use allocator::ScratchAllocator;
pub use allocator::ScratchBuf;
pub use binning::regular_bin;
pub use bounds::BoundingBox;
pub use config::BinConfig;
pub use config::Layout;
pub use config::MAX_DIGIT_BITS;
pub use config::SortThresholds;
pub use config::points_from_flat;
pub use countsort::countsort_par;
pub use countsort::countsort_seq;
pub use details::CountSortDetails;
pub use details::RadixSortDetails;
pub use details::SortMode;
pub use details::is_terminal;
pub use details::radixsel;
pub use details::radixshft;
pub use error::BinError;
pub use error::Result;
pub use lanes::Lanes;
pub use morton::MortonKey;
pub use morton::bit_compact;
pub use morton::bit_deinterleave;
pub use morton::bit_interleave;
pub use morton::bit_space;
pub use morton::bit_space_mask;
pub use morton::encode_point;
pub use morton::quantize;
pub use morton::spatial_encode;
pub use normalize::Normalization;
pub use normalize::translate_scale_vals;
pub use radixsort::radix_sort;
pub use radixsort::radixsort_par_par;
pub use radixsort::radixsort_par_seq;
pub use radixsort::radixsort_seq_seq;
pub use spatial_tree::Leaves;
pub use spatial_tree::SpatialTree;
pub use tree::NodeInfo;
pub use tree::TreeInfo;
pub use tree::count_nodes;
pub use tree::get_node_hi;
pub use tree::make_tree;
