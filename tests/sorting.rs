mod common;

use common::{clustered_cloud, random_cloud};
use regbin::{
    BinError, Normalization, RadixSortDetails, SortThresholds, radix_sort, spatial_encode,
};

const MAX_DEPTH: usize = 10;

struct Sorted {
    points: Vec<[f64; 3]>,
    keys: Vec<u64>,
    perm: Vec<usize>,
}

fn sort_cloud(cloud: &[[f64; 3]], thresholds: SortThresholds) -> Sorted {
    let norm = Normalization::fit(cloud, false).unwrap();
    let mut keys: Vec<u64> = spatial_encode(cloud, &norm, MAX_DEPTH as u32);
    let mut points = cloud.to_vec();
    let mut perm: Vec<usize> = (0..cloud.len()).collect();
    let rsd = RadixSortDetails::new(3, 3, MAX_DEPTH, 0, cloud.len(), thresholds);
    radix_sort(&mut points, &mut keys, &mut perm, &rsd).unwrap();
    Sorted { points, keys, perm }
}

fn seq_seq(small: usize) -> SortThresholds {
    SortThresholds::all_sequential(small)
}

fn par_seq(small: usize) -> SortThresholds {
    SortThresholds { parallel: usize::MAX, sequential: 1, small, depth: 1 }
}

fn par_par(small: usize) -> SortThresholds {
    SortThresholds { parallel: 1, sequential: 1, small, depth: usize::MAX }
}

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap()
}

#[test]
fn test_keys_are_sorted_and_permutation_is_consistent() {
    let cloud = random_cloud::<3>(5000, 1);
    let norm = Normalization::fit(&cloud, false).unwrap();
    let original: Vec<u64> = spatial_encode(&cloud, &norm, MAX_DEPTH as u32);

    for thresholds in [seq_seq(1), par_seq(1), par_par(1)] {
        let sorted = pool().install(|| sort_cloud(&cloud, thresholds));

        assert!(sorted.keys.windows(2).all(|w| w[0] <= w[1]), "keys not sorted with {:?}", thresholds);

        let mut seen = vec![false; cloud.len()];
        for (i, &orig) in sorted.perm.iter().enumerate() {
            assert!(!seen[orig], "index {} appears twice", orig);
            seen[orig] = true;
            assert_eq!(sorted.points[i], cloud[orig]);
            assert_eq!(sorted.keys[i], original[orig]);
        }
    }
}

#[test]
fn test_modes_produce_identical_output() {
    for (seed, small) in [(2, 1), (3, 8), (4, 64)] {
        let cloud = clustered_cloud::<3>(20_000, seed);
        let reference = sort_cloud(&cloud, seq_seq(small));

        for thresholds in [par_seq(small), par_par(small)] {
            let other = pool().install(|| sort_cloud(&cloud, thresholds));
            assert_eq!(reference.keys, other.keys, "keys differ with {:?}", thresholds);
            assert_eq!(reference.perm, other.perm, "permutation differs with {:?}", thresholds);
            assert_eq!(reference.points, other.points, "points differ with {:?}", thresholds);
        }
    }
}

#[test]
fn test_mixed_thresholds_match_sequential() {
    let cloud = random_cloud::<3>(30_000, 5);
    let reference = sort_cloud(&cloud, seq_seq(4));
    let mixed = SortThresholds { parallel: 4096, sequential: 256, small: 4, depth: 2 };
    let other = pool().install(|| sort_cloud(&cloud, mixed));
    assert_eq!(reference.perm, other.perm);
    assert_eq!(reference.keys, other.keys);
}

#[test]
fn test_sort_is_stable() {
    // every point appears three times, so every full key has three copies
    let base = random_cloud::<3>(500, 6);
    let cloud: Vec<[f64; 3]> = (0..3).flat_map(|_| base.iter().copied()).collect();

    for thresholds in [seq_seq(1), par_par(1)] {
        let sorted = pool().install(|| sort_cloud(&cloud, thresholds));
        for i in 1..sorted.keys.len() {
            if sorted.keys[i - 1] == sorted.keys[i] {
                assert!(sorted.perm[i - 1] < sorted.perm[i], "equal keys out of input order at {}", i);
            }
        }
    }
}

#[test]
fn test_small_buckets_keep_input_order() {
    let cloud = random_cloud::<3>(3000, 7);
    let sorted = sort_cloud(&cloud, seq_seq(32));
    // runs of equal top digit that fit in a small bucket are never reordered
    let mut start = 0;
    while start < sorted.keys.len() {
        let top = sorted.keys[start] >> 27;
        let mut end = start;
        while end < sorted.keys.len() && sorted.keys[end] >> 27 == top {
            end += 1;
        }
        if end - start <= 32 {
            assert!(sorted.perm[start..end].windows(2).all(|w| w[0] < w[1]));
        }
        start = end;
    }
}

#[test]
fn test_sub_range_sort_leaves_the_rest_alone() {
    let mut keys: Vec<u16> = vec![9, 8, 3, 1, 2, 0, 7, 6];
    let mut points: Vec<u16> = keys.clone();
    let mut perm: Vec<usize> = (0..keys.len()).collect();
    // one dimension, one bit per level, four levels
    let rsd = RadixSortDetails::new(1, 1, 4, 2, 6, seq_seq(1));
    radix_sort(&mut points, &mut keys, &mut perm, &rsd).unwrap();
    assert_eq!(keys, vec![9, 8, 0, 1, 2, 3, 7, 6]);
    assert_eq!(points, keys);
    assert_eq!(perm, vec![0, 1, 5, 3, 4, 2, 6, 7]);
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let mut points = vec![0u8; 4];
    let mut keys = vec![0u32; 4];
    let mut perm = vec![0usize; 3];
    let rsd = RadixSortDetails::new(2, 2, 4, 0, 4, seq_seq(1));
    assert_eq!(
        radix_sort(&mut points, &mut keys, &mut perm, &rsd),
        Err(BinError::LengthMismatch { points: 4, keys: 4, perm: 3 })
    );

    let mut perm = vec![0usize; 4];
    let rsd = RadixSortDetails::new(2, 2, 4, 0, 5, seq_seq(1));
    assert_eq!(
        radix_sort(&mut points, &mut keys, &mut perm, &rsd),
        Err(BinError::RangeOutOfBounds { lo: 0, hi: 5, len: 4 })
    );

    let rsd = RadixSortDetails::new(2, 2, 17, 0, 4, seq_seq(1));
    assert_eq!(
        radix_sort(&mut points, &mut keys, &mut perm, &rsd),
        Err(BinError::KeyOverflow { required: 34, available: 32 })
    );

    let rsd = RadixSortDetails::new(2, 2, 4, 0, 4, seq_seq(0));
    assert_eq!(
        radix_sort(&mut points, &mut keys, &mut perm, &rsd),
        Err(BinError::InvalidThreshold { name: "small threshold", value: 0 })
    );
}
