#![allow(dead_code)]

use rand::prelude::*;
use rand::rngs::StdRng;

/// Uniform random cloud in `[0, 100)^D`.
pub fn random_cloud<const D: usize>(count: usize, seed: u64) -> Vec<[f64; D]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| std::array::from_fn(|_| rng.r#gen::<f64>() * 100.0))
        .collect()
}

/// Cloud with heavy clustering and exact duplicates, to exercise deep and
/// equal-key buckets.
pub fn clustered_cloud<const D: usize>(count: usize, seed: u64) -> Vec<[f64; D]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<[f64; D]> = (0..4)
        .map(|_| std::array::from_fn(|_| rng.gen_range(0.0..100.0)))
        .collect();
    (0..count)
        .map(|i| {
            let c = centers[i % centers.len()];
            if i % 7 == 0 {
                c
            } else {
                std::array::from_fn(|d| c[d] + rng.gen_range(-0.5..0.5))
            }
        })
        .collect()
}
