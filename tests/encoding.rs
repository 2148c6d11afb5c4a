mod common;

use common::random_cloud;
use regbin::{
    MortonKey, Normalization, bit_compact, bit_deinterleave, bit_interleave, bit_space, bit_space_mask, encode_point,
    quantize, spatial_encode,
};

fn round_trip<E: MortonKey, const D: usize>(codes: [E; D]) {
    let key = bit_interleave(&codes);
    assert_eq!(bit_deinterleave::<E, D>(key), codes, "{:?} -> {:?}", codes, key);
}

#[test]
fn test_interleave_round_trips_for_all_widths() {
    let cloud = random_cloud::<4>(200, 11);
    for p in &cloud {
        let q = |d: usize, bits: u32| (p[d] / 100.0 * 2f64.powi(bits as i32)) as u64;

        round_trip::<u8, 1>([q(0, 8) as u8]);
        round_trip::<u16, 2>([q(0, 8) as u16, q(1, 8) as u16]);
        round_trip::<u32, 3>([q(0, 10) as u32, q(1, 10) as u32, q(2, 10) as u32]);
        round_trip::<u64, 4>([q(0, 16), q(1, 16), q(2, 16), q(3, 16)]);
        round_trip::<u128, 3>([q(0, 42) as u128, q(1, 42) as u128, q(2, 42) as u128]);
    }
}

#[test]
fn test_space_mask_covers_spaced_bits() {
    for n in 0..4u32 {
        let spaced = bit_space(u32::MAX, n);
        let mask = bit_space_mask::<u32>(n);
        assert_eq!(spaced, mask << n, "n = {n}");
        // bits pushed past the top by the shift are lost
        assert_eq!(bit_compact(spaced, n), u32::low_mask((31 - n) / (n + 1) + 1));
    }
}

#[test]
fn test_two_by_two_grid_follows_z_order() {
    // 2D, two levels: the four top-level quadrants each split in four
    let norm = Normalization::<2>::identity();
    let centers = |i: usize| (i as f64 + 0.5) / 4.0;
    let mut cells: Vec<(u32, usize, usize)> = Vec::new();
    for ix in 0..4 {
        for iy in 0..4 {
            let key: u32 = encode_point(&[centers(ix), centers(iy)], &norm, 2);
            cells.push((key, ix, iy));
        }
    }
    cells.sort();

    let keys: Vec<u32> = cells.iter().map(|c| c.0).collect();
    assert_eq!(keys, (0..16).collect::<Vec<u32>>());
    // x is dimension 0 and lands on the lower bit of every digit
    let order: Vec<(usize, usize)> = cells.iter().map(|c| (c.1, c.2)).collect();
    assert_eq!(&order[..4], &[(0, 0), (1, 0), (0, 1), (1, 1)]);
    assert_eq!(&order[4..8], &[(2, 0), (3, 0), (2, 1), (3, 1)]);
    assert_eq!(&order[8..12], &[(0, 2), (1, 2), (0, 3), (1, 3)]);
}

#[test]
fn test_unit_cube_corners() {
    let norm = Normalization::<3>::identity();
    let origin: u64 = encode_point(&[0.0, 0.0, 0.0], &norm, 21);
    let far: u64 = encode_point(&[1.0, 1.0, 1.0], &norm, 21);
    assert_eq!(origin, 0);
    assert_eq!(far, u64::low_mask(63));
    assert_eq!(quantize::<u64>(1.0, 21), u64::low_mask(21));
}

#[test]
fn test_parallel_encode_matches_pointwise() {
    let cloud = random_cloud::<3>(10_000, 12);
    let norm = Normalization::fit(&cloud, true).unwrap();
    let keys: Vec<u64> = spatial_encode(&cloud, &norm, 20);
    for (p, &k) in cloud.iter().zip(&keys) {
        assert_eq!(k, encode_point::<u64, 3>(p, &norm, 20));
        assert!(k < 1 << 60);
    }
}
