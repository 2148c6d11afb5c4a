use tracing::warn;

use crate::bounds::BoundingBox;
use crate::error::{BinError, Result};

/// Per-dimension affine map `u = (x - offset) * scale` placing a point cloud
/// inside the unit hypercube.
///
/// Both directions are evaluated on halved operands, so clouds spanning
/// nearly the whole `f64` range map without overflow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization<const D: usize> {
    pub scale: [f64; D],
    pub offset: [f64; D],
}

impl<const D: usize> Normalization<D> {
    /// The identity map.
    pub fn identity() -> Self {
        Self { scale: [1.0; D], offset: [0.0; D] }
    }

    /// Fits the map to a point cloud. See [`translate_scale_vals`].
    pub fn fit(points: &[[f64; D]], center: bool) -> Result<Self> {
        translate_scale_vals(points, center)
    }

    /// Maps a point into normalized space.
    pub fn apply(&self, p: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|d| (p[d] * 0.5 - self.offset[d] * 0.5) * self.scale[d] * 2.0)
    }

    /// Maps a normalized point back into the original coordinate system.
    pub fn invert(&self, u: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|d| (u[d] * 0.5 / self.scale[d] + self.offset[d] * 0.5) * 2.0)
    }
}

/// Computes the displacement and scale that transform the cloud into the unit
/// hypercube.
///
/// Without centering every dimension is scaled by the reciprocal of its own
/// extent. With centering all dimensions share the reciprocal of the largest
/// extent and each offset is shifted back by half of that dimension's slack,
/// so the cloud sits in the middle of the cube with its aspect ratio intact.
///
/// A dimension with zero extent keeps an identity scale.
///
/// # Errors
///
/// [`BinError::EmptyCloud`] for an empty slice and
/// [`BinError::NonFiniteCoordinate`] when any coordinate is NaN or infinite.
pub fn translate_scale_vals<const D: usize>(points: &[[f64; D]], center: bool) -> Result<Normalization<D>> {
    for (i, p) in points.iter().enumerate() {
        if let Some(dim) = p.iter().position(|x| !x.is_finite()) {
            return Err(BinError::NonFiniteCoordinate { point: i, dim });
        }
    }
    let bounds = BoundingBox::from_points(points).ok_or(BinError::EmptyCloud)?;
    // halves keep the extent finite even when max - min overflows
    let half = bounds.half_extent();

    if center {
        let widest = half.iter().copied().fold(0.0, f64::max);
        if widest == 0.0 {
            warn!(dims = D, "all dimensions have zero extent, using identity scale");
            return Ok(Normalization { scale: [1.0; D], offset: bounds.min });
        }
        let offset = std::array::from_fn(|d| bounds.min[d] - (widest - half[d]));
        return Ok(Normalization { scale: [0.5 / widest; D], offset });
    }

    let scale = std::array::from_fn(|d| {
        if half[d] == 0.0 {
            warn!(dim = d, "dimension has zero extent, using identity scale");
            1.0
        } else {
            0.5 / half[d]
        }
    });
    Ok(Normalization { scale, offset: bounds.min })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_scaling_fills_the_cube() {
        let points = [[1.0, 10.0], [3.0, 30.0], [2.0, 20.0]];
        let norm = translate_scale_vals(&points, false).unwrap();
        assert_eq!(norm.offset, [1.0, 10.0]);
        assert_eq!(norm.apply(&points[0]), [0.0, 0.0]);
        assert_eq!(norm.apply(&points[1]), [1.0, 1.0]);
        assert_eq!(norm.apply(&points[2]), [0.5, 0.5]);
    }

    #[test]
    fn centering_splits_the_slack() {
        let points = [[0.0, 0.0], [4.0, 2.0]];
        let norm = translate_scale_vals(&points, true).unwrap();
        assert_eq!(norm.scale, [0.25, 0.25]);
        assert_eq!(norm.apply(&points[0]), [0.0, 0.25]);
        assert_eq!(norm.apply(&points[1]), [1.0, 0.75]);
    }

    #[test]
    fn zero_extent_is_identity() {
        let points = [[5.0, 1.0], [5.0, 3.0]];
        let norm = translate_scale_vals(&points, false).unwrap();
        assert_eq!(norm.scale, [1.0, 0.5]);
        assert_eq!(norm.apply(&points[1]), [0.0, 1.0]);
    }

    #[test]
    fn centering_identical_points_is_identity() {
        let points = [[2.5, -1.0, 7.0]; 4];
        let norm = translate_scale_vals(&points, true).unwrap();
        assert_eq!(norm.scale, [1.0; 3]);
        assert_eq!(norm.offset, [2.5, -1.0, 7.0]);
        let keys: Vec<u64> = crate::morton::spatial_encode(&points, &norm, 10);
        assert!(keys.iter().all(|&k| k == 0));
    }

    #[test]
    fn overflowing_extent_keeps_points_apart() {
        let points = [[-1e308], [1e308], [0.0]];
        for center in [false, true] {
            let norm = translate_scale_vals(&points, center).unwrap();
            assert!(norm.scale[0] > 0.0 && norm.scale[0].is_finite());
            let u: Vec<f64> = points.iter().map(|p| norm.apply(p)[0]).collect();
            assert!(u[0].abs() < 1e-9);
            assert!((u[1] - 1.0).abs() < 1e-9);
            assert!((u[2] - 0.5).abs() < 1e-9);
            assert!((norm.invert(&[1.0])[0] / 1e308 - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn invert_round_trips() {
        let points = [[-2.0, 7.5, 0.0], [6.0, 9.5, 1.0]];
        let norm = translate_scale_vals(&points, true).unwrap();
        let p = [1.0, 8.0, 0.5];
        let back = norm.invert(&norm.apply(&p));
        for d in 0..3 {
            assert!((back[d] - p[d]).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_empty_and_nan() {
        assert_eq!(translate_scale_vals::<2>(&[], false), Err(BinError::EmptyCloud));
        assert_eq!(
            translate_scale_vals(&[[0.0, f64::NAN]], false),
            Err(BinError::NonFiniteCoordinate { point: 0, dim: 1 })
        );
    }
}
