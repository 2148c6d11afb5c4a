/// Generic axis-aligned bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing every point, or `None` for an empty slice.
    pub fn from_points(points: &[[f64; D]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for p in rest {
            for d in 0..D {
                if p[d] < bounds.min[d] { bounds.min[d] = p[d]; }
                if p[d] > bounds.max[d] { bounds.max[d] = p[d]; }
            }
        }
        Some(bounds)
    }

    /// Per-dimension side lengths.
    pub fn extent(&self) -> [f64; D] {
        std::array::from_fn(|d| self.max[d] - self.min[d])
    }

    /// Half side lengths, finite for every box with finite corners.
    pub fn half_extent(&self) -> [f64; D] {
        std::array::from_fn(|d| self.max[d] * 0.5 - self.min[d] * 0.5)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &[f64; D]) -> bool {
        (0..D).all(|d| p[d] >= self.min[d] && p[d] <= self.max[d])
    }
}
