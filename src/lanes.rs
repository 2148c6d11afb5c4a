/// Mutable view of the three co-sorted arrays over one index range: the
/// payload (points), the Morton keys and the permutation.
///
/// Splitting a view hands out disjoint sub-views, which is how parallel
/// branches of the sort get exclusive access to their ranges.
#[derive(Debug)]
pub struct Lanes<'a, P, E> {
    pub points: &'a mut [P],
    pub keys: &'a mut [E],
    pub perm: &'a mut [usize],
}

impl<'a, P: Copy, E: Copy> Lanes<'a, P, E> {
    pub fn new(points: &'a mut [P], keys: &'a mut [E], perm: &'a mut [usize]) -> Self {
        debug_assert!(points.len() == keys.len() && keys.len() == perm.len());
        Self { points, keys, perm }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Reborrows the view for a shorter lifetime.
    pub fn reborrow(&mut self) -> Lanes<'_, P, E> {
        Lanes { points: &mut *self.points, keys: &mut *self.keys, perm: &mut *self.perm }
    }

    /// Splits into `[0, mid)` and `[mid, len)`.
    pub fn split_at(self, mid: usize) -> (Self, Self) {
        let Lanes { points, keys, perm } = self;
        let (p0, p1) = points.split_at_mut(mid);
        let (k0, k1) = keys.split_at_mut(mid);
        let (i0, i1) = perm.split_at_mut(mid);
        (
            Lanes { points: p0, keys: k0, perm: i0 },
            Lanes { points: p1, keys: k1, perm: i1 },
        )
    }

    /// Splits into consecutive pieces of the given lengths. The lengths must
    /// sum to `self.len()`.
    pub fn split_lengths(self, lengths: impl IntoIterator<Item = usize>) -> Vec<Self> {
        let mut rest = self;
        let mut out = Vec::new();
        for len in lengths {
            let (head, tail) = rest.split_at(len);
            out.push(head);
            rest = tail;
        }
        debug_assert!(rest.is_empty());
        out
    }

    /// Copies element `i` of `src` into slot `j` of `self`.
    #[inline]
    pub fn put(&mut self, j: usize, src: &Lanes<'_, P, E>, i: usize) {
        self.points[j] = src.points[i];
        self.keys[j] = src.keys[i];
        self.perm[j] = src.perm[i];
    }

    pub fn copy_from(&mut self, src: &Lanes<'_, P, E>) {
        self.points.copy_from_slice(src.points);
        self.keys.copy_from_slice(src.keys);
        self.perm.copy_from_slice(src.perm);
    }
}
