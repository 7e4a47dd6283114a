use fixedbitset::FixedBitSet;

/// Square bit matrix over the canonical index space, row-major.
#[derive(Debug, Clone)]
pub struct BitMatrix {
    n: usize,
    bits: FixedBitSet,
}

impl BitMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            bits: FixedBitSet::with_capacity(n * n),
        }
    }

    pub fn set(&mut self, i: usize, j: usize) {
        debug_assert!(i < self.n && j < self.n);
        self.bits.insert(i * self.n + j);
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && self.bits.contains(i * self.n + j)
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Set cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.bits.ones().map(move |k| (k / self.n, k % self.n))
    }
}
