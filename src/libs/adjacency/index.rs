use crate::libs::genome::Genome;

/// Canonical index of the left chromosome-end sentinel.
pub const LO: usize = 0;

/// Canonical index space of element ends for a reference with `T` elements.
///
/// A positive element `e` maps to `e`, its reverse `-e` to `e + T`. The two
/// sentinels take `0` (Lo) and `2T + 1` (Hi), so the space has `2T + 2` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpace {
    t: usize,
}

impl IndexSpace {
    pub fn new(t: usize) -> Self {
        Self { t }
    }

    /// `T` is the element count of the reference genome.
    pub fn from_genome(genome: &Genome) -> Self {
        Self::new(genome.element_count())
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn lo(&self) -> usize {
        LO
    }

    pub fn hi(&self) -> usize {
        2 * self.t + 1
    }

    /// Number of slots, `N = 2T + 2`.
    pub fn size(&self) -> usize {
        2 * self.t + 2
    }

    /// Fold a signed element id. `None` for 0 or ids beyond `T`.
    pub fn fold(&self, e: i32) -> Option<usize> {
        let abs = e.unsigned_abs() as usize;
        if e == 0 || abs > self.t {
            None
        } else if e > 0 {
            Some(abs)
        } else {
            Some(abs + self.t)
        }
    }

    /// Fold the left side of an adjacency, a sentinel becomes Lo.
    pub fn fold_left(&self, e: i32) -> Option<usize> {
        if e == 0 {
            Some(LO)
        } else {
            self.fold(e)
        }
    }

    /// Fold the right side of an adjacency, a sentinel becomes Hi.
    pub fn fold_right(&self, e: i32) -> Option<usize> {
        if e == 0 {
            Some(self.hi())
        } else {
            self.fold(e)
        }
    }

    /// Back to a signed id, both sentinels become 0.
    pub fn unfold(&self, x: usize) -> i32 {
        if x == LO || x >= self.hi() {
            0
        } else if x <= self.t {
            x as i32
        } else {
            -((x - self.t) as i32)
        }
    }

    /// The same end seen from the other strand. An involution.
    pub fn flip(&self, x: usize) -> usize {
        if x == LO {
            self.hi()
        } else if x == self.hi() {
            LO
        } else if x <= self.t {
            x + self.t
        } else {
            x - self.t
        }
    }

    /// Non-sentinel indices, `1..Hi`.
    pub fn inner(&self) -> std::ops::Range<usize> {
        1..self.hi()
    }
}
