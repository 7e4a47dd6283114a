use std::collections::BTreeMap;

/// Sparse table of likelihoods or probabilities.
///
/// Entries are grouped by a major index, with the minor entries kept in
/// ascending order. Predecessor tables use the right end as major index,
/// successor tables the left end.
#[derive(Debug, Clone, Default)]
pub struct SparseTable {
    lines: Vec<BTreeMap<usize, f64>>,
}

impl SparseTable {
    pub fn new(n: usize) -> Self {
        Self {
            lines: vec![BTreeMap::new(); n],
        }
    }

    pub fn set(&mut self, major: usize, minor: usize, value: f64) {
        self.lines[major].insert(minor, value);
    }

    /// Missing entries read as zero.
    pub fn get(&self, major: usize, minor: usize) -> f64 {
        self.lines
            .get(major)
            .and_then(|line| line.get(&minor))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn line(&self, major: usize) -> &BTreeMap<usize, f64> {
        &self.lines[major]
    }

    pub fn line_sum(&self, major: usize) -> f64 {
        self.lines[major].values().sum()
    }

    pub fn len(&self) -> usize {
        self.lines.iter().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_table() {
        let mut table = SparseTable::new(4);
        assert!(table.is_empty());

        table.set(2, 3, 0.25);
        table.set(2, 0, 0.5);
        table.set(2, 3, 0.5);
        assert!(!table.is_empty());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(2, 3), 0.5);
        assert_eq!(table.get(1, 3), 0.0);
        assert_eq!(table.get(9, 0), 0.0);
        assert_eq!(table.line_sum(2), 1.0);
        assert_eq!(table.line(2).keys().copied().collect::<Vec<_>>(), vec![0, 3]);
    }
}
