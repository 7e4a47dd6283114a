use anyhow::{anyhow, bail};
use std::collections::BTreeMap;

/// Natural order of edges: block id, orientation, block id, orientation.
pub type EdgeKey = (usize, i32, usize, i32);

/// A directed adjacency between two block ends. Block 0 is a chromosome end.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub bid1: usize,
    pub dir1: i32,
    pub bid2: usize,
    pub dir2: i32,
    pub weight: f64,
    pub score1: f64,
    pub score2: f64,
}

impl Edge {
    pub fn new(bid1: usize, dir1: i32, bid2: usize, dir2: i32) -> Self {
        Self {
            bid1,
            dir1,
            bid2,
            dir2,
            weight: 0.0,
            score1: 0.0,
            score2: 0.0,
        }
    }

    /// From signed block ids, the sign being the orientation.
    pub fn from_signed(id1: i32, id2: i32) -> Self {
        let dir = |id: i32| if id < 0 { -1 } else { 1 };
        Self::new(
            id1.unsigned_abs() as usize,
            dir(id1),
            id2.unsigned_abs() as usize,
            dir(id2),
        )
    }

    pub fn key(&self) -> EdgeKey {
        (self.bid1, self.dir1, self.bid2, self.dir2)
    }

    /// The same adjacency read on the other strand.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.bid1, &mut self.bid2);
        std::mem::swap(&mut self.dir1, &mut self.dir2);
        self.dir1 = -self.dir1;
        self.dir2 = -self.dir2;
    }

    pub fn reversed(&self) -> Self {
        let mut e = self.clone();
        e.reverse();
        e
    }

    pub fn signed1(&self) -> i32 {
        self.bid1 as i32 * self.dir1
    }

    pub fn signed2(&self) -> i32 {
        self.bid2 as i32 * self.dir2
    }

    /// Registry key of the left end, the end of `bid1` this edge leaves from.
    pub fn end1(&self) -> Option<i32> {
        (self.bid1 != 0).then(|| -self.signed1())
    }

    /// Registry key of the right end, the end of `bid2` this edge enters.
    pub fn end2(&self) -> Option<i32> {
        (self.bid2 != 0).then(|| self.signed2())
    }
}

/// Adjacency scores keyed by edge, both strands of every input line.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    pub scores: BTreeMap<EdgeKey, f64>,
    /// Largest block id seen
    pub numblocks: usize,
}

impl ScoreTable {
    /// Register `id1 -> id2` and its reverse. A repeated pair takes the last score.
    pub fn insert(&mut self, id1: i32, id2: i32, score: f64) {
        let forward = Edge::from_signed(id1, id2);
        let backward = forward.reversed();
        self.numblocks = self.numblocks.max(forward.bid1).max(forward.bid2);
        self.scores.insert(forward.key(), score);
        self.scores.insert(backward.key(), score);
    }

    /// Edges between distinct blocks with a positive score, in natural order.
    pub fn weighted_edges(&self) -> Vec<Edge> {
        self.scores
            .iter()
            .filter(|(k, &v)| k.0 != k.2 && v > 0.0)
            .map(|(&(bid1, dir1, bid2, dir2), &v)| {
                let mut e = Edge::new(bid1, dir1, bid2, dir2);
                e.weight = v;
                e.score1 = v;
                e
            })
            .collect()
    }
}

/// Read `blockId1 blockId2 score` lines.
pub fn read_scores(infile: &str) -> anyhow::Result<ScoreTable> {
    let mut table = ScoreTable::default();
    for (no, line) in crate::read_data_lines(infile)? {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            bail!("{}:{}: expecting `blockId1 blockId2 score`, got `{}`", infile, no, line);
        }
        let bad = || anyhow!("{}:{}: bad score line `{}`", infile, no, line);
        let id1: i32 = fields[0].parse().map_err(|_| bad())?;
        let id2: i32 = fields[1].parse().map_err(|_| bad())?;
        let score: f64 = fields[2].parse().map_err(|_| bad())?;
        table.insert(id1, id2, score);
    }
    log::info!(
        "{} scored adjacencies over {} blocks",
        table.scores.len(),
        table.numblocks
    );

    Ok(table)
}
