use super::Edge;
use fxhash::FxHashSet;
use std::collections::{BTreeMap, VecDeque};

/// An ordered run of edges, one ancestral contiguous fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    edges: VecDeque<Edge>,
}

impl Chain {
    pub fn new(edge: Edge) -> Self {
        Self {
            edges: VecDeque::from(vec![edge]),
        }
    }

    pub fn front(&self) -> &Edge {
        &self.edges[0]
    }

    pub fn back(&self) -> &Edge {
        &self.edges[self.edges.len() - 1]
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Signed block ids in chain order, chromosome ends left out.
    pub fn elements(&self) -> Vec<i32> {
        let mut elements: Vec<i32> = self
            .edges
            .iter()
            .filter(|e| e.bid1 != 0)
            .map(|e| e.signed1())
            .collect();
        let last = self.back();
        if last.bid2 != 0 {
            elements.push(last.signed2());
        }
        elements
    }
}

/// How an edge extends a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Accepted,
    RejectedCycle,
    NoMatch,
}

/// What became of one candidate edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Joined the chain `chain`, which then absorbed the chains in `merged`
    Accepted { chain: usize, merged: Vec<usize> },
    /// Started a chain of its own
    NewChain(usize),
    RejectedCycle,
    RejectedEndInUse,
    BelowThreshold,
}

/// Outcome of every candidate edge, in processing order.
#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    pub outcomes: Vec<(Edge, Outcome)>,
}

impl AssemblyReport {
    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn accepted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Accepted { .. } | Outcome::NewChain(_)))
    }

    pub fn rejected_cycle(&self) -> usize {
        self.count(|o| *o == Outcome::RejectedCycle)
    }

    pub fn rejected_end_in_use(&self) -> usize {
        self.count(|o| *o == Outcome::RejectedEndInUse)
    }
}

/// Greedy chain builder. Every block end is claimed by at most one edge.
#[derive(Debug, Default)]
pub struct Assembler {
    chains: BTreeMap<usize, Chain>,
    used: FxHashSet<i32>,
    last_id: usize,
    report: AssemblyReport,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble edges in decreasing weight; equal weights keep their given order.
    pub fn assemble(edges: Vec<Edge>, min_weight: f64) -> Self {
        let mut edges = edges;
        edges.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let mut assembler = Self::new();
        for edge in edges {
            if edge.weight < min_weight {
                assembler
                    .report
                    .outcomes
                    .push((edge, Outcome::BelowThreshold));
                continue;
            }
            assembler.add_edge(edge);
        }

        let report = &assembler.report;
        log::info!(
            "{} edges accepted, {} closed a cycle, {} hit a claimed end; {} APCFs",
            report.accepted(),
            report.rejected_cycle(),
            report.rejected_end_in_use(),
            assembler.chains.len()
        );

        assembler
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    pub fn report(&self) -> &AssemblyReport {
        &self.report
    }

    fn is_used(&self, end: Option<i32>) -> bool {
        end.map(|k| self.used.contains(&k)).unwrap_or(false)
    }

    /// Try the edge against every chain in creation order.
    pub fn add_edge(&mut self, edge: Edge) -> Outcome {
        let outcome = self.place(edge.clone());
        log::debug!(
            "{} {}\t{}\t{:?}",
            edge.signed1(),
            edge.signed2(),
            edge.weight,
            outcome
        );
        self.report.outcomes.push((edge, outcome.clone()));
        outcome
    }

    fn place(&mut self, edge: Edge) -> Outcome {
        if self.is_used(edge.end1()) || self.is_used(edge.end2()) {
            return Outcome::RejectedEndInUse;
        }

        let ids: Vec<usize> = self.chains.keys().copied().collect();
        for id in ids {
            let result = match self.chains.get_mut(&id) {
                Some(chain) => insert_edge(chain, edge.clone(), &mut self.used),
                None => continue,
            };
            match result {
                Insertion::Accepted => {
                    let merged = self.merge_chains(id);
                    return Outcome::Accepted { chain: id, merged };
                }
                Insertion::RejectedCycle => return Outcome::RejectedCycle,
                Insertion::NoMatch => {}
            }
        }

        for end in [edge.end1(), edge.end2()].into_iter().flatten() {
            self.used.insert(end);
        }
        self.last_id += 1;
        self.chains.insert(self.last_id, Chain::new(edge));
        Outcome::NewChain(self.last_id)
    }

    /// One pass over the other chains, in creation order, absorbing each one
    /// that continues an end of chain `id`.
    fn merge_chains(&mut self, id: usize) -> Vec<usize> {
        let mut le1 = match self.chains.remove(&id) {
            Some(chain) => chain,
            None => return vec![],
        };

        let mut merged = vec![];
        let ids: Vec<usize> = self.chains.keys().copied().collect();
        for j in ids {
            let le2 = match self.chains.get(&j) {
                Some(chain) => chain,
                None => continue,
            };
            if let Some(join) = merge_kind(&le1, le2) {
                if let Some(le2) = self.chains.remove(&j) {
                    join.apply(&mut le1, le2);
                    merged.push(j);
                }
            }
        }

        self.chains.insert(id, le1);
        merged
    }
}

fn claim_block(used: &mut FxHashSet<i32>, bid: usize) {
    if bid != 0 {
        used.insert(bid as i32);
        used.insert(-(bid as i32));
    }
}

fn claim(used: &mut FxHashSet<i32>, end: Option<i32>) {
    if let Some(k) = end {
        used.insert(k);
    }
}

/// Extend a chain by one edge at its front or back.
///
/// The edge continues the chain when it shares a block with an end of the
/// chain and the orientations line up; it is reversed first when it is read
/// on the other strand. Chromosome ends never join, and an edge that would
/// also meet the opposite end of the chain closes a cycle.
pub fn insert_edge(chain: &mut Chain, mut e: Edge, used: &mut FxHashSet<i32>) -> Insertion {
    let fe = chain.front().clone();
    let be = chain.back().clone();

    // e precedes fe with an opposite direction
    if fe.bid1 != 0 && fe.bid1 == e.bid1 && fe.dir1 != e.dir1 {
        if e.bid2 != 0 && be.bid2 == e.bid2 && be.dir2 != e.dir2 {
            return Insertion::RejectedCycle;
        }
        e.reverse();
        claim_block(used, fe.bid1);
        claim(used, e.end1());
        chain.edges.push_front(e);
        return Insertion::Accepted;
    }

    // e precedes fe with the same direction
    if fe.bid1 != 0 && fe.bid1 == e.bid2 && fe.dir1 == e.dir2 {
        if e.bid1 != 0 && be.bid2 == e.bid1 && be.dir2 == e.dir1 {
            return Insertion::RejectedCycle;
        }
        claim_block(used, fe.bid1);
        claim(used, e.end1());
        chain.edges.push_front(e);
        return Insertion::Accepted;
    }

    // be precedes e with the same direction
    if be.bid2 != 0 && be.bid2 == e.bid1 && be.dir2 == e.dir1 {
        if e.bid2 != 0 && fe.bid1 == e.bid2 && fe.dir1 == e.dir2 {
            return Insertion::RejectedCycle;
        }
        claim_block(used, be.bid2);
        claim(used, e.end2());
        chain.edges.push_back(e);
        return Insertion::Accepted;
    }

    // be precedes e with an opposite direction
    if be.bid2 != 0 && be.bid2 == e.bid2 && be.dir2 != e.dir2 {
        if e.bid1 != 0 && fe.bid1 == e.bid1 && fe.dir1 != e.dir1 {
            return Insertion::RejectedCycle;
        }
        e.reverse();
        claim_block(used, be.bid2);
        claim(used, e.end2());
        chain.edges.push_back(e);
        return Insertion::Accepted;
    }

    Insertion::NoMatch
}

/// How a second chain attaches to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Join {
    /// Fronts meet
    PrependReversed,
    /// The second chain ends where the first begins
    Prepend,
    /// The first chain ends where the second begins
    Append,
    /// Backs meet
    AppendReversed,
}

impl Join {
    fn apply(self, le1: &mut Chain, le2: Chain) {
        match self {
            Join::PrependReversed => {
                for e in le2.edges {
                    le1.edges.push_front(e.reversed());
                }
            }
            Join::Prepend => {
                for e in le2.edges.into_iter().rev() {
                    le1.edges.push_front(e);
                }
            }
            Join::Append => {
                le1.edges.extend(le2.edges);
            }
            Join::AppendReversed => {
                for e in le2.edges.into_iter().rev() {
                    le1.edges.push_back(e.reversed());
                }
            }
        }
    }
}

/// The first attachment at two open ends decides; a chromosome end is never
/// open. It is dropped when the merged chain would have the same block at
/// both ends.
fn merge_kind(le1: &Chain, le2: &Chain) -> Option<Join> {
    let (f1, b1) = (le1.front(), le1.back());
    let (f2, b2) = (le2.front(), le2.back());
    let open = |x: usize, y: usize| x == 0 || y == 0 || x != y;

    if f1.bid1 != 0 && f1.bid1 == f2.bid1 && f1.dir1 != f2.dir1 {
        open(b1.bid2, b2.bid2).then_some(Join::PrependReversed)
    } else if f1.bid1 != 0 && f1.bid1 == b2.bid2 && f1.dir1 == b2.dir2 {
        open(b1.bid2, f2.bid1).then_some(Join::Prepend)
    } else if b1.bid2 != 0 && b1.bid2 == f2.bid1 && b1.dir2 == f2.dir1 {
        open(f1.bid1, b2.bid2).then_some(Join::Append)
    } else if b1.bid2 != 0 && b1.bid2 == b2.bid2 && b1.dir2 != b2.dir2 {
        open(f1.bid1, f2.bid1).then_some(Join::AppendReversed)
    } else {
        None
    }
}
