use super::{Evidence, IndexSpace, SparseTable};
use crate::libs::phylo::{NodeId, Tree};
use anyhow::{anyhow, bail};
use fxhash::FxHashMap;
use std::io::Write;

type MemoKey = (NodeId, usize, usize);

/// One inference run over a rooted tree and the evidence of its leaves.
///
/// The recursion starts from the structural root, which must be the ancestor
/// (see `Tree::root_at_ancestor`).
pub struct Inference<'a> {
    tree: &'a Tree,
    evidence: &'a Evidence,
    space: IndexSpace,
    root: NodeId,
    /// Scaled branch length of each node
    distalpha: Vec<f64>,
    /// For every right end `j`, the left ends `s` in `[Lo, Hi)` compatible with it
    preds: Vec<Vec<usize>>,

    lp_cache: FxHashMap<MemoKey, f64>,
    ll_cache: FxHashMap<MemoKey, f64>,

    /// Predecessor likelihoods, keyed by right end
    plh: SparseTable,
    /// Successor likelihoods, keyed by left end
    slh: SparseTable,
    ppp: SparseTable,
    spp: SparseTable,
}

impl<'a> Inference<'a> {
    pub fn new(tree: &'a Tree, evidence: &'a Evidence, alpha: f64) -> anyhow::Result<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            bail!("The rate scalar must be a non-negative number, got {}", alpha);
        }
        let root = tree.get_root().ok_or_else(|| anyhow!("The tree has no root"))?;

        let mut distalpha = vec![0.0; tree.len()];
        for id in tree.preorder(&root).map_err(|e| anyhow!(e))? {
            let d = tree.distalpha(id, alpha);
            if d < 0.0 {
                let name = tree.get_node(id).map(|n| n.name_or_id()).unwrap_or_default();
                bail!("Negative branch length on node {}", name);
            }
            distalpha[id] = d;
        }

        let space = evidence.space();
        let size = space.size();
        let mut preds = vec![vec![]; size];
        for (i, j) in evidence.compat().iter() {
            if i < space.hi() {
                preds[j].push(i);
            }
        }

        Ok(Self {
            tree,
            evidence,
            space,
            root,
            distalpha,
            preds,
            lp_cache: FxHashMap::default(),
            ll_cache: FxHashMap::default(),
            plh: SparseTable::new(size),
            slh: SparseTable::new(size),
            ppp: SparseTable::new(size),
            spp: SparseTable::new(size),
        })
    }

    /// All stages in order.
    pub fn run(&mut self) {
        self.get_predecessor();
        self.get_successor();
        self.normalize();
    }

    /// Probability that end `i` at the parent of `node` became `s` along its branch.
    pub fn branch_prob(&mut self, node: NodeId, i: usize, s: usize) -> f64 {
        if let Some(&v) = self.lp_cache.get(&(node, i, s)) {
            return v;
        }

        let n = self.space.t() as f64;
        let d = self.distalpha[node];
        let k = 2.0 * n - 1.0;
        let v = if i == s {
            1.0 / k + (2.0 * n - 2.0) / k * (-k * d).exp()
        } else {
            1.0 / k - 1.0 / k * (-k * d).exp()
        };

        self.lp_cache.insert((node, i, s), v);
        v
    }

    /// Likelihood of the leaf data below `node` given that `i` precedes `j` at `node`.
    pub fn pre_likelihood(&mut self, node: NodeId, i: usize, j: usize) -> f64 {
        let tree = self.tree;
        let node_ref = match tree.get_node(node) {
            Some(n) => n,
            None => return 1.0,
        };

        if node_ref.is_leaf() {
            return self
                .evidence
                .leaf(node)
                .map(|leaf| leaf.likelihood(i, j))
                .unwrap_or(1.0);
        }

        // Binary nodes, a missing side contributes 1
        let mut value = 1.0;
        for &child in node_ref.children.iter().take(2) {
            let mut sum = 0.0;
            for k in 0..self.preds[j].len() {
                let s = self.preds[j][k];
                sum += self.branch_prob(child, i, s) * self.cached_likelihood(child, s, j);
            }
            value *= sum;
        }

        value
    }

    fn cached_likelihood(&mut self, node: NodeId, i: usize, j: usize) -> f64 {
        if let Some(&v) = self.ll_cache.get(&(node, i, j)) {
            return v;
        }
        let v = self.pre_likelihood(node, i, j);
        self.ll_cache.insert((node, i, j), v);
        v
    }

    /// Root likelihoods of every compatible pair with a non-sentinel right end.
    pub fn get_predecessor(&mut self) {
        let root = self.root;
        for j in self.space.inner() {
            for k in 0..self.preds[j].len() {
                let i = self.preds[j][k];
                let v = self.pre_likelihood(root, i, j);
                self.plh.set(j, i, v);
            }
        }
        log::debug!(
            "Predecessor table: {} entries, {} cached transitions, {} cached likelihoods",
            self.plh.len(),
            self.lp_cache.len(),
            self.ll_cache.len()
        );
    }

    /// Mirror the predecessor table onto the reverse strand: `i` followed by
    /// `j` is `flip(j)` followed by `flip(i)`.
    pub fn get_successor(&mut self) {
        for j in self.space.inner() {
            let fj = self.space.flip(j);
            for (&x, &v) in self.plh.line(j) {
                if v > 0.0 {
                    self.slh.set(fj, self.space.flip(x), v);
                }
            }
        }
    }

    /// Turn likelihoods into distributions over predecessors and successors.
    pub fn normalize(&mut self) {
        for j in self.space.inner() {
            let sum = self.plh.line_sum(j);
            if sum > 0.0 {
                for (&x, &v) in self.plh.line(j) {
                    self.ppp.set(j, x, v / sum);
                }
            }
        }
        for i in self.space.inner() {
            let sum = self.slh.line_sum(i);
            if sum > 0.0 {
                for (&x, &v) in self.slh.line(i) {
                    self.spp.set(i, x, v / sum);
                }
            }
        }

        // Sentinel rows are only ever filled from the other side
        let lo = self.space.lo();
        let hi = self.space.hi();
        for i in self.space.inner() {
            if self.evidence.compatible(lo, i) {
                let v = self.ppp.get(i, lo);
                self.spp.set(lo, i, v);
            }
        }
        for i in self.space.inner() {
            if self.evidence.compatible(i, hi) {
                let v = self.spp.get(i, hi);
                self.ppp.set(hi, i, v);
            }
        }
    }

    pub fn predecessor_likelihood(&self, i: usize, j: usize) -> f64 {
        self.plh.get(j, i)
    }

    pub fn successor_likelihood(&self, i: usize, j: usize) -> f64 {
        self.slh.get(i, j)
    }

    /// Probability that `i` is the predecessor of `j`.
    pub fn predecessor_prob(&self, i: usize, j: usize) -> f64 {
        self.ppp.get(j, i)
    }

    /// Probability that `j` is the successor of `i`.
    pub fn successor_prob(&self, i: usize, j: usize) -> f64 {
        self.spp.get(i, j)
    }

    /// Posterior probability that `i` is immediately followed by `j` in the ancestor.
    pub fn posterior(&self, i: usize, j: usize) -> f64 {
        if !self.evidence.compatible(i, j) {
            debug_assert!(false, "pair ({}, {}) was never observed", i, j);
            return 0.0;
        }
        self.predecessor_prob(i, j) * self.successor_prob(i, j)
    }

    /// Write `#T` and one `id1 id2\tprob` line per compatible pair.
    pub fn write_posteriors(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        writer.write_fmt(format_args!("#{}\n", self.space.t()))?;
        for i in 0..self.space.size() {
            for j in 0..self.space.size() {
                let (x, y) = (self.space.unfold(i), self.space.unfold(j));
                if x == 0 && y == 0 {
                    continue;
                }
                if !self.evidence.compatible(i, j) {
                    continue;
                }
                writer.write_fmt(format_args!(
                    "{} {}\t{}\n",
                    x,
                    y,
                    format_sci(self.posterior(i, j))
                ))?;
            }
        }

        Ok(())
    }
}

/// Scientific notation with six decimals and an exponent of at least two digits.
///
/// ```
/// use ancar::libs::adjacency::format_sci;
/// assert_eq!(format_sci(0.8045849), "8.045849e-01");
/// assert_eq!(format_sci(1.0), "1.000000e+00");
/// assert_eq!(format_sci(0.0), "0.000000e+00");
/// assert_eq!(format_sci(1.5e-120), "1.500000e-120");
/// ```
pub fn format_sci(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let s = format!("{:.6e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}
