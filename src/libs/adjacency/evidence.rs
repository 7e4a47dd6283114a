use super::{BitMatrix, IndexSpace};
use crate::libs::genome::{read_joins, Genome};
use crate::libs::phylo::{NodeId, Tree};
use anyhow::{anyhow, bail};
use fixedbitset::FixedBitSet;
use fxhash::FxHashMap;
use std::collections::BTreeMap;
use std::path::Path;

/// What one leaf contributes: the adjacencies it shows, and which right ends
/// it has an opinion about at all.
#[derive(Debug, Clone)]
pub struct LeafEvidence {
    pub name: String,
    pub observed: BitMatrix,
    /// `there[j]` is set when the leaf constrains the pairs `(·, j)`
    pub there: FixedBitSet,
}

impl LeafEvidence {
    fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            observed: BitMatrix::new(size),
            there: FixedBitSet::with_capacity(size),
        }
    }

    /// Leaf likelihood of the ancestral pair `(i, j)`.
    pub fn likelihood(&self, i: usize, j: usize) -> f64 {
        if !self.there.contains(j) {
            1.0
        } else if self.observed.get(i, j) {
            1.0
        } else {
            0.0
        }
    }
}

/// Adjacency evidence of all leaves, and the global compatibility matrix of
/// every pair seen in any leaf.
#[derive(Debug, Clone)]
pub struct Evidence {
    space: IndexSpace,
    compat: BitMatrix,
    leaves: FxHashMap<NodeId, LeafEvidence>,
}

impl Evidence {
    pub fn new(space: IndexSpace) -> Self {
        Self {
            space,
            compat: BitMatrix::new(space.size()),
            leaves: FxHashMap::default(),
        }
    }

    /// Collect the evidence of every leaf of the tree.
    ///
    /// `T` comes from the genome of `refspc`, which must be a leaf of the tree.
    /// Outgroup leaves read `<joins_dir>/<name>.joins` when `joins_dir` is
    /// given; all other leaves use their genome order.
    pub fn collect(
        tree: &Tree,
        refspc: &str,
        genomes: &BTreeMap<String, Genome>,
        joins_dir: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let ref_id = tree
            .get_node_by_name(refspc)
            .ok_or_else(|| anyhow!("Reference species {} is not in the tree", refspc))?;
        if tree.get_node(ref_id).map(|n| !n.is_leaf()).unwrap_or(true) {
            bail!("Reference species {} is not a leaf of the tree", refspc);
        }
        let ref_genome = genomes
            .get(refspc)
            .ok_or_else(|| anyhow!("No genome for the reference species {}", refspc))?;

        let space = IndexSpace::from_genome(ref_genome);
        if space.t() == 0 {
            bail!("The reference genome {} has no elements", refspc);
        }
        log::info!("T={}", space.t());

        let mut evidence = Self::new(space);
        for leaf in tree.get_leaves() {
            let node = tree
                .get_node(leaf)
                .ok_or_else(|| anyhow!("Node {} not found", leaf))?;
            let name = node.name_or_id();
            evidence.add_leaf(leaf, &name);

            match joins_dir {
                Some(dir) if node.outgroup => {
                    let file = dir.join(format!("{}.joins", name));
                    log::info!("Initializing {} (outgroup)", name);
                    let joins = read_joins(&file.to_string_lossy())?;
                    evidence.add_joins(leaf, &joins)?;
                }
                _ => {
                    log::info!("Initializing {} (ingroup)", name);
                    let genome = genomes
                        .get(&name)
                        .ok_or_else(|| anyhow!("No genome for the leaf {}", name))?;
                    evidence.add_genome(leaf, genome)?;
                }
            }
        }
        log::debug!("{} compatible pairs", evidence.compat.count());

        Ok(evidence)
    }

    pub fn space(&self) -> IndexSpace {
        self.space
    }

    pub fn add_leaf(&mut self, leaf: NodeId, name: &str) {
        let size = self.space.size();
        self.leaves
            .entry(leaf)
            .or_insert_with(|| LeafEvidence::new(name, size));
    }

    pub fn leaf(&self, leaf: NodeId) -> Option<&LeafEvidence> {
        self.leaves.get(&leaf)
    }

    /// Whether `(i, j)` was observed in any leaf.
    pub fn compatible(&self, i: usize, j: usize) -> bool {
        self.compat.get(i, j)
    }

    pub fn compat(&self) -> &BitMatrix {
        &self.compat
    }

    /// Record that `x` is immediately followed by `y` in a leaf, `0` being a
    /// chromosome end. Both the pair and its reverse-strand encoding are marked.
    pub fn add_adjacency(&mut self, leaf: NodeId, x: i32, y: i32) -> anyhow::Result<()> {
        if x == 0 && y == 0 {
            return Ok(());
        }
        let space = self.space;
        let evidence = self
            .leaves
            .get_mut(&leaf)
            .ok_or_else(|| anyhow!("Leaf {} has no evidence slot", leaf))?;

        let fold = |e: i32, left: bool| {
            let folded = if left {
                space.fold_left(e)
            } else {
                space.fold_right(e)
            };
            folded.ok_or_else(|| {
                anyhow!(
                    "Element {} of {} is outside the reference range 1..={}",
                    e,
                    evidence.name,
                    space.t()
                )
            })
        };

        let i = fold(x, true)?;
        let j = fold(y, false)?;
        let ri = fold(-y, true)?;
        let rj = fold(-x, false)?;

        for (a, b) in [(i, j), (ri, rj)] {
            self.compat.set(a, b);
            evidence.observed.set(a, b);
        }

        if i == space.lo() {
            evidence.there.insert(j);
        } else if j == space.hi() {
            evidence.there.insert(space.flip(i));
        } else {
            evidence.there.insert(j);
            evidence.there.insert(space.flip(i));
        }

        Ok(())
    }

    /// Every chromosome contributes `0 -> e0`, its consecutive pairs and `e_last -> 0`.
    pub fn add_genome(&mut self, leaf: NodeId, genome: &Genome) -> anyhow::Result<()> {
        for chrom in &genome.chromosomes {
            let elements = &chrom.elements;
            if elements.is_empty() {
                continue;
            }
            self.add_adjacency(leaf, 0, elements[0])?;
            for pair in elements.windows(2) {
                self.add_adjacency(leaf, pair[0], pair[1])?;
            }
            self.add_adjacency(leaf, elements[elements.len() - 1], 0)?;
        }

        Ok(())
    }

    pub fn add_joins(&mut self, leaf: NodeId, joins: &[(i32, i32)]) -> anyhow::Result<()> {
        for &(x, y) in joins {
            self.add_adjacency(leaf, x, y)?;
        }

        Ok(())
    }
}
