//! Ancestral adjacency inference.
//!
//! Leaf genomes are turned into adjacencies over a canonical index space of
//! element ends. A Jukes-Cantor style model over `2T - 1` end states then
//! propagates them up the tree to the ancestral root, giving the probability
//! that two ends were adjacent in the ancestor.

pub mod bitmatrix;
pub mod engine;
pub mod evidence;
pub mod index;
pub mod table;

pub use bitmatrix::BitMatrix;
pub use engine::{format_sci, Inference};
pub use evidence::{Evidence, LeafEvidence};
pub use index::{IndexSpace, LO};
pub use table::SparseTable;
