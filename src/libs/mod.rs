pub mod adjacency;
pub mod apcf;
pub mod genome;
pub mod io;
pub mod phylo;
