//! Subcommand modules for the `ancar` binary.

pub mod assemble;
pub mod infer;
