//! Phylogeny from a distance matrix: UPGMA clustering rendered as Newick.

pub mod upgma;

pub use upgma::{upgma, Tree, TreeError};
