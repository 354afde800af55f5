//! Pairwise comparison of genome signatures.
//!
//! All comparisons are linear merges over the run-length forms of two signatures, so
//! both must hold strictly ascending unique labels. A signature found out of order is
//! reported as [`SimilarityError::UnsortedLabels`] rather than silently mis-scored.

pub mod metrics;

pub use metrics::{dice, intersection_union, jaccard, normalized_distance, score, PairwiseScore, SimilarityError};
