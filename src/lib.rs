//! # gencore
//!
//! Whole-genome comparison through core labels.
//!
//! Each genome (an assembly, a read set, or a BAM file) is reduced to a multiset of
//! integer "core" labels by a [`CoreSource`]. The sorted labels of two genomes are then
//! merged to score their similarity, and all pairs of a run are gathered into
//! matrices that downstream phylogeny tools can read.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gencore::{assemble, ComparisonMode, ExtractionConfig, Extractor, InputFormat, InputSpec};
//! use gencore::source::LocalMinimumSource;
//!
//! let inputs = vec![
//!     InputSpec::new("ecoli.fa", InputFormat::Fasta, "ecoli"),
//!     InputSpec::new("salmonella.fa", InputFormat::Fasta, "salmonella"),
//! ];
//!
//! let source = LocalMinimumSource::default();
//! let signatures = Extractor::new(&source, ExtractionConfig::default())
//!     .run(&inputs)
//!     .unwrap();
//!
//! let matrices = assemble(&signatures, ComparisonMode::Multiset).unwrap();
//! println!("jaccard: {:.4}", matrices.jaccard.get(0, 1));
//! ```
//!
//! ## Modules
//!
//! - [`source`]: the core label source capability and its local-minimum implementation
//! - [`pipeline`]: file-parallel and work-queue extraction
//! - [`store`]: persisted core files
//! - [`core`]: signatures and shared types
//! - [`similarity`]: Jaccard, Dice and depth-normalized scores
//! - [`matrix`]: all-pairs matrices and their writers
//! - [`tree`]: UPGMA trees from distance matrices
//! - [`parsing`]: FASTA, FASTQ, BAM, list and matrix readers
//! - [`cli`]: command-line interface implementation

pub mod cli;
pub mod core;
pub mod matrix;
pub mod parsing;
pub mod pipeline;
pub mod similarity;
pub mod source;
pub mod store;
pub mod tree;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::input::InputSpec;
pub use crate::core::signature::GenomeSignature;
pub use crate::core::types::*;
pub use matrix::{assemble, MatrixSet, SimilarityMatrix};
pub use pipeline::{ExtractionConfig, Extractor};
pub use similarity::PairwiseScore;
pub use source::{CoreSource, CoreUnit};
