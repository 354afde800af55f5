//! Extraction orchestration: from input files to one [`GenomeSignature`] per genome.
//!
//! Two concurrency shapes are used:
//!
//! - **file-parallel** ([`pool`]): FASTA, BAM and persisted-core inputs, one worker per
//!   file, at most `threads` in flight;
//! - **work queue** ([`queue`], [`accumulator`]): a FASTQ read set, one reader feeding
//!   `threads` consumers that batch their labels into a shared accumulator.
//!
//! [`GenomeSignature`]: crate::core::signature::GenomeSignature

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::InputFormat;
use crate::parsing::reader::ParseError;
use crate::store::StoreError;

pub mod accumulator;
pub mod config;
pub mod extract;
pub mod pool;
pub mod queue;

pub use config::ExtractionConfig;
pub use extract::Extractor;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read {format} input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        format: InputFormat,
        #[source]
        source: ParseError,
    },

    #[error("failed to load persisted cores from {}: {source}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("a worker thread panicked")]
    WorkerPanicked,
}
