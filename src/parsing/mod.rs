//! Readers for the inputs of a comparison run.
//!
//! - **FASTA** ([`fasta`]): streamed record by record, plain or gzipped
//! - **FASTQ** ([`fastq`]): read sequences through `noodles`, plain or gzipped
//! - **BAM** ([`bam`]): alignment record sequences through `noodles`
//! - **Input lists** ([`list`]): one path per line
//! - **Matrices** ([`phylip`]): PHYLIP-style square matrices
//!
//! Compression is detected from the `.gz`/`.bgz` extension.

pub mod bam;
pub mod fasta;
pub mod fastq;
pub mod list;
pub mod phylip;
pub mod reader;
pub mod sequence;
