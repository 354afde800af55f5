//! Command-line interface for gencore.
//!
//! Available commands:
//!
//! - **fa**: compare genomes given as FASTA files
//! - **fq**: compare read sets given as FASTQ files
//! - **bam**: compare read sets given as BAM files
//! - **read**: compare genomes from core files saved by an earlier run
//! - **tree**: build a UPGMA tree from a written matrix
//!
//! ## Usage
//!
//! ```text
//! # Compare three assemblies, saving their cores
//! gencore fa ecoli.fa salmonella.fa bsub.fa -w ecoli.cores,salm.cores,bsub.cores -p run1
//!
//! # Re-use the saved cores at a deeper level, comparing label sets only
//! gencore read ecoli.cores salm.cores bsub.cores -l 5 -m set -p run2
//!
//! # Read sets listed in a file, 16 threads
//! gencore fq -c samples.txt -t 16
//!
//! # Tree from the Jaccard distances
//! gencore tree run1.jaccard.phy -o run1.newick
//! ```

use clap::{Parser, Subcommand};

pub mod extract;
pub mod tree;

#[derive(Parser)]
#[command(name = "gencore")]
#[command(version)]
#[command(about = "Compare genomes and read sets through their core labels")]
#[command(
    long_about = "gencore reduces each genome or read set to a multiset of core labels and compares every pair.\n\nFor N inputs it writes three N x N matrices:\n- Jaccard index\n- Dice coefficient\n- depth-normalized similarity"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare genomes given as FASTA files (plain or gzipped)
    Fa(extract::ExtractArgs),

    /// Compare read sets given as FASTQ files (plain or gzipped)
    Fq(extract::ExtractArgs),

    /// Compare read sets given as BAM files
    Bam(extract::ExtractArgs),

    /// Compare genomes from saved core files
    Read(extract::ExtractArgs),

    /// Build a UPGMA tree (Newick) from a PHYLIP-style matrix
    Tree(tree::TreeArgs),
}
