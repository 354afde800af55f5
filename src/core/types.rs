use serde::{Deserialize, Serialize};

/// Opaque label of one core, as produced by a [`crate::source::CoreSource`].
///
/// Only equality and ordering carry meaning.
pub type CoreLabel = u32;

/// How two genomes' core labels are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Presence/absence of each label
    Set,
    /// Label multiplicities weighted by their counts
    #[default]
    #[value(alias = "vector")]
    Multiset,
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Multiset => write!(f, "multiset"),
        }
    }
}

/// Kind of input a genome is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// FASTA, one genome per file, one unit per record
    Fasta,
    /// FASTQ read set, one unit per read plus its reverse complement
    Fastq,
    /// BAM alignments, one unit per record
    Bam,
    /// Core file written by a previous run
    PersistedCores,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fasta => write!(f, "FASTA"),
            Self::Fastq => write!(f, "FASTQ"),
            Self::Bam => write!(f, "BAM"),
            Self::PersistedCores => write!(f, "persisted cores"),
        }
    }
}

/// Which of the three pairwise metrics a matrix holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Jaccard,
    Dice,
    NormalizedDistance,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Jaccard, Metric::Dice, Metric::NormalizedDistance];

    /// Short tag used in output file names
    #[must_use]
    pub fn file_tag(self) -> &'static str {
        match self {
            Self::Jaccard => "jaccard",
            Self::Dice => "dice",
            Self::NormalizedDistance => "ns",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jaccard => write!(f, "Jaccard"),
            Self::Dice => write!(f, "Dice"),
            Self::NormalizedDistance => write!(f, "normalized distance"),
        }
    }
}
