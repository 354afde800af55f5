//! Local-minimum cores.
//!
//! Level 1 labels every k-mer of the sequence (k ≤ 16, 2-bit packed, then mixed).
//! Windows containing a base other than A/C/G/T are skipped. Each further level keeps
//! only the strict local minima of the previous level and relabels each one from its
//! immediate neighbourhood, so labels get rarer and describe longer stretches as the
//! level grows.
//!
//! A unit only remembers its current labels, so it can be deepened to a higher level
//! but not back to a finer one.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::CoreLabel;
use crate::source::{CoreSource, CoreUnit};

/// Default k-mer length of level 1
pub const DEFAULT_KMER_SIZE: usize = 16;

/// Largest k that packs into a 32-bit label
pub const MAX_KMER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct LocalMinimumSource {
    kmer_size: usize,
}

impl LocalMinimumSource {
    /// Create a source with the given level-1 k-mer length, clamped to `1..=16`.
    #[must_use]
    pub fn new(kmer_size: usize) -> Self {
        Self {
            kmer_size: kmer_size.clamp(1, MAX_KMER_SIZE),
        }
    }

    pub fn kmer_size(&self) -> usize {
        self.kmer_size
    }
}

impl Default for LocalMinimumSource {
    fn default() -> Self {
        Self::new(DEFAULT_KMER_SIZE)
    }
}

impl CoreSource for LocalMinimumSource {
    type Unit = LocalMinimumCores;

    fn extract(&self, sequence: &[u8], level: usize) -> LocalMinimumCores {
        let mut unit = LocalMinimumCores {
            level: 1,
            labels: kmer_labels(sequence, self.kmer_size),
        };
        unit.deepen(level);
        unit
    }
}

/// Cores of one unit at a given level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMinimumCores {
    level: u32,
    labels: Vec<CoreLabel>,
}

impl CoreUnit for LocalMinimumCores {
    fn labels(&self) -> &[CoreLabel] {
        &self.labels
    }

    fn level(&self) -> usize {
        self.level as usize
    }

    fn deepen(&mut self, level: usize) {
        if level < self.level() {
            debug!(
                "cannot refine cores from level {} to {level}, keeping level {}",
                self.level, self.level
            );
            return;
        }
        while self.level() < level {
            self.labels = next_level(&self.labels);
            self.level += 1;
        }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        bincode::serialize_into(writer, self).map_err(into_io_error)
    }

    fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        bincode::deserialize_from(reader).map_err(into_io_error)
    }
}

fn into_io_error(err: bincode::Error) -> std::io::Error {
    match *err {
        bincode::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
    }
}

#[inline]
fn encode_base(base: u8) -> Option<u32> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Finalizer of murmur3, used to spread packed k-mers over the label space
#[inline]
fn mix(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

fn kmer_labels(sequence: &[u8], k: usize) -> Vec<CoreLabel> {
    if sequence.len() < k {
        return Vec::new();
    }
    let mask: u32 = if k == MAX_KMER_SIZE {
        u32::MAX
    } else {
        (1u32 << (2 * k)) - 1
    };

    let mut labels = Vec::with_capacity(sequence.len() + 1 - k);
    let mut packed = 0u32;
    let mut valid = 0usize;
    for &base in sequence {
        match encode_base(base) {
            Some(code) => {
                packed = ((packed << 2) | code) & mask;
                valid += 1;
                if valid >= k {
                    labels.push(mix(packed));
                }
            }
            None => {
                packed = 0;
                valid = 0;
            }
        }
    }
    labels
}

fn next_level(labels: &[CoreLabel]) -> Vec<CoreLabel> {
    labels
        .windows(3)
        .filter(|w| w[1] < w[0] && w[1] < w[2])
        .map(|w| mix(w[0].rotate_left(7) ^ w[1].wrapping_mul(0x9e37_79b9) ^ w[2].rotate_left(19)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_counts_kmers() {
        let source = LocalMinimumSource::new(4);
        let unit = source.extract(b"ACGTACGT", 1);
        assert_eq!(unit.level(), 1);
        assert_eq!(unit.labels().len(), 5);
        // ACGT occurs twice
        assert_eq!(unit.labels()[0], unit.labels()[4]);
    }

    #[test]
    fn test_non_acgt_breaks_windows() {
        let source = LocalMinimumSource::new(3);
        let unit = source.extract(b"ACGNACG", 1);
        assert_eq!(unit.labels().len(), 2);
        assert_eq!(unit.labels()[0], unit.labels()[1]);
    }

    #[test]
    fn test_case_insensitive() {
        let source = LocalMinimumSource::new(5);
        assert_eq!(
            source.extract(b"acgtacgtgg", 1).labels(),
            source.extract(b"ACGTACGTGG", 1).labels()
        );
    }

    #[test]
    fn test_short_sequence_has_no_cores() {
        let source = LocalMinimumSource::default();
        assert!(source.extract(b"ACGT", 3).labels().is_empty());
    }

    #[test]
    fn test_deepen_shrinks_and_matches_direct_extraction() {
        let source = LocalMinimumSource::new(6);
        let sequence = b"ACGTTGCAAGGCTTACCGATCGATCGGATCCTAGGCATGCAAATTTGGGCCCAGTCAGTAC";
        let direct = source.extract(sequence, 3);

        let mut deepened = source.extract(sequence, 1);
        let level_one = deepened.labels().len();
        deepened.deepen(3);

        assert_eq!(deepened, direct);
        assert!(deepened.labels().len() < level_one);
    }

    #[test]
    fn test_deepen_to_lower_level_is_noop() {
        let source = LocalMinimumSource::new(4);
        let mut unit = source.extract(b"ACGTTGCAAGGCTTACCGATCG", 2);
        let before = unit.clone();
        unit.deepen(1);
        assert_eq!(unit, before);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let source = LocalMinimumSource::new(4);
        let unit = source.extract(b"ACGTTGCAAGGCTTACCGATCG", 2);

        let mut bytes = Vec::new();
        unit.write_to(&mut bytes).unwrap();
        let back = LocalMinimumCores::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(back, unit);
    }

    #[test]
    fn test_read_from_truncated_fails() {
        let source = LocalMinimumSource::new(4);
        let unit = source.extract(b"ACGTTGCAAGGCTTACCGATCG", 1);
        let mut bytes = Vec::new();
        unit.write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 2);
        assert!(LocalMinimumCores::read_from(&mut bytes.as_slice()).is_err());
    }
}
