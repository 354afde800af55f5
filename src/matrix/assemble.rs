use serde::Serialize;
use tracing::debug;

use crate::core::signature::GenomeSignature;
use crate::core::types::{ComparisonMode, Metric};
use crate::similarity::{score, SimilarityError};

/// Square symmetric matrix with a unit diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// An `n`×`n` matrix with 1.0 on the diagonal and 0.0 elsewhere
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }
        Self { n, values }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Set the value of the pair `(i, j)` on both sides of the diagonal.
    pub fn set_pair(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.n + j] = value;
        self.values[j * self.n + i] = value;
    }

    #[cfg(test)]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.n..(i + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics
        self.values.chunks_exact(self.n.max(1))
    }
}

impl Serialize for SimilarityMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// One matrix per metric over the same genomes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixSet {
    pub names: Vec<String>,
    pub jaccard: SimilarityMatrix,
    pub dice: SimilarityMatrix,
    pub normalized_distance: SimilarityMatrix,
}

impl MatrixSet {
    pub fn get(&self, metric: Metric) -> &SimilarityMatrix {
        match metric {
            Metric::Jaccard => &self.jaccard,
            Metric::Dice => &self.dice,
            Metric::NormalizedDistance => &self.normalized_distance,
        }
    }
}

/// Score every unordered pair of genomes once and fill the three matrices.
///
/// # Errors
///
/// Returns `SimilarityError::UnsortedLabels` if any signature is corrupt.
pub fn assemble(
    signatures: &[GenomeSignature],
    mode: ComparisonMode,
) -> Result<MatrixSet, SimilarityError> {
    let n = signatures.len();
    let mut jaccard = SimilarityMatrix::identity(n);
    let mut dice = SimilarityMatrix::identity(n);
    let mut normalized_distance = SimilarityMatrix::identity(n);

    for i in 0..n {
        for j in (i + 1)..n {
            let pair = score(&signatures[i], &signatures[j], mode)?;
            debug!(
                "{} / {}: jaccard {:.6}, dice {:.6}, normalized {:.6}",
                signatures[i].name.trim_end(),
                signatures[j].name.trim_end(),
                pair.jaccard,
                pair.dice,
                pair.normalized_distance
            );
            jaccard.set_pair(i, j, pair.jaccard);
            dice.set_pair(i, j, pair.dice);
            normalized_distance.set_pair(i, j, pair.normalized_distance);
        }
    }

    Ok(MatrixSet {
        names: signatures.iter().map(|s| s.name.clone()).collect(),
        jaccard,
        dice,
        normalized_distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signatures() -> Vec<GenomeSignature> {
        vec![
            GenomeSignature::build("a", 4, vec![1, 1, 2, 3]),
            GenomeSignature::build("b", 4, vec![1, 2, 2, 4]),
            GenomeSignature::build("c", 3, vec![7, 8, 9]),
            GenomeSignature::build("empty", 0, Vec::new()),
        ]
    }

    #[test]
    fn test_diagonal_and_symmetry() {
        let set = assemble(&signatures(), ComparisonMode::Multiset).unwrap();
        for metric in Metric::ALL {
            let m = set.get(metric);
            assert_eq!(m.len(), 4);
            for i in 0..4 {
                assert_eq!(m.get(i, i), 1.0);
                for j in 0..4 {
                    assert_eq!(m.get(i, j), m.get(j, i));
                }
            }
        }
    }

    #[test]
    fn test_pair_values() {
        let set = assemble(&signatures(), ComparisonMode::Multiset).unwrap();
        assert!((set.jaccard.get(0, 1) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(set.jaccard.get(0, 2), 0.0);
        assert_eq!(set.dice.get(3, 2), 0.0);
        assert_eq!(set.names, vec!["a", "b", "c", "empty"]);
    }

    #[test]
    fn test_rows() {
        let mut m = SimilarityMatrix::identity(2);
        m.set_pair(0, 1, 0.25);
        let rows: Vec<&[f64]> = m.rows().collect();
        assert_eq!(rows, vec![&[1.0, 0.25][..], &[0.25, 1.0][..]]);
        assert_eq!(m.row(1), &[0.25, 1.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let set = assemble(&[], ComparisonMode::Set).unwrap();
        assert!(set.jaccard.is_empty());
        assert_eq!(set.jaccard.rows().count(), 0);
    }
}
