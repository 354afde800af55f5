use serde::Serialize;
use thiserror::Error;

use crate::core::signature::GenomeSignature;
use crate::core::types::{ComparisonMode, CoreLabel};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimilarityError {
    #[error(
        "labels of genome '{genome}' are not strictly ascending at position {position} ({previous} then {found})"
    )]
    UnsortedLabels {
        genome: String,
        position: usize,
        previous: CoreLabel,
        found: CoreLabel,
    },
}

/// Convert a label count to f64 for ratio calculations
#[inline]
fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[inline]
fn wide_to_f64(value: u128) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        value as f64
    }
}

/// The three scores of one genome pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairwiseScore {
    pub jaccard: f64,
    pub dice: f64,
    pub normalized_distance: f64,
}

/// Walks the run-length arrays of two signatures in lockstep.
///
/// Every advance checks that the unique labels it steps over are strictly ascending.
struct MergeCursor<'a> {
    sig: &'a GenomeSignature,
    pos: usize,
}

impl<'a> MergeCursor<'a> {
    fn new(sig: &'a GenomeSignature) -> Self {
        Self { sig, pos: 0 }
    }

    fn peek(&self) -> Option<(CoreLabel, u64)> {
        let label = *self.sig.unique_labels().get(self.pos)?;
        Some((label, self.sig.counts()[self.pos]))
    }

    fn advance(&mut self) -> Result<(), SimilarityError> {
        self.pos += 1;
        let unique = self.sig.unique_labels();
        if self.pos < unique.len() && unique[self.pos] <= unique[self.pos - 1] {
            return Err(SimilarityError::UnsortedLabels {
                genome: self.sig.name.clone(),
                position: self.pos,
                previous: unique[self.pos - 1],
                found: unique[self.pos],
            });
        }
        Ok(())
    }
}

/// One step of the merge: a label present in the first, the second, or both signatures
enum Step {
    Left(u64),
    Right(u64),
    Both(u64, u64),
}

/// Merge-join the run-length forms of two signatures, feeding every step to `visit`.
fn merge<F>(sig1: &GenomeSignature, sig2: &GenomeSignature, mut visit: F) -> Result<(), SimilarityError>
where
    F: FnMut(Step),
{
    let mut left = MergeCursor::new(sig1);
    let mut right = MergeCursor::new(sig2);

    loop {
        match (left.peek(), right.peek()) {
            (Some((l, c1)), Some((r, c2))) => {
                if l < r {
                    visit(Step::Left(c1));
                    left.advance()?;
                } else if r < l {
                    visit(Step::Right(c2));
                    right.advance()?;
                } else {
                    visit(Step::Both(c1, c2));
                    left.advance()?;
                    right.advance()?;
                }
            }
            (Some((_, c1)), None) => {
                visit(Step::Left(c1));
                left.advance()?;
            }
            (None, Some((_, c2))) => {
                visit(Step::Right(c2));
                right.advance()?;
            }
            (None, None) => return Ok(()),
        }
    }
}

/// Intersection and union sizes of two signatures.
///
/// In set mode every distinct label counts once. In multiset mode a shared label
/// contributes the smaller count to the intersection and the larger to the union.
///
/// # Errors
///
/// Returns `SimilarityError::UnsortedLabels` if either signature's unique labels are
/// not strictly ascending.
pub fn intersection_union(
    sig1: &GenomeSignature,
    sig2: &GenomeSignature,
    mode: ComparisonMode,
) -> Result<(u64, u64), SimilarityError> {
    let mut inter = 0u64;
    let mut union = 0u64;

    merge(sig1, sig2, |step| match (mode, step) {
        (ComparisonMode::Set, Step::Both(..)) => {
            inter += 1;
            union += 1;
        }
        (ComparisonMode::Set, _) => union += 1,
        (ComparisonMode::Multiset, Step::Both(c1, c2)) => {
            inter += c1.min(c2);
            union += c1.max(c2);
        }
        (ComparisonMode::Multiset, Step::Left(c) | Step::Right(c)) => union += c,
    })?;

    Ok((inter, union))
}

/// Jaccard index: `inter / union`, 0 when the union is empty.
#[must_use]
pub fn jaccard(inter: u64, union: u64) -> f64 {
    if union == 0 {
        0.0
    } else {
        count_to_f64(inter) / count_to_f64(union)
    }
}

/// Dice coefficient: `2 * inter / (size1 + size2)`, 0 when both sizes are 0.
#[must_use]
pub fn dice(inter: u64, size1: u64, size2: u64) -> f64 {
    let total = size1 + size2;
    if total == 0 {
        0.0
    } else {
        2.0 * count_to_f64(inter) / count_to_f64(total)
    }
}

/// Depth-normalized similarity of two label multisets.
///
/// Each count is scaled by the other genome's depth so that inputs of different
/// sizes compare fairly. Identical multisets at equal depth give 1, disjoint ones 0.
///
/// # Errors
///
/// Returns `SimilarityError::UnsortedLabels` if either signature's unique labels are
/// not strictly ascending.
pub fn normalized_distance(
    sig1: &GenomeSignature,
    sig2: &GenomeSignature,
    depth1: u64,
    depth2: u64,
) -> Result<f64, SimilarityError> {
    let (d1, d2) = (u128::from(depth1), u128::from(depth2));
    let mut num = 0u128;
    let mut den = 0u128;

    merge(sig1, sig2, |step| match step {
        Step::Both(c1, c2) => {
            let a = u128::from(c1) * d2;
            let b = u128::from(c2) * d1;
            num += a.abs_diff(b);
            den += a + b;
        }
        Step::Left(c1) => {
            let a = u128::from(c1) * d2;
            num += a;
            den += a;
        }
        Step::Right(c2) => {
            let b = u128::from(c2) * d1;
            num += b;
            den += b;
        }
    })?;

    if den == 0 {
        Ok(0.0)
    } else {
        Ok(1.0 - wide_to_f64(num) / wide_to_f64(den))
    }
}

/// Compute Jaccard, Dice and normalized distance for one pair.
///
/// # Errors
///
/// Returns `SimilarityError::UnsortedLabels` if either signature is corrupt.
pub fn score(
    sig1: &GenomeSignature,
    sig2: &GenomeSignature,
    mode: ComparisonMode,
) -> Result<PairwiseScore, SimilarityError> {
    let (inter, union) = intersection_union(sig1, sig2, mode)?;
    Ok(PairwiseScore {
        jaccard: jaccard(inter, union),
        dice: dice(inter, sig1.size(mode), sig2.size(mode)),
        normalized_distance: normalized_distance(sig1, sig2, sig1.depth, sig2.depth)?,
    })
}
