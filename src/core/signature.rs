use crate::core::types::{ComparisonMode, CoreLabel};

/// The durable form of a processed genome.
///
/// Holds the sorted flat label list together with its run-length form: strictly
/// ascending unique labels and, in parallel, how many times each occurs. The counts
/// always sum to the length of the flat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSignature {
    /// Display name of the genome
    pub name: String,

    /// Total number of processed bases
    pub depth: u64,

    labels: Vec<CoreLabel>,
    unique: Vec<CoreLabel>,
    counts: Vec<u64>,
}

impl GenomeSignature {
    /// Sort `labels` and build the run-length form.
    #[must_use]
    pub fn build(name: impl Into<String>, depth: u64, mut labels: Vec<CoreLabel>) -> Self {
        labels.sort_unstable();
        let (unique, counts) = run_length(&labels);
        Self {
            name: name.into(),
            depth,
            labels,
            unique,
            counts,
        }
    }

    /// Assemble a signature from parts without any ordering check
    #[cfg(test)]
    pub(crate) fn from_parts_unchecked(
        name: &str,
        depth: u64,
        unique: Vec<CoreLabel>,
        counts: Vec<u64>,
    ) -> Self {
        let mut sig = Self {
            name: name.to_string(),
            depth,
            labels: Vec::new(),
            unique,
            counts,
        };
        sig.labels = sig.expand();
        sig
    }

    /// Sorted flat labels
    pub fn labels(&self) -> &[CoreLabel] {
        &self.labels
    }

    /// Strictly ascending distinct labels
    pub fn unique_labels(&self) -> &[CoreLabel] {
        &self.unique
    }

    /// Occurrence count of each entry of [`Self::unique_labels`]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of elements under the given comparison mode
    #[must_use]
    pub fn size(&self, mode: ComparisonMode) -> u64 {
        match mode {
            ComparisonMode::Set => self.unique.len() as u64,
            ComparisonMode::Multiset => self.counts.iter().sum(),
        }
    }

    /// Re-expand the run-length form into a flat sorted list
    #[must_use]
    pub fn expand(&self) -> Vec<CoreLabel> {
        let mut flat = Vec::with_capacity(self.labels.len());
        for (&label, &count) in self.unique.iter().zip(&self.counts) {
            flat.extend(std::iter::repeat(label).take(count as usize));
        }
        flat
    }
}

/// Collapse a sorted label list into (unique labels, counts).
#[must_use]
pub fn run_length(sorted: &[CoreLabel]) -> (Vec<CoreLabel>, Vec<u64>) {
    let Some((&first, rest)) = sorted.split_first() else {
        return (Vec::new(), Vec::new());
    };

    let distinct = 1 + sorted.windows(2).filter(|w| w[0] != w[1]).count();
    let mut unique = Vec::with_capacity(distinct);
    let mut counts = Vec::with_capacity(distinct);

    unique.push(first);
    let mut count = 1u64;
    for &label in rest {
        if Some(&label) == unique.last() {
            count += 1;
        } else {
            counts.push(count);
            unique.push(label);
            count = 1;
        }
    }
    counts.push(count);

    (unique, counts)
}
