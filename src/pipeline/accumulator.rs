//! Shared result buffer for workers that extract cores of one genome together.
//!
//! Each worker fills a [`LocalBatch`] and merges it into the [`Accumulator`] under its
//! lock only once the batch holds `threshold` labels, so the lock is taken once per
//! batch rather than once per unit.

use parking_lot::Mutex;

use crate::core::types::CoreLabel;
use crate::source::CoreUnit;

/// Labels (and optionally the units that produced them) of one genome
#[derive(Debug)]
pub struct Collected<U> {
    pub labels: Vec<CoreLabel>,
    pub units: Vec<U>,
    keep_units: bool,
}

impl<U: CoreUnit> Collected<U> {
    #[must_use]
    pub fn new(keep_units: bool) -> Self {
        Self {
            labels: Vec::new(),
            units: Vec::new(),
            keep_units,
        }
    }

    pub fn add(&mut self, unit: U) {
        self.labels.extend_from_slice(unit.labels());
        if self.keep_units {
            self.units.push(unit);
        }
    }

    fn append(&mut self, other: &mut Self) {
        self.labels.append(&mut other.labels);
        self.units.append(&mut other.units);
    }

    fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.units.is_empty()
    }
}

#[derive(Debug)]
pub struct Accumulator<U> {
    inner: Mutex<Collected<U>>,
}

impl<U: CoreUnit> Accumulator<U> {
    #[must_use]
    pub fn new(keep_units: bool) -> Self {
        Self {
            inner: Mutex::new(Collected::new(keep_units)),
        }
    }

    /// Start a worker-local batch that flushes into this accumulator.
    pub fn batch(&self, threshold: usize) -> LocalBatch<'_, U> {
        let keep_units = self.inner.lock().keep_units;
        LocalBatch {
            target: self,
            local: Collected::new(keep_units),
            threshold: threshold.max(1),
        }
    }

    /// Number of labels merged so far
    #[cfg(test)]
    pub fn label_count(&self) -> usize {
        self.inner.lock().labels.len()
    }

    /// Take the collected data back once every worker has been joined.
    pub fn into_inner(self) -> Collected<U> {
        self.inner.into_inner()
    }
}

/// A worker's private buffer; remaining content is flushed when dropped.
pub struct LocalBatch<'a, U: CoreUnit> {
    target: &'a Accumulator<U>,
    local: Collected<U>,
    threshold: usize,
}

impl<U: CoreUnit> LocalBatch<'_, U> {
    pub fn add(&mut self, unit: U) {
        self.local.add(unit);
        if self.local.labels.len() >= self.threshold {
            self.flush();
        }
    }

    /// Merge everything gathered so far into the shared accumulator.
    pub fn flush(&mut self) {
        if self.local.is_empty() {
            return;
        }
        self.target.inner.lock().append(&mut self.local);
    }
}

impl<U: CoreUnit> Drop for LocalBatch<'_, U> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::stub::ByteSource;
    use crate::source::CoreSource;

    #[test]
    fn test_batch_flushes_at_threshold() {
        let accumulator = Accumulator::new(false);
        let source = ByteSource;
        let mut batch = accumulator.batch(4);

        batch.add(source.extract(b"AC", 1));
        assert_eq!(accumulator.label_count(), 0);
        batch.add(source.extract(b"GT", 1));
        assert_eq!(accumulator.label_count(), 4);
        batch.add(source.extract(b"A", 1));
        assert_eq!(accumulator.label_count(), 4);

        drop(batch);
        assert_eq!(accumulator.label_count(), 5);
    }

    #[test]
    fn test_units_kept_only_on_request() {
        let source = ByteSource;

        let accumulator = Accumulator::new(true);
        accumulator.batch(100).add(source.extract(b"ACG", 1));
        let collected = accumulator.into_inner();
        assert_eq!(collected.units.len(), 1);
        assert_eq!(collected.labels.len(), 3);

        let accumulator = Accumulator::new(false);
        accumulator.batch(100).add(source.extract(b"ACG", 1));
        assert!(accumulator.into_inner().units.is_empty());
    }

    #[test]
    fn test_concurrent_batches() {
        let accumulator = Accumulator::new(false);
        let source = ByteSource;

        crossbeam_utils::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|_| {
                    let mut batch = accumulator.batch(7);
                    for _ in 0..50 {
                        batch.add(source.extract(b"ACGT", 1));
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(accumulator.into_inner().labels.len(), 4 * 50 * 4);
    }
}
