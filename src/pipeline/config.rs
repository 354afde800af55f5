use serde::{Deserialize, Serialize};

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 8;

/// Default core level
pub const DEFAULT_LEVEL: usize = 4;

/// Labels a worker gathers locally before merging them into the shared accumulator
pub const DEFAULT_FLUSH_THRESHOLD: usize = 200;

/// Reads the FASTQ reader may queue ahead of the workers
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Settings of one extraction run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Worker threads (files in flight, or FASTQ consumers)
    pub threads: usize,

    /// Level every unit is extracted at or deepened to
    pub level: usize,

    pub flush_threshold: usize,

    pub queue_capacity: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            level: DEFAULT_LEVEL,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ExtractionConfig {
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Thread count, never below one
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }
}
