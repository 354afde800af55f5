use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::core::input::InputSpec;
use crate::core::signature::GenomeSignature;
use crate::core::types::InputFormat;
use crate::parsing::sequence::reverse_complement;
use crate::parsing::{bam, fasta, fastq};
use crate::pipeline::accumulator::{Accumulator, Collected};
use crate::pipeline::config::ExtractionConfig;
use crate::pipeline::pool::run_bounded;
use crate::pipeline::queue::TaskQueue;
use crate::pipeline::PipelineError;
use crate::source::{CoreSource, CoreUnit};
use crate::store;

/// Drives a [`CoreSource`] over input files and builds one signature per genome.
pub struct Extractor<'s, S> {
    source: &'s S,
    config: ExtractionConfig,
}

impl<'s, S: CoreSource> Extractor<'s, S> {
    pub fn new(source: &'s S, config: ExtractionConfig) -> Self {
        Self { source, config }
    }

    /// Extract every input, returning signatures in input order.
    ///
    /// FASTA, BAM and persisted-core inputs are processed file-parallel. FASTQ inputs are
    /// processed one after another, each by the whole worker pool.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error met on a required input. Failing to persist cores
    /// is logged and does not fail the run.
    pub fn run(&self, inputs: &[InputSpec]) -> Result<Vec<GenomeSignature>, PipelineError> {
        let (read_sets, files): (Vec<usize>, Vec<usize>) =
            (0..inputs.len()).partition(|&i| inputs[i].format == InputFormat::Fastq);

        let mut signatures: Vec<Option<GenomeSignature>> = (0..inputs.len()).map(|_| None).collect();

        if !files.is_empty() {
            info!(
                "Extracting cores from {} files with {} threads at level {}",
                files.len(),
                self.config.worker_count(),
                self.config.level
            );
            let results = run_bounded(&files, self.config.worker_count(), |_, &i| {
                self.extract_file(&inputs[i])
            })?;
            for (&i, result) in files.iter().zip(results) {
                signatures[i] = Some(result?);
            }
        }

        for &i in &read_sets {
            signatures[i] = Some(self.extract_fastq(&inputs[i])?);
        }

        signatures
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(PipelineError::WorkerPanicked)
    }

    /// Extract one FASTA, BAM or persisted-core input on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn extract_file(&self, input: &InputSpec) -> Result<GenomeSignature, PipelineError> {
        let keep_units = input.cores_out.is_some();
        let level = self.config.level;
        let mut collected = Collected::new(keep_units);
        let mut depth = 0u64;

        match input.format {
            InputFormat::Fasta => {
                fasta::for_each_record(&input.path, |_, sequence| {
                    if sequence.is_empty() {
                        return;
                    }
                    depth += sequence.len() as u64;
                    collected.add(self.source.extract(sequence, level));
                })
                .map_err(|e| input_error(input, e))?;
            }
            InputFormat::Bam => {
                bam::for_each_sequence(&input.path, |sequence| {
                    depth += sequence.len() as u64;
                    collected.add(self.source.extract(sequence, level));
                })
                .map_err(|e| input_error(input, e))?;
            }
            InputFormat::PersistedCores => {
                let loaded = store::load::<S::Unit>(&input.path, level).map_err(|source| {
                    PipelineError::Store {
                        path: input.path.clone(),
                        source,
                    }
                })?;
                if let Some(stored) = stored_level_above(&loaded.units, level) {
                    warn!(
                        "{}: cores are stored at level {stored}, above the requested level {level}; using level {stored}",
                        input.path.display()
                    );
                }
                depth = loaded.depth;
                collected.labels = loaded.labels;
                if keep_units {
                    collected.units = loaded.units;
                }
            }
            InputFormat::Fastq => return self.extract_fastq(input),
        }

        debug!(
            "{}: {} labels over {depth} bases",
            input.path.display(),
            collected.labels.len()
        );
        Ok(self.finish(input, depth, collected))
    }

    /// Extract one FASTQ read set with a single reader and a pool of consumers.
    ///
    /// Each read contributes the cores of the read and of its reverse complement; only
    /// the read itself counts towards the depth.
    ///
    /// # Errors
    ///
    /// Returns an error if the read set cannot be decoded or a worker panicked.
    pub fn extract_fastq(&self, input: &InputSpec) -> Result<GenomeSignature, PipelineError> {
        let workers = self.config.worker_count();
        let level = self.config.level;
        let threshold = self.config.flush_threshold;
        let queue = TaskQueue::<Vec<u8>>::bounded(self.config.queue_capacity);
        let accumulator = Accumulator::<S::Unit>::new(input.cores_out.is_some());

        info!(
            "Extracting cores from read set {} with {workers} workers",
            input.path.display()
        );

        let produced = crossbeam_utils::thread::scope(|scope| {
            for _ in 0..workers {
                let consumer = queue.consumer();
                let accumulator = &accumulator;
                scope.spawn(move |_| {
                    let mut batch = accumulator.batch(threshold);
                    while let Some(read) = consumer.pop() {
                        batch.add(self.source.extract(&read, level));
                        batch.add(self.source.extract(&reverse_complement(&read), level));
                    }
                    batch.flush();
                });
            }

            let mut depth = 0u64;
            let mut abandoned = false;
            let result = fastq::for_each_read(&input.path, |read| {
                depth += read.len() as u64;
                if queue.push(read.to_vec()).is_err() {
                    // every consumer is gone
                    abandoned = true;
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            });
            queue.finish();
            result.map(|nb_reads| (nb_reads, depth, abandoned))
        })
        .map_err(|_| PipelineError::WorkerPanicked)?;

        let (nb_reads, depth, abandoned) = produced.map_err(|e| input_error(input, e))?;
        if abandoned {
            return Err(PipelineError::WorkerPanicked);
        }
        let collected = accumulator.into_inner();
        debug!(
            "{}: {nb_reads} reads, {} labels over {depth} bases",
            input.path.display(),
            collected.labels.len()
        );

        Ok(self.finish(input, depth, collected))
    }

    /// Persist the units if requested, then sort the labels into a signature.
    fn finish(
        &self,
        input: &InputSpec,
        depth: u64,
        collected: Collected<S::Unit>,
    ) -> GenomeSignature {
        if let Some(out) = &input.cores_out {
            persist_or_log(out, depth, &collected.units);
        }
        GenomeSignature::build(input.name.clone(), depth, collected.labels)
    }
}

/// Highest level among `units` if it lies above `requested`; such units cannot be
/// brought back down.
fn stored_level_above<U: CoreUnit>(units: &[U], requested: usize) -> Option<usize> {
    units
        .iter()
        .map(CoreUnit::level)
        .max()
        .filter(|&stored| stored > requested)
}

fn persist_or_log<U: CoreUnit>(path: &Path, depth: u64, units: &[U]) {
    if let Err(e) = store::persist(path, depth, units) {
        error!("Skipping core output {}: {e}", path.display());
    }
}

fn input_error(input: &InputSpec, source: crate::parsing::reader::ParseError) -> PipelineError {
    PipelineError::Input {
        path: input.path.clone(),
        format: input.format,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::stub::{ByteCores, ByteSource};
    use crate::store::LoadedCores;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_temp(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut temp = NamedTempFile::with_suffix(suffix).unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        temp
    }

    fn config(threads: usize) -> ExtractionConfig {
        ExtractionConfig {
            threads,
            level: 1,
            flush_threshold: 3,
            queue_capacity: 4,
        }
    }

    fn byte_labels(bases: &[u8]) -> Vec<u32> {
        let mut labels: Vec<u32> = bases.iter().map(|&b| u32::from(b) + 1000).collect();
        labels.sort_unstable();
        labels
    }

    #[test]
    fn test_fasta_includes_final_record() {
        let fa = write_temp(".fa", b">r1\nAC\nG\n>empty\n>r2\nTT");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(2));

        let sig = extractor
            .extract_file(&InputSpec::new(fa.path(), InputFormat::Fasta, "g"))
            .unwrap();
        assert_eq!(sig.depth, 5);
        assert_eq!(sig.labels(), byte_labels(b"ACGTT").as_slice());
    }

    #[test]
    fn test_bam_depth_counts_stored_bases() {
        let bam = NamedTempFile::with_suffix(".bam").unwrap();
        crate::parsing::bam::write_unmapped_bam(bam.path(), &[b"ACG", b"", b"TTA"]).unwrap();
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(2));

        let sig = extractor
            .extract_file(&InputSpec::new(bam.path(), InputFormat::Bam, "aln"))
            .unwrap();
        assert_eq!(sig.depth, 6);
        assert_eq!(sig.labels(), byte_labels(b"ACGTTA").as_slice());
    }

    #[test]
    fn test_fastq_adds_reverse_complements() {
        let fq = write_temp(".fq", b"@r1\nAATG\n+\nIIII\n@r2\nCC\n+\nII\n");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(3));

        let sig = extractor
            .extract_fastq(&InputSpec::new(fq.path(), InputFormat::Fastq, "reads"))
            .unwrap();
        assert_eq!(sig.depth, 6);
        assert_eq!(sig.labels(), byte_labels(b"AATGCATTCCGG").as_slice());
    }

    #[test]
    fn test_fastq_many_reads_drain() {
        let mut content = Vec::new();
        for i in 0..300 {
            writeln!(content, "@read{i}\nACGTA\n+\nIIIII").unwrap();
        }
        let fq = write_temp(".fastq", &content);
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(4));

        let sig = extractor
            .extract_fastq(&InputSpec::new(fq.path(), InputFormat::Fastq, "reads"))
            .unwrap();
        assert_eq!(sig.depth, 300 * 5);
        assert_eq!(sig.len(), 300 * 10);
    }

    /// Panics on every sequence
    struct FailingSource;

    impl CoreSource for FailingSource {
        type Unit = ByteCores;

        fn extract(&self, _sequence: &[u8], _level: usize) -> ByteCores {
            panic!("extraction failed");
        }
    }

    #[test]
    fn test_fastq_reports_failed_consumers() {
        let mut content = Vec::new();
        for i in 0..50 {
            writeln!(content, "@read{i}\nACGTA\n+\nIIIII").unwrap();
        }
        let fq = write_temp(".fq", &content);
        let source = FailingSource;
        let extractor = Extractor::new(&source, config(2));

        let err = extractor
            .extract_fastq(&InputSpec::new(fq.path(), InputFormat::Fastq, "reads"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::WorkerPanicked));
    }

    #[test]
    fn test_run_keeps_input_order() {
        let a = write_temp(".fa", b">a\nAAAA\n");
        let b = write_temp(".fq", b"@r\nCC\n+\nII\n");
        let c = write_temp(".fa", b">c\nGGG\n");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(2));

        let inputs = vec![
            InputSpec::new(a.path(), InputFormat::Fasta, "a"),
            InputSpec::new(b.path(), InputFormat::Fastq, "b"),
            InputSpec::new(c.path(), InputFormat::Fasta, "c"),
        ];
        let sigs = extractor.run(&inputs).unwrap();
        let names: Vec<&str> = sigs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(sigs[0].depth, 4);
        assert_eq!(sigs[1].depth, 2);
        assert_eq!(sigs[2].depth, 3);
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(2));
        let inputs = vec![InputSpec::new("/nonexistent/x.fa", InputFormat::Fasta, "x")];

        let err = extractor.run(&inputs).unwrap_err();
        assert!(matches!(err, PipelineError::Input { .. }));
    }

    #[test]
    fn test_persist_then_read_back() {
        let dir = TempDir::new().unwrap();
        let cores = dir.path().join("g.cores");
        let fa = write_temp(".fa", b">r1\nACG\n>r2\nTTAA\n");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(1));

        let input = InputSpec::new(fa.path(), InputFormat::Fasta, "g").with_cores_out(&cores);
        let from_fasta = extractor.extract_file(&input).unwrap();

        let loaded: LoadedCores<ByteCores> = store::load(&cores, 1).unwrap();
        assert_eq!(loaded.units.len(), 2);
        assert_eq!(loaded.depth, 7);

        let from_store = extractor
            .extract_file(&InputSpec::new(&cores, InputFormat::PersistedCores, "g"))
            .unwrap();
        assert_eq!(from_store, from_fasta);
    }

    #[test]
    fn test_persist_fastq_units() {
        let dir = TempDir::new().unwrap();
        let cores = dir.path().join("reads.cores");
        let fq = write_temp(".fq", b"@r1\nAC\n+\nII\n@r2\nGGT\n+\nIII\n");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(2));

        let input = InputSpec::new(fq.path(), InputFormat::Fastq, "r").with_cores_out(&cores);
        extractor.extract_fastq(&input).unwrap();

        let loaded: LoadedCores<ByteCores> = store::load(&cores, 1).unwrap();
        // every read and its reverse complement
        assert_eq!(loaded.units.len(), 4);
        assert_eq!(loaded.depth, 5);
    }

    #[test]
    fn test_reading_below_stored_level_keeps_stored_cores() {
        use crate::source::LocalMinimumSource;

        let dir = TempDir::new().unwrap();
        let cores = dir.path().join("g.cores");
        let source = LocalMinimumSource::new(4);
        let units = vec![source.extract(b"ACGTTGCAACGGTACCATGGACTTAGCA", 3)];
        store::persist(&cores, 28, &units).unwrap();
        assert_eq!(stored_level_above(&units, 1), Some(3));
        assert_eq!(stored_level_above(&units, 3), None);

        let extractor = Extractor::new(&source, config(1));
        let sig = extractor
            .extract_file(&InputSpec::new(&cores, InputFormat::PersistedCores, "g"))
            .unwrap();
        let mut expected = units[0].labels().to_vec();
        expected.sort_unstable();
        assert_eq!(sig.labels(), expected.as_slice());
    }

    #[test]
    fn test_unwritable_core_output_is_skipped() {
        let fa = write_temp(".fa", b">r1\nACGT\n");
        let source = ByteSource;
        let extractor = Extractor::new(&source, config(1));

        let input = InputSpec::new(fa.path(), InputFormat::Fasta, "g")
            .with_cores_out("/nonexistent/dir/g.cores");
        let sig = extractor.extract_file(&input).unwrap();
        assert_eq!(sig.len(), 4);
    }
}
