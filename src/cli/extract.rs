use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use tracing::{info, warn};

use crate::core::input::InputSpec;
use crate::core::types::{ComparisonMode, InputFormat};
use crate::matrix::{assemble, Convention, MatrixFormat, MatrixWriter};
use crate::parsing::fasta::is_fasta_file;
use crate::parsing::fastq::is_fastq_file;
use crate::parsing::list::parse_list_file;
use crate::pipeline::config::{DEFAULT_LEVEL, DEFAULT_THREADS};
use crate::pipeline::{ExtractionConfig, Extractor};
use crate::source::local_minimum::DEFAULT_KMER_SIZE;
use crate::source::LocalMinimumSource;
use crate::utils::validation::{
    check_count, check_genome_count, check_unique_names, display_name, short_name_from_path,
    validate_name,
};

#[derive(Args)]
pub struct ExtractArgs {
    /// Input files, one genome each
    #[arg(required_unless_present = "list")]
    pub inputs: Vec<PathBuf>,

    /// File listing the inputs, one path per line
    #[arg(short = 'c', long, conflicts_with = "inputs")]
    pub list: Option<PathBuf>,

    /// Number of worker threads
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_THREADS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub threads: usize,

    /// Core level to extract (or re-derive persisted cores) at
    #[arg(short, long, default_value_t = DEFAULT_LEVEL)]
    pub level: usize,

    /// Comma-separated core files to save, one per input
    #[arg(short = 'w', long = "write-cores", value_delimiter = ',')]
    pub write_cores: Vec<PathBuf>,

    /// Comma-separated short names, one per input (default: file names)
    #[arg(short = 'n', long, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Compare distinct labels only (set) or with their counts (vector/multiset)
    #[arg(short, long, value_enum, default_value_t)]
    pub mode: ComparisonMode,

    /// Prefix of the matrix files
    #[arg(short, long, default_value = "gencore")]
    pub prefix: String,

    /// Matrix file format
    #[arg(long, value_enum, default_value_t)]
    pub format: MatrixFormat,

    /// Write 1 - metric (distance) or the metric itself (similarity)
    #[arg(long, value_enum, default_value_t)]
    pub convention: Convention,

    /// K-mer length of the first core level (1-16)
    #[arg(short, long, default_value_t = DEFAULT_KMER_SIZE)]
    pub kmer_size: usize,
}

/// Extract cores from every input, compare all pairs and write the matrices.
///
/// # Errors
///
/// Returns an error on invalid arguments, an unreadable input, or when no matrix file
/// could be written.
pub fn run(args: ExtractArgs, format: InputFormat) -> anyhow::Result<()> {
    let specs = input_specs(&args, format)?;

    let config = ExtractionConfig::default()
        .with_threads(args.threads)
        .with_level(args.level);
    let source = LocalMinimumSource::new(args.kmer_size);
    info!(
        "Comparing {} {format} inputs in {} mode (k = {}, level {})",
        specs.len(),
        args.mode,
        source.kmer_size(),
        config.level
    );

    let signatures = Extractor::new(&source, config).run(&specs)?;
    for sig in &signatures {
        info!(
            "{}: {} cores, {} distinct, depth {}",
            sig.name.trim_end(),
            sig.len(),
            sig.unique_labels().len(),
            sig.depth
        );
    }

    let matrices = assemble(&signatures, args.mode)?;
    let writer = MatrixWriter::new(args.format, args.convention);
    let written = writer.write_all(&args.prefix, &matrices, args.mode);
    if written.is_empty() {
        bail!("no matrix file could be written with prefix '{}'", args.prefix);
    }

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Resolve the input list, names and core outputs into one spec per genome.
fn input_specs(args: &ExtractArgs, format: InputFormat) -> anyhow::Result<Vec<InputSpec>> {
    let paths = match &args.list {
        Some(list) => parse_list_file(list)
            .with_context(|| format!("Failed to read input list {}", list.display()))?,
        None => args.inputs.clone(),
    };
    check_genome_count(paths.len())?;

    if !args.names.is_empty() {
        check_count("short names (-n)", &args.names, paths.len())?;
    }
    if !args.write_cores.is_empty() {
        check_count("core outputs (-w)", &args.write_cores, paths.len())?;
    }

    let mut specs = Vec::with_capacity(paths.len());
    for (i, path) in paths.into_iter().enumerate() {
        let name = match args.names.get(i) {
            Some(name) => validate_name(name)?,
            None => display_name(&short_name_from_path(&path)),
        };
        if !has_expected_extension(&path, format) {
            warn!("{} does not look like a {format} file", path.display());
        }
        let mut spec = InputSpec::new(path, format, name);
        if let Some(out) = args.write_cores.get(i) {
            spec = spec.with_cores_out(out);
        }
        specs.push(spec);
    }

    let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    check_unique_names(&names)?;
    Ok(specs)
}

fn has_expected_extension(path: &Path, format: InputFormat) -> bool {
    match format {
        InputFormat::Fasta => is_fasta_file(path),
        InputFormat::Fastq => is_fastq_file(path),
        InputFormat::Bam => path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bam")),
        InputFormat::PersistedCores => true,
    }
}
