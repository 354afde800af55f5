use std::io::BufRead;
use std::ops::ControlFlow;
use std::path::Path;

use noodles::fastq;

use crate::parsing::reader::{open_text, ParseError};

/// Check if the path has a FASTQ extension
pub fn is_fastq_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let stripped = path_str
        .strip_suffix(".gz")
        .or_else(|| path_str.strip_suffix(".bgz"))
        .unwrap_or(path_str.as_str());

    stripped.ends_with(".fq") || stripped.ends_with(".fastq")
}

/// Open a FASTQ file (plain or gzipped) with a noodles reader.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened.
pub fn open_fastq(path: &Path) -> Result<fastq::io::Reader<Box<dyn BufRead + Send>>, ParseError> {
    Ok(fastq::io::Reader::new(open_text(path)?))
}

/// Call `visit` with the sequence of every read in the file, in file order, until it
/// returns `ControlFlow::Break`.
///
/// Returns the number of reads visited.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened and `ParseError::Noodles`
/// if a record is malformed.
pub fn for_each_read<F>(path: &Path, mut visit: F) -> Result<u64, ParseError>
where
    F: FnMut(&[u8]) -> ControlFlow<()>,
{
    let mut reader = open_fastq(path)?;
    let mut nb_reads = 0u64;

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTQ record: {e}")))?;
        nb_reads += 1;
        if visit(record.sequence()).is_break() {
            break;
        }
    }

    Ok(nb_reads)
}
