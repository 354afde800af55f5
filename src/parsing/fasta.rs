//! FASTA input through the noodles reader.
//!
//! Supports gzip/bgzip compressed files by extension. Records without any sequence
//! are still visited; callers decide whether to skip them.

use std::io::BufRead;
use std::path::Path;

use noodles::fasta;

use crate::parsing::reader::{open_text, ParseError};

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let stripped = path_str
        .strip_suffix(".gz")
        .or_else(|| path_str.strip_suffix(".bgz"))
        .unwrap_or(path_str.as_str());

    [".fa", ".fasta", ".fna", ".fas"]
        .iter()
        .any(|ext| stripped.ends_with(ext))
}

/// Open a FASTA file (plain or gzipped) with a noodles reader.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened.
pub fn open_fasta(path: &Path) -> Result<fasta::io::Reader<Box<dyn BufRead + Send>>, ParseError> {
    Ok(fasta::io::Reader::new(open_text(path)?))
}

/// Call `visit` with the name and sequence of every record in the file, in file order.
///
/// Returns the number of records visited.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened and `ParseError::Noodles`
/// if a record is malformed.
pub fn for_each_record<F>(path: &Path, visit: F) -> Result<u64, ParseError>
where
    F: FnMut(&[u8], &[u8]),
{
    let mut reader = open_fasta(path)?;
    visit_records(&mut reader, visit)
}

fn visit_records<R: BufRead, F>(
    reader: &mut fasta::io::Reader<R>,
    mut visit: F,
) -> Result<u64, ParseError>
where
    F: FnMut(&[u8], &[u8]),
{
    let mut nb_records = 0u64;

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
        let sequence: &[u8] = record.sequence().as_ref();
        visit(record.name(), sequence);
        nb_records += 1;
    }

    Ok(nb_records)
}
