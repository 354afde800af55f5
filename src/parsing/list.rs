use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::parsing::reader::{open_text, ParseError};

/// Parse a file listing one input path per line.
///
/// Surrounding whitespace is trimmed and blank lines are ignored.
///
/// # Errors
///
/// Returns `ParseError::Open` if the list cannot be opened, `ParseError::Io` on read
/// failure, or `ParseError::InvalidFormat` if it names no file.
pub fn parse_list_file(path: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let reader = open_text(path)?;
    let mut paths = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if !entry.is_empty() {
            paths.push(PathBuf::from(entry));
        }
    }

    if paths.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "no input files listed in {}",
            path.display()
        )));
    }

    Ok(paths)
}
