//! Reader for square PHYLIP-style distance matrices.
//!
//! ```text
//! 3
//! genome_a   0.000000000000000 0.250000000000000 0.500000000000000
//! genome_b   0.250000000000000 0.000000000000000 0.400000000000000
//! genome_c   0.500000000000000 0.400000000000000 0.000000000000000
//! ```
//!
//! The first line holds the number of taxa. Each following row starts with a label
//! field of [`SHORT_NAME_WIDTH`] characters, then one value per taxon.

use std::io::BufRead;
use std::path::Path;

use crate::parsing::reader::{open_text, ParseError};
use crate::utils::validation::SHORT_NAME_WIDTH;

/// Labels and rows of a square matrix
#[derive(Debug, Clone, PartialEq)]
pub struct PhylipMatrix {
    pub names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Read a PHYLIP-style square matrix from a file.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened or
/// `ParseError::InvalidFormat` if it is not a well-formed square matrix.
pub fn parse_phylip_file(path: &Path) -> Result<PhylipMatrix, ParseError> {
    parse_phylip(open_text(path)?)
}

/// Read a PHYLIP-style square matrix.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the count line, a label, or a value is
/// malformed, or if the number of rows or columns does not match the count.
pub fn parse_phylip<R: BufRead>(reader: R) -> Result<PhylipMatrix, ParseError> {
    let mut lines = reader.lines().filter(|line| match line {
        Ok(l) => !l.trim().is_empty(),
        Err(_) => true,
    });

    let count_line = lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("empty matrix file".to_string()))??;
    let n: usize = count_line.trim().parse().map_err(|_| {
        ParseError::InvalidFormat(format!("expected taxon count, found '{}'", count_line.trim()))
    })?;

    let mut names = Vec::with_capacity(n);
    let mut rows = Vec::with_capacity(n);

    for line in lines {
        let line = line?;
        let split = line
            .char_indices()
            .nth(SHORT_NAME_WIDTH)
            .map_or(line.len(), |(i, _)| i);
        let (label, values) = line.split_at(split);

        let row = values
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| ParseError::InvalidFormat(format!("invalid distance '{v}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if row.len() != n {
            return Err(ParseError::InvalidFormat(format!(
                "row '{}' has {} values, expected {n}",
                label.trim(),
                row.len()
            )));
        }

        names.push(label.trim().to_string());
        rows.push(row);
    }

    if rows.len() != n {
        return Err(ParseError::InvalidFormat(format!(
            "matrix declares {n} taxa but has {} rows",
            rows.len()
        )));
    }

    Ok(PhylipMatrix { names, rows })
}
