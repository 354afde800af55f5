//! Centralized validation and helper functions.

use std::collections::HashMap;
use std::path::Path;

/// Width of the label field in PHYLIP-style matrix rows
pub const SHORT_NAME_WIDTH: usize = 10;

/// Minimum number of genomes needed to build a matrix
pub const MIN_GENOMES: usize = 2;

/// Extensions stripped from file names when deriving a short name
const KNOWN_EXTENSIONS: &[&str] = &[
    ".gz", ".bgz", ".fa", ".fasta", ".fna", ".fas", ".fq", ".fastq", ".bam", ".cores",
];

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least {min} genomes are required, got {0}", min = MIN_GENOMES)]
    TooFewGenomes(usize),

    #[error("{what}: expected {expected} entries (one per input), got {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Empty name provided")]
    EmptyName,

    #[error("inputs {first} and {second} share the name '{name}'; set distinct names with -n")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },
}

/// Turn a free-form name into a fixed-width matrix label.
///
/// Whitespace becomes `_` so that the label stays a single token, the result is
/// truncated to [`SHORT_NAME_WIDTH`] characters and right-padded with spaces.
///
/// # Examples
///
/// ```
/// use gencore::utils::validation::display_name;
///
/// assert_eq!(display_name("E coli"), "E_coli    ");
/// assert_eq!(display_name("a_very_long_genome"), "a_very_lon");
/// ```
#[must_use]
pub fn display_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(SHORT_NAME_WIDTH)
        .collect();
    format!("{cleaned:<SHORT_NAME_WIDTH$}")
}

/// Derive a short name from an input path: the file name without its
/// sequence/compression extensions.
#[must_use]
pub fn short_name_from_path(path: &Path) -> String {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    loop {
        let lower = name.to_ascii_lowercase();
        let Some(ext) = KNOWN_EXTENSIONS.iter().find(|ext| lower.ends_with(*ext)) else {
            break;
        };
        if name.len() == ext.len() {
            break;
        }
        name.truncate(name.len() - ext.len());
    }

    name
}

/// Check that an optional per-input list has exactly one entry per input.
///
/// # Errors
///
/// Returns `ValidationError::CountMismatch` if the lengths differ.
pub fn check_count<T>(what: &'static str, entries: &[T], expected: usize) -> Result<(), ValidationError> {
    if entries.len() == expected {
        Ok(())
    } else {
        Err(ValidationError::CountMismatch {
            what,
            expected,
            found: entries.len(),
        })
    }
}

/// Check that enough genomes were given to build a matrix.
///
/// # Errors
///
/// Returns `ValidationError::TooFewGenomes` below [`MIN_GENOMES`].
pub fn check_genome_count(count: usize) -> Result<(), ValidationError> {
    if count < MIN_GENOMES {
        Err(ValidationError::TooFewGenomes(count))
    } else {
        Ok(())
    }
}

/// Validate a user-supplied short name.
///
/// # Errors
///
/// Returns `ValidationError::EmptyName` if the name is blank.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(display_name(name))
}

/// Check that no two matrix labels are the same once padded or truncated.
///
/// # Errors
///
/// Returns `ValidationError::DuplicateName` with the 1-based positions of the first
/// clashing pair.
pub fn check_unique_names(names: &[&str]) -> Result<(), ValidationError> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let label = name.trim_end();
        if let Some(&first) = seen.get(label) {
            return Err(ValidationError::DuplicateName {
                name: label.to_string(),
                first: first + 1,
                second: i + 1,
            });
        }
        seen.insert(label, i);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_unique_names() {
        assert!(check_unique_names(&["a   ", "b   "]).is_ok());
        assert_eq!(
            check_unique_names(&["a", "b", "a   "]),
            Err(ValidationError::DuplicateName {
                name: "a".to_string(),
                first: 1,
                second: 3
            })
        );
    }

    #[test]
    fn test_display_name_pads_and_truncates() {
        assert_eq!(display_name("ecoli"), "ecoli     ");
        assert_eq!(display_name("abcdefghijklm"), "abcdefghij");
        assert_eq!(display_name(" two words "), "two_words ");
        assert_eq!(display_name("ecoli").len(), SHORT_NAME_WIDTH);
    }

    #[test]
    fn test_short_name_from_path() {
        assert_eq!(short_name_from_path(Path::new("/data/ecoli.fa")), "ecoli");
        assert_eq!(short_name_from_path(Path::new("reads_1.fq.gz")), "reads_1");
        assert_eq!(short_name_from_path(Path::new("GCF_000005845.2.fna.bgz")), "GCF_000005845.2");
        assert_eq!(short_name_from_path(Path::new("sample.bam")), "sample");
        assert_eq!(short_name_from_path(Path::new("noext")), "noext");
        assert_eq!(short_name_from_path(Path::new(".fa")), ".fa");
    }

    #[test]
    fn test_check_count() {
        assert!(check_count("short names", &["a", "b"], 2).is_ok());
        assert_eq!(
            check_count("short names", &["a"], 2),
            Err(ValidationError::CountMismatch {
                what: "short names",
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_check_genome_count() {
        assert!(check_genome_count(2).is_ok());
        assert_eq!(check_genome_count(1), Err(ValidationError::TooFewGenomes(1)));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("x").unwrap(), "x         ");
        assert_eq!(validate_name("  "), Err(ValidationError::EmptyName));
    }
}
