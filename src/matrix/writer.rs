//! Rendering of matrix sets to files.
//!
//! PHYLIP-style output (one file per metric):
//!
//! ```text
//! 3
//! ecoli      0.000000000000000 0.612903225806452 0.903225806451613
//! salmonella 0.612903225806452 0.000000000000000 0.880000000000000
//! bsubtilis  0.903225806451613 0.880000000000000 0.000000000000000
//! ```
//!
//! CSV output holds the same values without the count line or the name column. JSON
//! output is a single document holding all three matrices.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::core::types::{ComparisonMode, Metric};
use crate::matrix::assemble::{MatrixSet, SimilarityMatrix};
use crate::utils::validation::display_name;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("cannot create matrix file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File layout of written matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatrixFormat {
    /// Count line, then one named row per genome
    #[default]
    Phylip,
    /// Comma-separated values, no names
    Csv,
    /// One JSON document with all metrics
    Json,
}

impl MatrixFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Phylip => "phy",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Whether written values are the metric itself or its complement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// Emit `1 - metric`
    #[default]
    Distance,
    /// Emit the metric
    Similarity,
}

impl Convention {
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Distance => 1.0 - value,
            Self::Similarity => value,
        }
    }
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

/// Write one matrix as PHYLIP-style text.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write_phylip<W: Write>(
    writer: &mut W,
    names: &[String],
    matrix: &SimilarityMatrix,
    convention: Convention,
) -> std::io::Result<()> {
    writeln!(writer, "{}", matrix.len())?;
    for (name, row) in names.iter().zip(matrix.rows()) {
        write!(writer, "{}", display_name(name))?;
        for &value in row {
            write!(writer, " {:.15}", convention.apply(value))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write one matrix as comma-separated values.
///
/// # Errors
///
/// Returns any error raised by the writer.
pub fn write_csv<W: Write>(
    writer: &mut W,
    matrix: &SimilarityMatrix,
    convention: Convention,
) -> std::io::Result<()> {
    for row in matrix.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|&v| format!("{:.15}", convention.apply(v)))
            .collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct MatrixDocument<'a> {
    created_at: String,
    mode: ComparisonMode,
    convention: Convention,
    names: Vec<&'a str>,
    jaccard: Vec<Vec<f64>>,
    dice: Vec<Vec<f64>>,
    normalized_distance: Vec<Vec<f64>>,
}

/// Write all three matrices as one JSON document.
///
/// # Errors
///
/// Returns `MatrixError::Json` if serialization or writing fails.
pub fn write_json<W: Write>(
    writer: W,
    set: &MatrixSet,
    mode: ComparisonMode,
    convention: Convention,
) -> Result<(), MatrixError> {
    let convert = |m: &SimilarityMatrix| -> Vec<Vec<f64>> {
        m.rows()
            .map(|row| row.iter().map(|&v| convention.apply(v)).collect())
            .collect()
    };

    let document = MatrixDocument {
        created_at: chrono::Utc::now().to_rfc3339(),
        mode,
        convention,
        names: set.names.iter().map(|n| n.trim()).collect(),
        jaccard: convert(&set.jaccard),
        dice: convert(&set.dice),
        normalized_distance: convert(&set.normalized_distance),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Writes a matrix set under a common file prefix
#[derive(Debug, Clone, Copy)]
pub struct MatrixWriter {
    pub format: MatrixFormat,
    pub convention: Convention,
}

impl MatrixWriter {
    #[must_use]
    pub fn new(format: MatrixFormat, convention: Convention) -> Self {
        Self { format, convention }
    }

    /// `<prefix>.<metric>.<ext>`, or `<prefix>.json` for the JSON document
    #[must_use]
    pub fn output_path(&self, prefix: &str, metric: Option<Metric>) -> PathBuf {
        match metric {
            Some(metric) => PathBuf::from(format!(
                "{prefix}.{}.{}",
                metric.file_tag(),
                self.format.extension()
            )),
            None => PathBuf::from(format!("{prefix}.{}", self.format.extension())),
        }
    }

    /// Write every output file for `set`, returning the paths that were written.
    ///
    /// A file that cannot be written is logged and skipped.
    pub fn write_all(&self, prefix: &str, set: &MatrixSet, mode: ComparisonMode) -> Vec<PathBuf> {
        let mut written = Vec::new();

        if self.format == MatrixFormat::Json {
            let path = self.output_path(prefix, None);
            match self.write_document(&path, set, mode) {
                Ok(()) => written.push(path),
                Err(e) => error!("Skipping {}: {e}", path.display()),
            }
            return written;
        }

        for metric in Metric::ALL {
            let path = self.output_path(prefix, Some(metric));
            match self.write_metric(&path, set, metric) {
                Ok(()) => {
                    info!("Wrote {metric} matrix to {}", path.display());
                    written.push(path);
                }
                Err(e) => error!("Skipping {metric} matrix: {e}"),
            }
        }
        written
    }

    fn write_metric(&self, path: &Path, set: &MatrixSet, metric: Metric) -> Result<(), MatrixError> {
        let mut writer = create(path)?;
        let matrix = set.get(metric);
        match self.format {
            MatrixFormat::Csv => write_csv(&mut writer, matrix, self.convention)?,
            _ => write_phylip(&mut writer, &set.names, matrix, self.convention)?,
        }
        writer.flush()?;
        Ok(())
    }

    fn write_document(&self, path: &Path, set: &MatrixSet, mode: ComparisonMode) -> Result<(), MatrixError> {
        let mut writer = create(path)?;
        write_json(&mut writer, set, mode, self.convention)?;
        writer.flush()?;
        info!("Wrote matrices to {}", path.display());
        Ok(())
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, MatrixError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| MatrixError::Create {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signature::GenomeSignature;
    use crate::matrix::assemble::assemble;
    use tempfile::TempDir;

    fn matrix_set() -> MatrixSet {
        let sigs = vec![
            GenomeSignature::build("alpha", 4, vec![1, 1, 2, 3]),
            GenomeSignature::build("beta", 4, vec![1, 2, 2, 4]),
        ];
        assemble(&sigs, ComparisonMode::Multiset).unwrap()
    }

    #[test]
    fn test_phylip_distance_layout() {
        let set = matrix_set();
        let mut out = Vec::new();
        write_phylip(&mut out, &set.names, &set.jaccard, Convention::Distance).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], "alpha      0.000000000000000 0.666666666666667");
        assert_eq!(lines[2], "beta       0.666666666666667 0.000000000000000");
    }

    #[test]
    fn test_phylip_similarity_keeps_unit_diagonal() {
        let set = matrix_set();
        let mut out = Vec::new();
        write_phylip(&mut out, &set.names, &set.jaccard, Convention::Similarity).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("1.000000000000000 0.333333333333333"));
    }

    #[test]
    fn test_phylip_output_reads_back() {
        let set = matrix_set();
        let mut out = Vec::new();
        write_phylip(&mut out, &set.names, &set.dice, Convention::Distance).unwrap();

        let parsed = crate::parsing::phylip::parse_phylip(out.as_slice()).unwrap();
        assert_eq!(parsed.names, vec!["alpha", "beta"]);
        assert!((parsed.rows[0][1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_csv_has_no_names() {
        let set = matrix_set();
        let mut out = Vec::new();
        write_csv(&mut out, &set.jaccard, Convention::Similarity).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "1.000000000000000,0.333333333333333\n0.333333333333333,1.000000000000000\n"
        );
    }

    #[test]
    fn test_json_document() {
        let set = matrix_set();
        let mut out = Vec::new();
        write_json(&mut out, &set, ComparisonMode::Set, Convention::Similarity).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["mode"], "set");
        assert_eq!(doc["convention"], "similarity");
        assert_eq!(doc["names"][1], "beta");
        assert_eq!(doc["jaccard"][0][0], 1.0);
        assert!(doc["created_at"].is_string());
    }

    #[test]
    fn test_write_all_names_files_by_metric() {
        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().to_string();
        let writer = MatrixWriter::new(MatrixFormat::Phylip, Convention::Distance);

        let written = writer.write_all(&prefix, &matrix_set(), ComparisonMode::Multiset);
        assert_eq!(written.len(), 3);
        for tag in ["jaccard", "dice", "ns"] {
            assert!(dir.path().join(format!("run.{tag}.phy")).exists());
        }
    }

    #[test]
    fn test_write_all_skips_unwritable_files() {
        let writer = MatrixWriter::new(MatrixFormat::Csv, Convention::Distance);
        let written = writer.write_all("/nonexistent/dir/run", &matrix_set(), ComparisonMode::Multiset);
        assert!(written.is_empty());
    }

    #[test]
    fn test_json_writes_single_file() {
        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("run").to_string_lossy().to_string();
        let writer = MatrixWriter::new(MatrixFormat::Json, Convention::Similarity);

        let written = writer.write_all(&prefix, &matrix_set(), ComparisonMode::Multiset);
        assert_eq!(written, vec![dir.path().join("run.json")]);
    }
}
