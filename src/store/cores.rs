use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::CoreLabel;
use crate::source::CoreUnit;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open core file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create core file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core file ends inside its header")]
    ShortHeader,

    #[error("core file is truncated: header announces {expected} units, only {found} could be read")]
    Truncated { expected: u64, found: u64 },

    #[error("failed to decode unit {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Fixed header of a core file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreFileHeader {
    /// Number of unit records following the header
    pub unit_count: u64,
    /// Total number of bases the units were extracted from
    pub depth: u64,
}

/// Cores read back from a core file
#[derive(Debug)]
pub struct LoadedCores<U> {
    pub depth: u64,
    pub units: Vec<U>,
    /// Labels of all units concatenated in load order (not sorted)
    pub labels: Vec<CoreLabel>,
}

/// Upper bound on the capacity reserved from an untrusted header
const MAX_PREALLOCATED_UNITS: u64 = 1 << 20;

/// Write a header followed by each unit's own encoding.
///
/// # Errors
///
/// Returns `StoreError::Io` if writing fails.
pub fn write_cores<U: CoreUnit, W: Write>(
    writer: &mut W,
    depth: u64,
    units: &[U],
) -> Result<(), StoreError> {
    writer.write_all(&(units.len() as u64).to_le_bytes())?;
    writer.write_all(&depth.to_le_bytes())?;
    for unit in units {
        unit.write_to(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Persist the cores of one genome to `path`.
///
/// # Errors
///
/// Returns `StoreError::Create` if the file cannot be created and `StoreError::Io`
/// if writing fails.
pub fn persist<U: CoreUnit>(path: &Path, depth: u64, units: &[U]) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|source| StoreError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saving {} core units to {}", units.len(), path.display());
    write_cores(&mut BufWriter::new(file), depth, units)
}

/// Read the fixed header of a core stream.
///
/// # Errors
///
/// Returns `StoreError::ShortHeader` if the stream ends inside the header.
pub fn read_header<R: Read>(reader: &mut R) -> Result<CoreFileHeader, StoreError> {
    let unit_count = read_word(reader)?;
    let depth = read_word(reader)?;
    Ok(CoreFileHeader { unit_count, depth })
}

fn read_word<R: Read>(reader: &mut R) -> Result<u64, StoreError> {
    let mut word = [0u8; 8];
    reader.read_exact(&mut word).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => StoreError::ShortHeader,
        _ => StoreError::Io(e),
    })?;
    Ok(u64::from_le_bytes(word))
}

/// Read a core stream, deepening every unit to `level`.
///
/// Exactly `unit_count` units are read; labels are concatenated in load order.
///
/// # Errors
///
/// Returns `StoreError::Truncated` if fewer units than announced are present and
/// `StoreError::Decode` if a unit cannot be decoded.
pub fn read_cores<U: CoreUnit, R: Read>(
    reader: &mut R,
    level: usize,
) -> Result<LoadedCores<U>, StoreError> {
    let header = read_header(reader)?;
    debug!(
        "core header: {} units, depth {}",
        header.unit_count, header.depth
    );

    let capacity = header.unit_count.min(MAX_PREALLOCATED_UNITS) as usize;
    let mut units = Vec::with_capacity(capacity);
    let mut labels = Vec::new();

    for index in 0..header.unit_count {
        let mut unit = U::read_from(reader).map_err(|source| {
            if source.kind() == std::io::ErrorKind::UnexpectedEof {
                StoreError::Truncated {
                    expected: header.unit_count,
                    found: index,
                }
            } else {
                StoreError::Decode { index, source }
            }
        })?;
        unit.deepen(level);
        labels.extend_from_slice(unit.labels());
        units.push(unit);
    }

    Ok(LoadedCores {
        depth: header.depth,
        units,
        labels,
    })
}

/// Load the cores persisted at `path`, deepening every unit to `level`.
///
/// # Errors
///
/// Returns `StoreError::Open` if the file cannot be opened, plus any error of
/// [`read_cores`].
pub fn load<U: CoreUnit>(path: &Path, level: usize) -> Result<LoadedCores<U>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_cores(&mut BufReader::new(file), level)
}
