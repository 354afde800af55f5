use std::path::PathBuf;

use crate::core::types::InputFormat;

/// One genome to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    /// File holding the genome's sequences (or its persisted cores)
    pub path: PathBuf,

    /// How `path` is read
    pub format: InputFormat,

    /// Fixed-width display name used in matrix rows
    pub name: String,

    /// Where to persist the extracted cores, if requested
    pub cores_out: Option<PathBuf>,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>, format: InputFormat, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            format,
            name: name.into(),
            cores_out: None,
        }
    }

    #[must_use]
    pub fn with_cores_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.cores_out = Some(path.into());
        self
    }
}
