//! Deterministic core source for tests: one label per base.

use std::io::{Read, Write};

use crate::core::types::CoreLabel;
use crate::source::{CoreSource, CoreUnit};

/// Labels each base by its byte value plus `1000 * level`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteCores {
    level: usize,
    bases: Vec<u8>,
    labels: Vec<CoreLabel>,
}

impl ByteCores {
    fn relabel(&mut self) {
        let offset = 1000 * self.level as u32;
        self.labels = self.bases.iter().map(|&b| u32::from(b) + offset).collect();
    }
}

impl CoreSource for ByteSource {
    type Unit = ByteCores;

    fn extract(&self, sequence: &[u8], level: usize) -> ByteCores {
        let mut unit = ByteCores {
            level,
            bases: sequence.to_vec(),
            labels: Vec::new(),
        };
        unit.relabel();
        unit
    }
}

impl CoreUnit for ByteCores {
    fn labels(&self) -> &[CoreLabel] {
        &self.labels
    }

    fn level(&self) -> usize {
        self.level
    }

    fn deepen(&mut self, level: usize) {
        self.level = level;
        self.relabel();
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&(self.level as u32).to_le_bytes())?;
        writer.write_all(&(self.bases.len() as u32).to_le_bytes())?;
        writer.write_all(&self.bases)
    }

    fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let level = u32::from_le_bytes(word) as usize;
        reader.read_exact(&mut word)?;
        let mut bases = vec![0u8; u32::from_le_bytes(word) as usize];
        reader.read_exact(&mut bases)?;
        let mut unit = ByteCores {
            level,
            bases,
            labels: Vec::new(),
        };
        unit.relabel();
        Ok(unit)
    }
}
