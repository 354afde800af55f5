//! The core label source: turns one sequence into an ordered list of core labels.
//!
//! The comparison pipeline never looks inside a core; it only needs the labels, the
//! ability to re-derive them at another level ("deepen"), and a self-describing byte
//! form so extracted units can be persisted and reloaded. Those needs are captured by
//! [`CoreSource`] and [`CoreUnit`], which the orchestrator takes as an injected
//! capability.
//!
//! [`LocalMinimumSource`] is the implementation shipped with the binary.

use std::io::{Read, Write};

use crate::core::types::CoreLabel;

pub mod local_minimum;

#[cfg(test)]
pub(crate) mod stub;

pub use local_minimum::{LocalMinimumCores, LocalMinimumSource};

/// The cores extracted from one genome unit (a record, a read, an alignment).
pub trait CoreUnit: Sized + Send {
    /// Labels of the unit's cores, in sequence order
    fn labels(&self) -> &[CoreLabel];

    /// Level the labels currently describe
    fn level(&self) -> usize;

    /// Re-derive the labels at `level`.
    fn deepen(&mut self, level: usize);

    /// Write the unit in a form [`CoreUnit::read_from`] can decode on its own.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer or the encoder.
    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    /// Read back one unit written by [`CoreUnit::write_to`].
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the bytes do not decode.
    fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self>;
}

/// Extracts cores from raw nucleotide sequences.
pub trait CoreSource: Send + Sync {
    type Unit: CoreUnit;

    /// Extract the cores of `sequence` at `level`.
    fn extract(&self, sequence: &[u8], level: usize) -> Self::Unit;
}
