//! Persistence of extracted cores.
//!
//! A core file is a little-endian `u64` unit count, a little-endian `u64` depth, and
//! then each unit in the encoding of its [`crate::source::CoreUnit`] implementation.

pub mod cores;

pub use cores::{load, persist, read_cores, read_header, write_cores, CoreFileHeader, LoadedCores, StoreError};
