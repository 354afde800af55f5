//! Core data types shared by the pipeline.
//!
//! - [`GenomeSignature`]: the sorted labels of one genome and their run-length form
//! - [`InputSpec`]: one genome to process
//! - [`CoreLabel`], [`ComparisonMode`], [`InputFormat`], [`Metric`]: small shared types
//!
//! [`GenomeSignature`]: signature::GenomeSignature
//! [`InputSpec`]: input::InputSpec
//! [`CoreLabel`]: types::CoreLabel
//! [`ComparisonMode`]: types::ComparisonMode
//! [`InputFormat`]: types::InputFormat
//! [`Metric`]: types::Metric

pub mod input;
pub mod signature;
pub mod types;
