//! All-pairs matrices and their on-disk forms.

pub mod assemble;
pub mod writer;

pub use assemble::{assemble, MatrixSet, SimilarityMatrix};
pub use writer::{Convention, MatrixError, MatrixFormat, MatrixWriter};
