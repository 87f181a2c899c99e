//! Error types for the sparse-inverse library
//!
//! This module provides the main error and result types used throughout the library.
//! All errors use the `thiserror` crate for automatic trait implementations.

use crate::io::SinvIoError;
use thiserror::Error;

/// Main result type used throughout the sparse-inverse library
pub type SinvResult<T> = Result<T, SinvError>;

/// Main error type for the sparse-inverse library
///
/// Every variant aborts the whole computation: there is no partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinvError {
    /// The input matrix is not square
    #[error("Matrix must be square, got {rows}x{cols}")]
    InvalidDimension { rows: usize, cols: usize },

    /// A dense matrix was supplied where a sparse one is required
    #[error("Matrix must be sparse: {0}")]
    NotSparseInput(String),

    /// The factorization hit a non-positive pivot (1-based internal column)
    #[error("Matrix is not positive definite (failed at column {minor})")]
    NotPositiveDefinite { minor: usize },

    /// Complex-valued storage is not supported
    #[error("Matrix is complex")]
    ComplexUnsupported,

    /// A permutation vector is not a bijection on 0..n
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Compressed column arrays violate the CSC invariants
    #[error("Invalid sparse structure: {0}")]
    InvalidStructure(String),

    /// A factor returned by a factor provider is not in packed LDL' form
    #[error("Malformed Cholesky factor: {0}")]
    MalformedFactor(String),

    /// Numeric factorization was given a matrix whose pattern differs from the analyzed one
    #[error("Sparsity pattern does not match the symbolic analysis")]
    SymbolicMismatch,

    /// The fill-reducing ordering could not be computed
    #[error("Ordering error: {0}")]
    Ordering(String),

    /// IO related errors (file loading, parsing, etc.)
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SinvError {
    fn from(err: std::io::Error) -> Self {
        SinvError::Io(err.to_string())
    }
}

impl From<SinvIoError> for SinvError {
    fn from(err: SinvIoError) -> Self {
        match err {
            SinvIoError::DenseFormat => {
                SinvError::NotSparseInput("Matrix Market array format is dense".to_string())
            }
            SinvIoError::ComplexField => SinvError::ComplexUnsupported,
            other => SinvError::Io(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_sinv_error_display() {
        let error = SinvError::NotPositiveDefinite { minor: 3 };
        assert_eq!(
            error.to_string(),
            "Matrix is not positive definite (failed at column 3)"
        );

        let error = SinvError::InvalidDimension { rows: 2, cols: 3 };
        assert_eq!(error.to_string(), "Matrix must be square, got 2x3");
    }

    #[test]
    fn test_sinv_error_from_io() {
        let io_error = Error::new(ErrorKind::NotFound, "File not found");
        let sinv_error = SinvError::from(io_error);

        match sinv_error {
            SinvError::Io(msg) => assert!(msg.contains("File not found")),
            _ => panic!("Expected IO error"),
        }
    }

    #[test]
    fn test_sinv_error_from_loader_keeps_reason() {
        assert!(matches!(
            SinvError::from(SinvIoError::DenseFormat),
            SinvError::NotSparseInput(_)
        ));
        assert_eq!(
            SinvError::from(SinvIoError::ComplexField),
            SinvError::ComplexUnsupported
        );
        assert!(matches!(
            SinvError::from(SinvIoError::InvalidHeader("%%Foo".to_string())),
            SinvError::Io(_)
        ));
    }

    #[test]
    fn test_sinv_result_err() {
        let result: SinvResult<i32> = Err(SinvError::SymbolicMismatch);
        assert!(result.is_err());
    }
}
