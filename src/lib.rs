//! Sparse inverse of symmetric positive definite matrices.
//!
//! Given a sparse SPD matrix `A`, [`sinv`] returns the entries of `A^{-1}` at
//! every position of its Cholesky factor (fill-in included), without ever
//! forming the dense inverse. The typical use is reading marginal variances
//! and covariances off a sparse precision matrix.
//!
//! ```
//! use sparse_inverse::{CscMatrix, sinv};
//!
//! let a = CscMatrix::from_diagonal(&[2.0, 4.0]);
//! let inverse = sinv(&a)?;
//! assert_eq!(inverse.marginal_variances(), vec![0.5, 0.25]);
//! # Ok::<(), sparse_inverse::SinvError>(())
//! ```

pub mod error;
pub mod io;
pub mod linalg;
pub mod logger;
pub mod sparse;

pub use error::{SinvError, SinvResult};
pub use io::{MatrixMarketLoader, SinvIoError, load_matrix};
pub use linalg::{
    CholeskyFactor, FactorConfig, FactorProvider, FactorStatus, OrderingMethod, Permutation,
    SimplicialLdl, SinvConfig, SparseInverse, SparseInverseSolver, sinv, sinv_with_config,
    sinv_with_provider,
};
pub use logger::{init_logger, init_logger_with_level};
pub use sparse::{ColumnView, CscMatrix};
