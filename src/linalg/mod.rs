//! Sparse factorization and selected inversion.
//!
//! - [`factor`]: packed LDL' factor and the [`FactorProvider`] interface
//! - [`ldl`]: stock provider, an adapter over faer's simplicial LDL'
//! - [`ordering`]: fill-reducing orderings (natural, AMD, caller-given)
//! - [`takahashi`]: backward column recursion producing `Z` on the factor pattern
//! - [`permute`]: internal order back to the caller's numbering
//! - [`symmetric`]: lower triangle to full symmetric matrix
//! - [`sinv`]: the assembled pipeline

pub mod factor;
pub mod ldl;
pub mod ordering;
pub mod permute;
pub mod sinv;
pub mod symmetric;
pub mod takahashi;

pub use factor::{CholeskyFactor, FactorConfig, FactorProvider, FactorStatus};
pub use ldl::{SimplicialLdl, SymbolicLdl};
pub use ordering::{OrderingMethod, Permutation};
pub use permute::permute_lower;
pub use sinv::{
    SinvConfig, SparseInverse, SparseInverseSolver, sinv, sinv_with_config, sinv_with_provider,
};
pub use symmetric::expand_symmetric;
pub use takahashi::{selected_inverse, selected_inverse_in_place};
