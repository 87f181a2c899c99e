//! Sparse inverse pipeline.
//!
//! `A -> L D L' -> selected inverse (internal order) -> original order -> full symmetric Z`.

use tracing::debug;

use crate::error::{SinvError, SinvResult};
use crate::linalg::factor::{CholeskyFactor, FactorConfig, FactorProvider, FactorStatus};
use crate::linalg::ldl::{SimplicialLdl, SymbolicLdl};
use crate::linalg::ordering::{OrderingMethod, Permutation};
use crate::linalg::permute::permute_lower;
use crate::linalg::symmetric::expand_symmetric;
use crate::linalg::takahashi::selected_inverse;
use crate::sparse::CscMatrix;
use faer::sparse::SparseColMat;

/// Settings for a sparse inverse computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SinvConfig {
    /// Fill-reducing ordering used by the factorization
    pub ordering: OrderingMethod,
    /// Report `minor` in the result and let the factorization run past a bad pivot
    pub extended_diagnostics: bool,
    /// Multiplier for AMD's dense-row threshold
    pub amd_dense_scale: f64,
}

impl Default for SinvConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingMethod::Amd,
            extended_diagnostics: false,
            amd_dense_scale: 1.0,
        }
    }
}

impl SinvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordering(mut self, ordering: OrderingMethod) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_extended_diagnostics(mut self, enabled: bool) -> Self {
        self.extended_diagnostics = enabled;
        self
    }

    pub fn with_amd_dense_scale(mut self, scale: f64) -> Self {
        self.amd_dense_scale = scale;
        self
    }

    /// Settings handed to the stock [`SimplicialLdl`] provider.
    pub fn to_factor_config(&self) -> FactorConfig {
        FactorConfig::new()
            .with_ordering(self.ordering.clone())
            .with_quick_return_if_not_posdef(!self.extended_diagnostics)
            .with_amd_dense_scale(self.amd_dense_scale)
    }
}

/// Entries of `A^{-1}` on the pattern of `L + L'`, in the caller's numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseInverse {
    /// Full symmetric sparse inverse
    pub z: CscMatrix,
    /// `Some(0)` when extended diagnostics were requested, `None` otherwise
    pub minor: Option<usize>,
    /// Fill-reducing permutation used by the factorization (`None` for natural order)
    pub perm: Option<Vec<usize>>,
}

impl SparseInverse {
    pub fn dim(&self) -> usize {
        self.z.ncols()
    }

    pub fn nnz(&self) -> usize {
        self.z.nnz()
    }

    /// `(A^{-1})[row, col]` if the position belongs to the computed pattern.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.z.get(row, col)
    }

    /// Diagonal of `A^{-1}`, i.e. the marginal variances when `A` is a precision matrix.
    pub fn marginal_variances(&self) -> Vec<f64> {
        self.z.diagonal()
    }

    pub fn to_faer(&self) -> SinvResult<SparseColMat<usize, f64>> {
        self.z.to_faer()
    }
}

/// Sparse inverse of a symmetric positive definite matrix with default settings.
///
/// Only the lower triangle of `a` is read.
///
/// # Example
///
/// ```
/// use sparse_inverse::{CscMatrix, sinv};
///
/// let a = CscMatrix::from_triplets(
///     2,
///     2,
///     &[(0, 0, 4.0), (1, 0, 2.0), (0, 1, 2.0), (1, 1, 3.0)],
/// )?;
/// let inverse = sinv(&a)?;
/// assert!((inverse.get(0, 1).unwrap() + 0.25).abs() < 1e-12);
/// # Ok::<(), sparse_inverse::SinvError>(())
/// ```
pub fn sinv(a: &CscMatrix) -> SinvResult<SparseInverse> {
    sinv_with_config(a, &SinvConfig::default())
}

pub fn sinv_with_config(a: &CscMatrix, config: &SinvConfig) -> SinvResult<SparseInverse> {
    let mut provider = SimplicialLdl::new(config.to_factor_config());
    sinv_with_provider(a, &mut provider, config)
}

/// Sparse inverse using a caller-supplied factorization.
///
/// The factor produced by `provider` is validated before the recursion runs.
pub fn sinv_with_provider<P: FactorProvider>(
    a: &CscMatrix,
    provider: &mut P,
    config: &SinvConfig,
) -> SinvResult<SparseInverse> {
    check_square(a)?;
    let symbolic = provider.analyze(a)?;
    let (factor, status) = provider.factorize(a, &symbolic)?;
    invert_factor(a, factor, status, config)
}

fn check_square(a: &CscMatrix) -> SinvResult<()> {
    if a.is_square() {
        Ok(())
    } else {
        Err(SinvError::InvalidDimension {
            rows: a.nrows(),
            cols: a.ncols(),
        })
    }
}

fn invert_factor(
    a: &CscMatrix,
    factor: CholeskyFactor,
    status: FactorStatus,
    config: &SinvConfig,
) -> SinvResult<SparseInverse> {
    if let FactorStatus::NotPositiveDefinite { column } = status {
        return Err(SinvError::NotPositiveDefinite { minor: column + 1 });
    }
    factor.validate()?;
    if factor.dim() != a.ncols() {
        return Err(SinvError::MalformedFactor(format!(
            "factor has dimension {}, matrix has dimension {}",
            factor.dim(),
            a.ncols()
        )));
    }

    let n = factor.dim();
    let factor_nnz = factor.l.nnz();
    let (internal, perm) = selected_inverse(factor);
    let lower = permute_lower(&internal, perm.as_ref());
    let z = expand_symmetric(&lower);

    debug!(
        "Sparse inverse: n = {}, nnz(A) = {}, nnz(L) = {}, nnz(Z) = {}",
        n,
        a.nnz(),
        factor_nnz,
        z.nnz()
    );

    Ok(SparseInverse {
        z,
        minor: config.extended_diagnostics.then_some(0),
        perm: perm.map(Permutation::into_vec),
    })
}

/// Sparse inverse solver that keeps the symbolic analysis between calls.
///
/// Repeated inversions of matrices sharing one sparsity pattern (e.g. a
/// precision matrix whose values change across iterations) skip the ordering
/// and elimination tree computation. A new pattern triggers a fresh analysis.
#[derive(Debug, Clone, Default)]
pub struct SparseInverseSolver {
    ldl: SimplicialLdl,
    config: SinvConfig,
    symbolic: Option<SymbolicLdl>,
    analysis_count: usize,
}

impl SparseInverseSolver {
    pub fn new(config: SinvConfig) -> Self {
        Self {
            ldl: SimplicialLdl::new(config.to_factor_config()),
            config,
            symbolic: None,
            analysis_count: 0,
        }
    }

    pub fn config(&self) -> &SinvConfig {
        &self.config
    }

    pub fn compute(&mut self, a: &CscMatrix) -> SinvResult<SparseInverse> {
        check_square(a)?;
        let lower = a.lower_triangle();

        let symbolic = match self.symbolic.take() {
            Some(symbolic) if symbolic.matches(&lower) => symbolic,
            _ => {
                debug!("Analyzing new sparsity pattern (n = {})", a.ncols());
                self.analysis_count += 1;
                self.ldl.analyze(a)?
            }
        };
        let factorized = self.ldl.factorize(a, &symbolic);
        self.symbolic = Some(symbolic);

        let (factor, status) = factorized?;
        invert_factor(a, factor, status, &self.config)
    }

    /// Drop the cached symbolic analysis.
    pub fn reset(&mut self) {
        self.symbolic = None;
    }

    pub fn has_symbolic(&self) -> bool {
        self.symbolic.is_some()
    }

    /// Number of symbolic analyses performed so far.
    pub fn analysis_count(&self) -> usize {
        self.analysis_count
    }
}
