//! Cholesky factor representation and the factorization collaborator interface.

use crate::error::{SinvError, SinvResult};
use crate::linalg::ordering::{OrderingMethod, Permutation};
use crate::sparse::CscMatrix;

/// Packed LDL' factor of a symmetrically permuted matrix `P A P'`.
///
/// Column `j` of `l` stores the pivot `d_j` first (row `j`), followed by the
/// strictly sub-diagonal multipliers of the unit lower factor in ascending
/// row order.
#[derive(Debug, Clone, PartialEq)]
pub struct CholeskyFactor {
    pub l: CscMatrix,
    /// `None` stands for the identity permutation.
    pub perm: Option<Permutation>,
}

impl CholeskyFactor {
    pub fn new(l: CscMatrix, perm: Option<Permutation>) -> Self {
        Self { l, perm }
    }

    pub fn dim(&self) -> usize {
        self.l.ncols()
    }

    /// Pivots `d_j` of the factorization, in internal order.
    pub fn pivots(&self) -> Vec<f64> {
        self.l.diagonal()
    }

    /// Check the packed LDL' layout the recursion relies on.
    pub fn validate(&self) -> SinvResult<()> {
        let n = self.l.ncols();
        if !self.l.is_square() {
            return Err(SinvError::MalformedFactor(format!(
                "factor is {}x{}",
                self.l.nrows(),
                n
            )));
        }
        // rows are strictly ascending, so a diagonal-first column is lower triangular
        if let Some(j) = (0..n).find(|&j| self.l.col(j).rows().first() != Some(&j)) {
            return Err(SinvError::MalformedFactor(format!(
                "column {j} does not start with its diagonal"
            )));
        }
        self.check_closed_under_elimination()?;
        if let Some(perm) = self.perm.as_ref().filter(|perm| perm.len() != n) {
            return Err(SinvError::MalformedFactor(format!(
                "permutation has length {}, factor has dimension {n}",
                perm.len()
            )));
        }
        Ok(())
    }

    /// Every pair of rows `p > q` below the diagonal of column `j` needs row `p`
    /// stored in column `q`, otherwise the recursion reads an entry of `Z`
    /// that is never computed.
    fn check_closed_under_elimination(&self) -> SinvResult<()> {
        for j in 0..self.l.ncols() {
            let below = &self.l.col(j).rows()[1..];
            for (q, &c) in below.iter().enumerate() {
                let stored = &self.l.col(c).rows()[1..];
                let mut cursor = 0;
                for &target in &below[q + 1..] {
                    while cursor < stored.len() && stored[cursor] < target {
                        cursor += 1;
                    }
                    if stored.get(cursor) != Some(&target) {
                        return Err(SinvError::MalformedFactor(format!(
                            "row {target} is missing from column {c} (required by column {j})"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Outcome of a numeric factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorStatus {
    Ok,
    /// First internal (0-based) column whose pivot was not positive.
    NotPositiveDefinite { column: usize },
}

impl FactorStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FactorStatus::Ok)
    }
}

/// Settings for the factorization collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorConfig {
    /// Fill-reducing ordering applied before factorization
    pub ordering: OrderingMethod,
    /// Stop at the first non-positive pivot instead of finishing the factorization
    pub quick_return_if_not_posdef: bool,
    /// Multiplier for AMD's dense-row threshold
    pub amd_dense_scale: f64,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingMethod::default(),
            quick_return_if_not_posdef: true,
            amd_dense_scale: 1.0,
        }
    }
}

impl FactorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ordering(mut self, ordering: OrderingMethod) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_quick_return_if_not_posdef(mut self, quick_return: bool) -> Self {
        self.quick_return_if_not_posdef = quick_return;
        self
    }

    pub fn with_amd_dense_scale(mut self, scale: f64) -> Self {
        self.amd_dense_scale = scale;
        self
    }
}

/// Sparse LDL' factorization used by the sparse inverse pipeline.
///
/// Implementations consume the lower triangle of a square matrix and return
/// a [`CholeskyFactor`] in packed LDL' form.
pub trait FactorProvider {
    /// Result of the symbolic analysis, reusable across matrices with the same pattern.
    type Symbolic;

    /// Ordering and symbolic analysis of the pattern of `tril(a)`.
    fn analyze(&mut self, a: &CscMatrix) -> SinvResult<Self::Symbolic>;

    /// Numeric factorization of `a` using a previous analysis.
    fn factorize(
        &mut self,
        a: &CscMatrix,
        symbolic: &Self::Symbolic,
    ) -> SinvResult<(CholeskyFactor, FactorStatus)>;
}
