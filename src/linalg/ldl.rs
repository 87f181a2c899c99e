//! Simplicial LDL' factorization backed by faer.
//!
//! This is the stock [`FactorProvider`]. The ordering is computed here, then
//! faer's simplicial Cholesky analysis builds the pattern of `L` for
//! `P A P'` and its numeric LDL' fills it. faer stores `D` in the diagonal
//! slot of every column with the multipliers below it in ascending row order,
//! which is already the packed layout the recursion consumes.

use crate::error::{SinvError, SinvResult};
use crate::linalg::factor::{CholeskyFactor, FactorConfig, FactorProvider, FactorStatus};
use crate::linalg::ordering::Permutation;
use crate::sparse::CscMatrix;
use faer::dyn_stack::{MemBuffer, MemStack};
use faer::linalg::cholesky::ldlt::factor::{LdltError, LdltParams, LdltRegularization};
use faer::perm::PermRef;
use faer::sparse::linalg::SupernodalThreshold;
use faer::sparse::linalg::cholesky::{
    CholeskySymbolicParams, SymbolicCholesky, SymbolicCholeskyRaw, SymmetricOrdering,
    factorize_symbolic_cholesky,
};
use faer::sparse::{SparseColMatRef, SymbolicSparseColMatRef};
use faer::{Par, Side, Spec};
use std::sync::Arc;
use tracing::debug;

/// Symbolic analysis of `tril(A)`: the ordering and faer's simplicial structure of `L`.
#[derive(Debug, Clone)]
pub struct SymbolicLdl {
    n: usize,
    perm: Option<Permutation>,
    // pattern of tril(A) this analysis was computed for
    lower_colptr: Vec<usize>,
    lower_rowidx: Vec<usize>,
    // None only for the empty matrix
    inner: Option<Arc<SymbolicCholesky<usize>>>,
}

impl SymbolicLdl {
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn perm(&self) -> Option<&Permutation> {
        self.perm.as_ref()
    }

    /// Stored entries of the packed factor, diagonal included.
    pub fn factor_nnz(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.len_val())
    }

    /// Whether `lower` has exactly the pattern this analysis was built from.
    pub fn matches(&self, lower: &CscMatrix) -> bool {
        lower.ncols() == self.n
            && lower.colptr() == self.lower_colptr.as_slice()
            && lower.rowidx() == self.lower_rowidx.as_slice()
    }

    /// Column pointers and row indices of `L`, diagonal first in every column.
    fn factor_pattern(inner: &SymbolicCholesky<usize>) -> SinvResult<(&[usize], &[usize])> {
        match inner.raw() {
            SymbolicCholeskyRaw::Simplicial(simplicial) => {
                Ok((simplicial.col_ptr(), simplicial.row_idx()))
            }
            SymbolicCholeskyRaw::Supernodal(_) => Err(SinvError::MalformedFactor(
                "faer produced a supernodal structure".to_string(),
            )),
        }
    }
}

/// Simplicial LDL' factorization with a configurable fill-reducing ordering.
#[derive(Debug, Clone, Default)]
pub struct SimplicialLdl {
    config: FactorConfig,
}

impl SimplicialLdl {
    pub fn new(config: FactorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FactorConfig {
        &self.config
    }
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

impl FactorProvider for SimplicialLdl {
    type Symbolic = SymbolicLdl;

    fn analyze(&mut self, a: &CscMatrix) -> SinvResult<SymbolicLdl> {
        check_square(a)?;
        let lower = a.lower_triangle();
        let n = lower.ncols();

        let perm = self
            .config
            .ordering
            .compute(&lower, self.config.amd_dense_scale)?;

        let inner = if n == 0 {
            None
        } else {
            // faer reads only the upper triangle when no permutation is applied,
            // so the natural order goes through an explicit identity
            let identity = Permutation::identity(n);
            let p = perm.as_ref().unwrap_or(&identity);
            let ordering = SymmetricOrdering::Custom(PermRef::new_checked(
                p.as_slice(),
                p.inverse(),
                n,
            ));
            let params = CholeskySymbolicParams {
                supernodal_flop_ratio_threshold: SupernodalThreshold::FORCE_SIMPLICIAL,
                ..Default::default()
            };
            let structure =
                SymbolicSparseColMatRef::new_checked(n, n, lower.colptr(), None, lower.rowidx());
            let symbolic = factorize_symbolic_cholesky(structure, Side::Lower, ordering, params)
                .map_err(|e| {
                    SinvError::MalformedFactor(format!("symbolic LDL' failed: {e:?}"))
                })?;
            Some(Arc::new(symbolic))
        };

        let analysis = SymbolicLdl {
            n,
            perm,
            lower_colptr: lower.colptr().to_vec(),
            lower_rowidx: lower.rowidx().to_vec(),
            inner,
        };
        debug!(
            "Symbolic LDL': n = {}, nnz(tril(A)) = {}, nnz(L) = {}",
            n,
            lower.nnz(),
            analysis.factor_nnz()
        );
        Ok(analysis)
    }

    fn factorize(
        &mut self,
        a: &CscMatrix,
        symbolic: &SymbolicLdl,
    ) -> SinvResult<(CholeskyFactor, FactorStatus)> {
        check_square(a)?;
        let lower = a.lower_triangle();
        if !symbolic.matches(&lower) {
            return Err(SinvError::SymbolicMismatch);
        }
        let n = symbolic.n;
        let Some(inner) = symbolic.inner.as_deref() else {
            let empty = CscMatrix::from_raw_parts(0, 0, vec![0], Vec::new(), Vec::new());
            return Ok((CholeskyFactor::new(empty, None), FactorStatus::Ok));
        };
        let (col_ptr, row_idx) = SymbolicLdl::factor_pattern(inner)?;

        let structure =
            SymbolicSparseColMatRef::new_checked(n, n, lower.colptr(), None, lower.rowidx());
        let values = SparseColMatRef::new(structure, lower.values());

        let params: Spec<LdltParams, f64> = Default::default();
        let scratch = inner.factorize_numeric_ldlt_scratch::<f64>(Par::Seq, params);
        let mut mem = MemBuffer::new(scratch);
        let mut l_values = vec![0.0; inner.len_val()];

        // faer accepts negative pivots and stops only on a zero or non-finite one
        if let Err(LdltError::ZeroPivot { index }) = inner.factorize_numeric_ldlt(
            &mut l_values,
            values,
            Side::Lower,
            LdltRegularization::default(),
            Par::Seq,
            MemStack::new(&mut mem),
            params,
        ) {
            debug!("LDL' stopped at a zero pivot (step {})", index);
        }

        // pivots past a zero one are never written and stay at 0.0
        let first_failure = (0..n).find(|&j| !(l_values[col_ptr[j]] > 0.0));
        let status = match first_failure {
            None => FactorStatus::Ok,
            Some(column) => {
                debug!("LDL' pivot {} is not positive", column);
                if self.config.quick_return_if_not_posdef {
                    truncate_after(column, row_idx, &mut l_values);
                }
                FactorStatus::NotPositiveDefinite { column }
            }
        };

        let l = CscMatrix::from_raw_parts(n, n, col_ptr.to_vec(), row_idx.to_vec(), l_values);
        debug!("Numeric LDL': nnz(L) = {}", l.nnz());
        Ok((CholeskyFactor::new(l, symbolic.perm.clone()), status))
    }
}

/// Clear every entry of `L` in a row after `column`, as if elimination had stopped there.
fn truncate_after(column: usize, row_idx: &[usize], l_values: &mut [f64]) {
    for (&row, value) in row_idx.iter().zip(l_values.iter_mut()) {
        if row > column {
            *value = 0.0;
        }
    }
}
