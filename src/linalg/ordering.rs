//! Fill-reducing orderings and permutation vectors.

use crate::error::{SinvError, SinvResult};
use crate::sparse::CscMatrix;
use faer::dyn_stack::{MemBuffer, MemStack};
use faer::sparse::SymbolicSparseColMatRef;
use faer::sparse::linalg::amd;
use tracing::debug;

/// Permutation of `0..n` together with its inverse.
///
/// Permuted variable `k` corresponds to original variable `perm[k]`, and
/// `inverse[perm[k]] == k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    perm: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    /// Validate `perm` and compute its inverse.
    pub fn try_new(perm: Vec<usize>) -> SinvResult<Self> {
        let n = perm.len();
        let mut inverse = vec![usize::MAX; n];
        for (k, &p) in perm.iter().enumerate() {
            if p >= n {
                return Err(SinvError::InvalidPermutation(format!(
                    "entry {p} at position {k} is out of range for length {n}"
                )));
            }
            if inverse[p] != usize::MAX {
                return Err(SinvError::InvalidPermutation(format!(
                    "entry {p} appears more than once"
                )));
            }
            inverse[p] = k;
        }
        Ok(Self { perm, inverse })
    }

    pub fn identity(n: usize) -> Self {
        Self {
            perm: (0..n).collect(),
            inverse: (0..n).collect(),
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.perm
    }

    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    pub fn len(&self) -> usize {
        self.perm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perm.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.perm.iter().enumerate().all(|(k, &p)| k == p)
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.perm
    }
}

/// How the factorization reorders variables before eliminating them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderingMethod {
    /// Keep the caller's ordering (no permutation).
    Natural,
    /// Approximate minimum degree.
    #[default]
    Amd,
    /// Caller-supplied permutation: position `k` holds the original variable eliminated `k`-th.
    Given(Vec<usize>),
}

impl OrderingMethod {
    /// Compute the permutation for a square matrix pattern.
    ///
    /// Returns `None` for the natural ordering. Only the pattern of `a` is used,
    /// and either triangle (or both) may be supplied.
    pub fn compute(&self, a: &CscMatrix, amd_dense_scale: f64) -> SinvResult<Option<Permutation>> {
        let n = a.ncols();
        match self {
            OrderingMethod::Natural => Ok(None),
            OrderingMethod::Given(perm) => {
                if perm.len() != n {
                    return Err(SinvError::InvalidPermutation(format!(
                        "length {} does not match matrix dimension {n}",
                        perm.len()
                    )));
                }
                Permutation::try_new(perm.clone()).map(Some)
            }
            OrderingMethod::Amd => {
                if n == 0 {
                    return Ok(None);
                }
                let control = amd::Control {
                    dense: amd::Control::default().dense * amd_dense_scale,
                    ..Default::default()
                };
                let structure =
                    SymbolicSparseColMatRef::new_checked(n, n, a.colptr(), None, a.rowidx());
                let mut perm = vec![0usize; n];
                let mut perm_inv = vec![0usize; n];
                let mut mem = MemBuffer::new(amd::order_scratch::<usize>(n, a.nnz()));
                let flops = amd::order(
                    &mut perm,
                    &mut perm_inv,
                    structure,
                    control,
                    MemStack::new(&mut mem),
                )
                .map_err(|e| SinvError::Ordering(format!("AMD failed: {e:?}")))?;
                debug!(
                    "AMD ordering computed for n = {}, predicted LDL' flops = {:.0}",
                    n, flops.n_mult_subs_ldl
                );
                Permutation::try_new(perm).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow(n: usize) -> CscMatrix {
        // Dense first row/column: eliminating variable 0 first fills everything.
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, n as f64));
            if i > 0 {
                triplets.push((i, 0, 1.0));
                triplets.push((0, i, 1.0));
            }
        }
        CscMatrix::from_triplets(n, n, &triplets).unwrap()
    }

    #[test]
    fn test_permutation_inverse() {
        let p = Permutation::try_new(vec![2, 0, 1]).unwrap();
        assert_eq!(p.inverse(), &[1, 2, 0]);
        for (k, &orig) in p.as_slice().iter().enumerate() {
            assert_eq!(p.inverse()[orig], k);
        }
        assert!(!p.is_identity());
        assert!(Permutation::identity(4).is_identity());
    }

    #[test]
    fn test_permutation_rejects_invalid() {
        assert!(matches!(
            Permutation::try_new(vec![0, 3, 1]),
            Err(SinvError::InvalidPermutation(_))
        ));
        assert!(matches!(
            Permutation::try_new(vec![1, 1, 0]),
            Err(SinvError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_natural_ordering_is_none() {
        let a = arrow(4);
        assert_eq!(OrderingMethod::Natural.compute(&a, 1.0).unwrap(), None);
    }

    #[test]
    fn test_given_ordering_length_checked() {
        let a = arrow(4);
        let result = OrderingMethod::Given(vec![0, 1, 2]).compute(&a, 1.0);
        assert!(matches!(result, Err(SinvError::InvalidPermutation(_))));

        let perm = OrderingMethod::Given(vec![3, 2, 1, 0])
            .compute(&a, 1.0)
            .unwrap()
            .unwrap();
        assert_eq!(perm.as_slice(), &[3, 2, 1, 0]);
    }

    #[test]
    fn test_amd_moves_hub_last() {
        let a = arrow(6);
        let perm = OrderingMethod::Amd.compute(&a, 1.0).unwrap().unwrap();
        assert_eq!(perm.len(), 6);
        // the hub has the highest degree, so it is not eliminated first
        assert_ne!(perm.as_slice()[0], 0);
    }
}
