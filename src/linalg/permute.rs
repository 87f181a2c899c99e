//! Map a lower-triangular matrix from the factorization's internal order back
//! to the caller's numbering.

use crate::linalg::ordering::Permutation;
use crate::sparse::{CscMatrix, cumsum};

/// Relabel `tril(P A P')`-shaped data into `tril(A)` numbering.
///
/// Internal variable `k` becomes original variable `perm[k]`. Entries are first
/// scattered into an upper-triangular intermediate (column `max`, row `min` of
/// the mapped pair) and then transposed with a counting sort, which leaves the
/// rows of every output column in ascending order without an explicit sort.
pub fn permute_lower(l: &CscMatrix, perm: Option<&Permutation>) -> CscMatrix {
    let m = l.ncols();
    let nnz = l.nnz();
    let original = |k: usize| perm.map_or(k, |p| p.as_slice()[k]);

    // B = upper triangle in original numbering, rows unsorted
    let mut counts = vec![0; m];
    for j in 0..m {
        let k = original(j);
        for &i in l.col(j).rows() {
            counts[original(i).max(k)] += 1;
        }
    }
    let mut b_colptr = vec![0; m + 1];
    cumsum(&mut b_colptr, &mut counts);

    let mut b_rowidx = vec![0; nnz];
    let mut b_values = vec![0.0; nnz];
    for j in 0..m {
        let k = original(j);
        for (i, value) in l.col(j).iter() {
            let ik = original(i);
            let col = ik.max(k);
            let dst = counts[col];
            counts[col] += 1;
            b_rowidx[dst] = ik.min(k);
            b_values[dst] = value;
        }
    }

    // transpose B; visiting its columns in order sorts the rows of the result
    let mut row_counts = vec![0; m];
    for &row in &b_rowidx {
        row_counts[row] += 1;
    }
    let mut colptr = vec![0; m + 1];
    cumsum(&mut colptr, &mut row_counts);

    let mut rowidx = vec![0; nnz];
    let mut values = vec![0.0; nnz];
    for col in 0..m {
        for idx in b_colptr[col]..b_colptr[col + 1] {
            let row = b_rowidx[idx];
            let dst = row_counts[row];
            row_counts[row] += 1;
            rowidx[dst] = col;
            values[dst] = b_values[idx];
        }
    }

    CscMatrix::from_raw_parts(m, m, colptr, rowidx, values)
}
