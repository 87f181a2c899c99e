//! Takahashi selected inversion over a packed LDL' factor.
//!
//! With `A = L D L'`, the entries of `Z = A^{-1}` on the pattern of `L`
//! satisfy, for every column `j` with sub-diagonal rows `R` and multipliers `F`:
//!
//! ```text
//! Z[R, j] = -Z[R, R] F
//! Z[j, j] = 1 / d_j + F' Z[R, R] F
//! ```
//!
//! `Z[R, R]` only involves columns greater than `j`, and the elimination tree
//! guarantees every pair of `R` is part of the pattern of `L`. Sweeping the
//! columns from last to first therefore only ever reads finalized values.

use crate::linalg::factor::CholeskyFactor;
use crate::linalg::ordering::Permutation;
use crate::sparse::CscMatrix;

/// Replace the values of a packed LDL' factor by the selected inverse.
///
/// The returned matrix keeps the factor's pattern (lower triangle of the
/// internally ordered matrix, diagonal first in every column) and the
/// permutation is passed through unchanged.
pub fn selected_inverse(factor: CholeskyFactor) -> (CscMatrix, Option<Permutation>) {
    let CholeskyFactor { mut l, perm } = factor;
    let (colptr, rowidx, values) = l.parts_mut();
    selected_inverse_in_place(colptr, rowidx, values);
    (l, perm)
}

/// Raw-array form of [`selected_inverse`].
///
/// `values` holds `d_j` followed by the multipliers of column `j` on entry and
/// `Z` restricted to the same positions on exit.
pub fn selected_inverse_in_place(colptr: &[usize], rowidx: &[usize], values: &mut [f64]) {
    let m = colptr.len().saturating_sub(1);

    let mut multipliers: Vec<f64> = Vec::new();
    let mut gather: Vec<f64> = Vec::new();
    let mut product: Vec<f64> = Vec::new();

    for j in (0..m).rev() {
        let start = colptr[j];
        let end = colptr[j + 1];
        if start == end {
            continue;
        }

        // columns > j live in `finalized`, column j is the tail of `head`
        let (head, finalized) = values.split_at_mut(end);
        let column = &mut head[start..];
        let pivot = column[0];
        let rows = &rowidx[start + 1..end];
        let lfi = rows.len();

        if lfi == 0 {
            column[0] = 1.0 / pivot;
            continue;
        }

        multipliers.clear();
        multipliers.extend_from_slice(&column[1..]);
        gather.clear();
        gather.resize(lfi * lfi, 0.0);
        product.clear();
        product.resize(lfi, 0.0);

        // lower half of G, column-major: G[p, q] = Z[rows[p], rows[q]] for p >= q
        for (q, &c) in rows.iter().enumerate() {
            let c_rows = &rowidx[colptr[c]..colptr[c + 1]];
            let c_values = &finalized[colptr[c] - end..colptr[c + 1] - end];
            let mut cursor = 0;
            for (p, &target) in rows.iter().enumerate().skip(q) {
                while cursor < c_rows.len() && c_rows[cursor] < target {
                    cursor += 1;
                }
                let hit = cursor < c_rows.len() && c_rows[cursor] == target;
                debug_assert!(hit, "Z[{target}, {c}] is missing from the factor pattern");
                gather[q * lfi + p] = if hit { c_values[cursor] } else { 0.0 };
            }
        }

        symmetric_lower_matvec(lfi, &gather, &multipliers, &mut product);

        let mut diagonal = 1.0 / pivot;
        for ((slot, &f), &w) in column[1..]
            .iter_mut()
            .zip(multipliers.iter())
            .zip(product.iter())
        {
            *slot = -w;
            diagonal += f * w;
        }
        column[0] = diagonal;
    }
}

/// `y = G x` where only the lower half of the column-major `n x n` matrix `G` is read.
fn symmetric_lower_matvec(n: usize, g: &[f64], x: &[f64], y: &mut [f64]) {
    for q in 0..n {
        let xq = x[q];
        let mut acc = g[q * n + q] * xq;
        for p in q + 1..n {
            let gpq = g[q * n + p];
            y[p] += gpq * xq;
            acc += gpq * x[p];
        }
        y[q] += acc;
    }
}
