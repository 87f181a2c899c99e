//! Compressed sparse column storage.
//!
//! [`CscMatrix`] is the container used by every stage of the sparse inverse
//! pipeline. Columns always keep their row indices strictly ascending, which
//! lets [`ColumnView::find`] binary-search a column and lets the recursion
//! merge-scan columns against each other.

use crate::error::{SinvError, SinvResult};
use faer::sparse::{SparseColMat, Triplet};
use nalgebra::DMatrix;
use std::ops::Range;

pub mod column;
pub mod cumsum;

pub use column::ColumnView;
pub use cumsum::cumsum;

/// Sparse matrix in compressed sparse column format.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    nrows: usize,
    ncols: usize,
    colptr: Vec<usize>,
    rowidx: Vec<usize>,
    values: Vec<f64>,
}

impl CscMatrix {
    /// Build a matrix from raw CSC arrays, validating every invariant.
    ///
    /// Row indices must be strictly ascending inside each column.
    pub fn new(
        nrows: usize,
        ncols: usize,
        colptr: Vec<usize>,
        rowidx: Vec<usize>,
        values: Vec<f64>,
    ) -> SinvResult<Self> {
        if colptr.len() != ncols + 1 {
            return Err(SinvError::InvalidStructure(format!(
                "colptr has length {}, expected {}",
                colptr.len(),
                ncols + 1
            )));
        }
        if colptr[0] != 0 {
            return Err(SinvError::InvalidStructure(
                "colptr must start at 0".to_string(),
            ));
        }
        if colptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(SinvError::InvalidStructure(
                "colptr must be non-decreasing".to_string(),
            ));
        }
        let nnz = colptr[ncols];
        if rowidx.len() != nnz || values.len() != nnz {
            return Err(SinvError::InvalidStructure(format!(
                "expected {nnz} entries, got {} row indices and {} values",
                rowidx.len(),
                values.len()
            )));
        }
        for j in 0..ncols {
            let rows = &rowidx[colptr[j]..colptr[j + 1]];
            if let Some(&row) = rows.iter().find(|&&row| row >= nrows) {
                return Err(SinvError::InvalidStructure(format!(
                    "row index {row} out of bounds in column {j}"
                )));
            }
            if rows.windows(2).any(|w| w[0] >= w[1]) {
                return Err(SinvError::InvalidStructure(format!(
                    "rows of column {j} are not strictly ascending"
                )));
            }
        }

        Ok(Self {
            nrows,
            ncols,
            colptr,
            rowidx,
            values,
        })
    }

    /// Internal constructor for arrays that are valid by construction.
    pub(crate) fn from_raw_parts(
        nrows: usize,
        ncols: usize,
        colptr: Vec<usize>,
        rowidx: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(colptr.len(), ncols + 1);
        debug_assert_eq!(rowidx.len(), values.len());
        debug_assert_eq!(colptr[ncols], rowidx.len());
        Self {
            nrows,
            ncols,
            colptr,
            rowidx,
            values,
        }
    }

    /// Build a matrix from `(row, col, value)` triplets.
    ///
    /// Entries are sorted by column then row; duplicates are summed in input order.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> SinvResult<Self> {
        if let Some(&(row, col, _)) = triplets
            .iter()
            .find(|&&(row, col, _)| row >= nrows || col >= ncols)
        {
            return Err(SinvError::InvalidStructure(format!(
                "triplet ({row}, {col}) out of bounds for a {nrows}x{ncols} matrix"
            )));
        }

        let mut sorted = triplets.to_vec();
        sorted.sort_by_key(|&(row, col, _)| (col, row));

        let mut colptr = vec![0; ncols + 1];
        let mut rowidx = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, value) in sorted {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            rowidx.push(row);
            values.push(value);
            colptr[col + 1] += 1;
            last = Some((row, col));
        }
        for j in 0..ncols {
            colptr[j + 1] += colptr[j];
        }

        Ok(Self::from_raw_parts(nrows, ncols, colptr, rowidx, values))
    }

    /// Square identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    /// Square diagonal matrix with the given diagonal.
    pub fn from_diagonal(diagonal: &[f64]) -> Self {
        let n = diagonal.len();
        Self::from_raw_parts(n, n, (0..=n).collect(), (0..n).collect(), diagonal.to_vec())
    }

    /// Sparse copy of a dense matrix, keeping entries that are exactly nonzero.
    pub fn from_dense(dense: &DMatrix<f64>) -> Self {
        let (nrows, ncols) = dense.shape();
        let mut colptr = Vec::with_capacity(ncols + 1);
        let mut rowidx = Vec::new();
        let mut values = Vec::new();
        colptr.push(0);
        for j in 0..ncols {
            for i in 0..nrows {
                let v = dense[(i, j)];
                if v != 0.0 {
                    rowidx.push(i);
                    values.push(v);
                }
            }
            colptr.push(rowidx.len());
        }
        Self::from_raw_parts(nrows, ncols, colptr, rowidx, values)
    }

    /// Convert a faer sparse matrix, which may carry unsorted or duplicate rows.
    pub fn from_faer(mat: &SparseColMat<usize, f64>) -> SinvResult<Self> {
        let symbolic = mat.symbolic();
        let mut triplets = Vec::new();
        for col in 0..mat.ncols() {
            let row_indices = symbolic.row_idx_of_col_raw(col);
            let col_values = mat.val_of_col(col);
            for (&row, &value) in row_indices.iter().zip(col_values.iter()) {
                triplets.push((row, col, value));
            }
        }
        Self::from_triplets(mat.nrows(), mat.ncols(), &triplets)
    }

    /// Convert into a faer sparse matrix.
    pub fn to_faer(&self) -> SinvResult<SparseColMat<usize, f64>> {
        let triplets: Vec<_> = self
            .triplets()
            .map(|(row, col, value)| Triplet::new(row, col, value))
            .collect();
        SparseColMat::try_new_from_triplets(self.nrows, self.ncols, &triplets).map_err(|e| {
            SinvError::InvalidStructure(format!("Failed to create faer sparse matrix: {e:?}"))
        })
    }

    /// Dense copy, meant for small matrices and debugging.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.nrows, self.ncols);
        for (row, col, value) in self.triplets() {
            dense[(row, col)] = value;
        }
        dense
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.colptr[self.ncols]
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn colptr(&self) -> &[usize] {
        &self.colptr
    }

    pub fn rowidx(&self) -> &[usize] {
        &self.rowidx
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Split borrow: the structure stays shared while the values are mutated.
    pub(crate) fn parts_mut(&mut self) -> (&[usize], &[usize], &mut [f64]) {
        (&self.colptr, &self.rowidx, &mut self.values)
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        (self.colptr, self.rowidx, self.values)
    }

    /// Storage range of column `j`.
    pub fn col_range(&self, j: usize) -> Range<usize> {
        self.colptr[j]..self.colptr[j + 1]
    }

    pub fn col(&self, j: usize) -> ColumnView<'_> {
        let range = self.col_range(j);
        ColumnView::new(&self.rowidx[range.clone()], &self.values[range])
    }

    /// Value at `(row, col)` if the position is stored.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.ncols {
            return None;
        }
        self.col(col).find(row)
    }

    /// Iterate `(row, col, value)` in column-major order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.ncols).flat_map(move |j| self.col(j).iter().map(move |(i, v)| (i, j, v)))
    }

    /// Diagonal entries, with 0.0 where the diagonal is not stored.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.nrows.min(self.ncols))
            .map(|j| self.get(j, j).unwrap_or(0.0))
            .collect()
    }

    /// Lower triangle including the diagonal (`tril`).
    pub fn lower_triangle(&self) -> Self {
        let mut colptr = Vec::with_capacity(self.ncols + 1);
        let mut rowidx = Vec::with_capacity(self.nnz());
        let mut values = Vec::with_capacity(self.nnz());
        colptr.push(0);
        for j in 0..self.ncols {
            for (i, v) in self.col(j).iter().filter(|&(i, _)| i >= j) {
                rowidx.push(i);
                values.push(v);
            }
            colptr.push(rowidx.len());
        }
        Self::from_raw_parts(self.nrows, self.ncols, colptr, rowidx, values)
    }

    pub fn is_lower_triangular(&self) -> bool {
        (0..self.ncols).all(|j| self.col(j).rows().iter().all(|&i| i >= j))
    }

    /// Whether both matrices store exactly the same positions.
    pub fn same_pattern(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.colptr == other.colptr
            && self.rowidx == other.rowidx
    }
}
