use crate::sparse::{CscMatrix, cumsum};

/// Mirror a sorted lower-triangular matrix into the full symmetric matrix.
///
/// Every column of `lower` must start with its diagonal. The result stores
/// `2 * nnz(lower) - m` entries, and each off-diagonal pair holds bitwise
/// identical values.
pub fn expand_symmetric(lower: &CscMatrix) -> CscMatrix {
    let m = lower.ncols();

    // column k receives row k of `lower` (mirrored, diagonal included)
    // plus its own strictly lower entries
    let mut counts = vec![0; m];
    for j in 0..m {
        let rows = lower.col(j).rows();
        for &i in rows {
            counts[i] += 1;
        }
        counts[j] += rows.len().saturating_sub(1);
    }
    let mut colptr = vec![0; m + 1];
    let nnz = cumsum(&mut colptr, &mut counts);

    let mut rowidx = vec![0; nnz];
    let mut values = vec![0.0; nnz];

    // upper part: (i, j) -> (j, i), rows arrive in increasing j
    for j in 0..m {
        for (i, value) in lower.col(j).iter() {
            let dst = counts[i];
            counts[i] += 1;
            rowidx[dst] = j;
            values[dst] = value;
        }
    }

    // strictly lower part, after the diagonal of each column
    for j in 0..m {
        for (i, value) in lower.col(j).iter().filter(|&(i, _)| i > j) {
            let dst = counts[j];
            counts[j] += 1;
            rowidx[dst] = i;
            values[dst] = value;
        }
    }

    CscMatrix::from_raw_parts(m, m, colptr, rowidx, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_small() {
        // [[1, ., 2], [., 3, 4], [2, 4, 5]]
        let lower = CscMatrix::from_triplets(
            3,
            3,
            &[(0, 0, 1.0), (2, 0, 2.0), (1, 1, 3.0), (2, 1, 4.0), (2, 2, 5.0)],
        )
        .unwrap();
        let full = expand_symmetric(&lower);

        assert_eq!(full.nnz(), 2 * lower.nnz() - 3);
        assert_eq!(full.colptr(), &[0, 2, 4, 7]);
        assert_eq!(full.rowidx(), &[0, 2, 1, 2, 0, 1, 2]);
        assert_eq!(full.values(), &[1.0, 2.0, 3.0, 4.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_bitwise_symmetry() {
        let lower = CscMatrix::from_triplets(
            4,
            4,
            &[
                (0, 0, 0.1),
                (1, 0, 1.0 / 3.0),
                (3, 0, -0.7),
                (1, 1, 2.0),
                (2, 2, std::f64::consts::PI),
                (3, 2, 1e-300),
                (3, 3, 9.0),
            ],
        )
        .unwrap();
        let full = expand_symmetric(&lower);

        for (i, j, value) in full.triplets() {
            assert_eq!(full.get(j, i).map(f64::to_bits), Some(value.to_bits()));
        }
        assert_eq!(full.lower_triangle(), lower);
    }

    #[test]
    fn test_diagonal_only() {
        let lower = CscMatrix::from_diagonal(&[2.0, 3.0]);
        assert_eq!(expand_symmetric(&lower), lower);
    }
}
