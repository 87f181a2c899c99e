/// Borrowed view of one column of a [`CscMatrix`](super::CscMatrix).
///
/// Row indices are strictly ascending, so lookups use binary search.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    rows: &'a [usize],
    values: &'a [f64],
}

impl<'a> ColumnView<'a> {
    pub fn new(rows: &'a [usize], values: &'a [f64]) -> Self {
        debug_assert_eq!(rows.len(), values.len());
        Self { rows, values }
    }

    /// Value stored at `row`, if the position is part of the pattern.
    pub fn find(&self, row: usize) -> Option<f64> {
        self.rows
            .binary_search(&row)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Iterate `(row, value)` pairs in ascending row order.
    pub fn iter(self) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.rows.iter().copied().zip(self.values.iter().copied())
    }

    pub fn rows(self) -> &'a [usize] {
        self.rows
    }

    pub fn values(self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_hits_and_misses() {
        let rows = [1, 4, 7];
        let values = [0.5, -2.0, 3.0];
        let col = ColumnView::new(&rows, &values);

        assert_eq!(col.find(4), Some(-2.0));
        assert_eq!(col.find(7), Some(3.0));
        assert_eq!(col.find(0), None);
        assert_eq!(col.find(5), None);
    }

    #[test]
    fn test_iter_in_row_order() {
        let rows = [0, 2];
        let values = [1.0, 2.0];
        let col = ColumnView::new(&rows, &values);

        let pairs: Vec<_> = col.iter().collect();
        assert_eq!(pairs, vec![(0, 1.0), (2, 2.0)]);
        assert_eq!(col.len(), 2);
        assert!(!col.is_empty());
    }
}
