/// Turn per-bucket counts into compressed column pointers.
///
/// On return `p[i] = c[0] + ... + c[i-1]` for `i` in `0..=n`, and every
/// `c[i]` is overwritten with `p[i]` so it can serve as the insertion cursor
/// of a following scatter pass (`dst = c[bucket]; c[bucket] += 1`).
///
/// Returns the total count `p[n]`. If `p` is not exactly one longer than `c`
/// nothing is touched and 0 is returned.
pub fn cumsum(p: &mut [usize], c: &mut [usize]) -> usize {
    if p.len() != c.len() + 1 {
        return 0;
    }

    let mut nz = 0;
    for (pi, ci) in p.iter_mut().zip(c.iter_mut()) {
        *pi = nz;
        nz += *ci;
        *ci = *pi;
    }
    p[c.len()] = nz;
    nz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cumsum_builds_pointers_and_cursors() {
        let mut counts = vec![2, 0, 3, 1];
        let mut ptr = vec![0; 5];

        let total = cumsum(&mut ptr, &mut counts);

        assert_eq!(total, 6);
        assert_eq!(ptr, vec![0, 2, 2, 5, 6]);
        assert_eq!(counts, vec![0, 2, 2, 5]);
    }

    #[test]
    fn test_cumsum_cursor_scatter() {
        // Bucket entries by key using the cursors left behind in `counts`.
        let keys = [2, 0, 2, 1, 0];
        let mut counts = vec![0; 3];
        for &k in &keys {
            counts[k] += 1;
        }
        let mut ptr = vec![0; 4];
        cumsum(&mut ptr, &mut counts);

        let mut slots = vec![usize::MAX; keys.len()];
        for (i, &k) in keys.iter().enumerate() {
            slots[counts[k]] = i;
            counts[k] += 1;
        }

        assert_eq!(slots, vec![1, 4, 3, 0, 2]);
        // every cursor ends at the start of the next bucket
        assert_eq!(counts, ptr[1..].to_vec());
    }

    #[test]
    fn test_cumsum_empty() {
        let mut counts: Vec<usize> = Vec::new();
        let mut ptr = vec![7];
        assert_eq!(cumsum(&mut ptr, &mut counts), 0);
        assert_eq!(ptr, vec![0]);
    }

    #[test]
    fn test_cumsum_mismatched_lengths_is_noop() {
        let mut counts = vec![1, 2];
        let mut ptr = vec![9, 9];
        assert_eq!(cumsum(&mut ptr, &mut counts), 0);
        assert_eq!(ptr, vec![9, 9]);
        assert_eq!(counts, vec![1, 2]);
    }
}
