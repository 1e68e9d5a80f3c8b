// --- Helper Functions ---

// Toroidal index: any signed offset folded back into 0..len
#[inline]
pub fn wrap(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}

// [previous, current, next] indices around `index` on a ring of `len`
#[inline]
pub fn ring_neighbors(index: usize, len: usize) -> [usize; 3] {
    let prev = if index == 0 { len - 1 } else { index - 1 };
    let next = if index + 1 == len { 0 } else { index + 1 };
    [prev, index, next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_folds_negative_and_overflowing_offsets() {
        assert_eq!(wrap(-1, 10), 9);
        assert_eq!(wrap(10, 10), 0);
        assert_eq!(wrap(-21, 10), 9);
        assert_eq!(wrap(4, 10), 4);
    }

    #[test]
    fn ring_neighbors_wrap_at_both_edges() {
        assert_eq!(ring_neighbors(0, 5), [4, 0, 1]);
        assert_eq!(ring_neighbors(4, 5), [3, 4, 0]);
        assert_eq!(ring_neighbors(0, 1), [0, 0, 0]);
    }
}
