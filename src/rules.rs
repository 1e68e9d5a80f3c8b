/// Standard Life rule (B3/S23): a live cell survives with two or three live
/// neighbors, a dead cell is born with exactly three.
#[inline]
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    if alive {
        live_neighbors == 2 || live_neighbors == 3
    } else {
        live_neighbors == 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_cells_survive_only_with_two_or_three() {
        let survivors: Vec<u8> = (0..=8).filter(|&n| next_state(true, n)).collect();
        assert_eq!(survivors, vec![2, 3]);
    }

    #[test]
    fn dead_cells_are_born_only_with_three() {
        let births: Vec<u8> = (0..=8).filter(|&n| next_state(false, n)).collect();
        assert_eq!(births, vec![3]);
    }
}
