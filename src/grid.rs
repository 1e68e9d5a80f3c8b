use crate::utils::{ring_neighbors, wrap};
use glam::Vec2;
use rand::Rng;

/// Toroidal boolean cell grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid must have at least one cell");
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Seed every cell independently: alive with probability `density`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, density: f64, rng: &mut R) {
        let density = density.clamp(0.0, 1.0);
        for cell in &mut self.cells {
            *cell = rng.gen_bool(density);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    // Buffer swap target for the simulation; length is never changed through this.
    pub(crate) fn cells_mut(&mut self) -> &mut Vec<bool> {
        &mut self.cells
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.cells[row * self.cols + col] = alive;
    }

    /// `set` with both indices wrapped onto the torus.
    #[inline]
    pub fn set_wrapped(&mut self, row: isize, col: isize, alive: bool) {
        self.set(wrap(row, self.rows), wrap(col, self.cols), alive);
    }

    /// Live cells among the 8 surrounding cells, wrapping at the edges. The
    /// wrapped indices are computed once and the eight reads written out.
    #[inline]
    pub fn live_neighbors_unrolled(&self, row: usize, col: usize) -> u8 {
        let [up, _, down] = ring_neighbors(row, self.rows);
        let [left, _, right] = ring_neighbors(col, self.cols);
        let c = &self.cells;
        let (up, mid, down) = (up * self.cols, row * self.cols, down * self.cols);

        c[up + left] as u8
            + c[up + col] as u8
            + c[up + right] as u8
            + c[mid + left] as u8
            + c[mid + right] as u8
            + c[down + left] as u8
            + c[down + col] as u8
            + c[down + right] as u8
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&alive| alive)
    }

    /// Iterator over `(row, col)` of every live cell.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| (index / self.cols, index % self.cols))
    }

    /// Cell under a window position, with the grid stretched over `surface`.
    /// `None` when the position lies outside the surface.
    pub fn cell_at(&self, position: Vec2, surface: Vec2) -> Option<(usize, usize)> {
        if surface.x <= 0.0 || surface.y <= 0.0 {
            return None;
        }
        let scaled = position / surface * Vec2::new(self.cols as f32, self.rows as f32);
        if scaled.x < 0.0 || scaled.y < 0.0 {
            return None;
        }
        let (row, col) = (scaled.y as usize, scaled.x as usize);
        (row < self.rows && col < self.cols).then_some((row, col))
    }
}

#[cfg(test)]
impl Grid {
    /// Build a grid from ASCII rows, `#` or `O` alive, anything else dead.
    /// Every line must have the same width.
    pub(crate) fn from_rows(lines: &[&str]) -> Self {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        let mut grid = Self::new(rows, cols);
        for (row, line) in lines.iter().enumerate() {
            assert_eq!(line.chars().count(), cols, "ragged row {row}");
            for (col, ch) in line.chars().enumerate() {
                grid.set(row, col, matches!(ch, '#' | 'O'));
            }
        }
        grid
    }

    #[inline]
    pub(crate) fn get_wrapped(&self, row: isize, col: isize) -> bool {
        self.get(wrap(row, self.rows), wrap(col, self.cols))
    }

    /// Live cells among the 8 surrounding cells, wrapping at the edges.
    /// Plain loop form, kept as the reference for the unrolled count.
    pub(crate) fn live_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut count = 0;
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                if dy == 0 && dx == 0 {
                    continue;
                }
                if self.get_wrapped(row as isize + dy, col as isize + dx) {
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn neighbors_wrap_around_corners() {
        let grid = Grid::from_rows(&[
            "#...#", //
            ".....",
            ".....",
            "#...#",
        ]);
        // Each corner sees the other three corners through the wrap.
        assert_eq!(grid.live_neighbors(0, 0), 3);
        assert_eq!(grid.live_neighbors(3, 4), 3);
        assert_eq!(grid.live_neighbors(1, 2), 0);
    }

    #[test]
    fn unrolled_count_matches_loop_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for (rows, cols) in [(1, 1), (1, 4), (2, 3), (5, 5), (17, 31)] {
            let mut grid = Grid::new(rows, cols);
            grid.randomize(0.5, &mut rng);
            for row in 0..rows {
                for col in 0..cols {
                    assert_eq!(
                        grid.live_neighbors(row, col),
                        grid.live_neighbors_unrolled(row, col),
                        "mismatch at ({row}, {col}) on {rows}x{cols}"
                    );
                }
            }
        }
    }

    #[test]
    fn randomize_respects_density_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(10, 10);
        grid.randomize(1.0, &mut rng);
        assert_eq!(grid.population(), 100);
        grid.randomize(0.0, &mut rng);
        assert!(grid.is_empty());
    }

    #[test]
    fn randomize_is_reproducible_from_a_seed() {
        let mut a = Grid::new(20, 20);
        let mut b = Grid::new(20, 20);
        a.randomize(0.2, &mut StdRng::seed_from_u64(99));
        b.randomize(0.2, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn live_cells_reports_row_and_column() {
        let grid = Grid::from_rows(&["..#", "#.."]);
        let live: Vec<_> = grid.live_cells().collect();
        assert_eq!(live, vec![(0, 2), (1, 0)]);
    }

    #[test]
    fn cell_at_maps_pixels_and_rejects_outside() {
        let grid = Grid::new(76, 102);
        let surface = Vec2::new(1020.0, 760.0);
        assert_eq!(grid.cell_at(Vec2::new(0.0, 0.0), surface), Some((0, 0)));
        assert_eq!(grid.cell_at(Vec2::new(25.0, 13.0), surface), Some((1, 2)));
        assert_eq!(grid.cell_at(Vec2::new(1019.0, 759.0), surface), Some((75, 101)));
        assert_eq!(grid.cell_at(Vec2::new(1020.0, 10.0), surface), None);
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 10.0), surface), None);
        assert_eq!(grid.cell_at(Vec2::new(5.0, 5.0), Vec2::ZERO), None);
    }
}
