// File: simulation.rs
use crate::config::{GameConfig, SpontaneousConfig};
use crate::error::Result;
use crate::grid::Grid;
use crate::rules::next_state;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::ops::Range;
use std::time::Duration;

pub type SimRng = StdRng;

/// Contiguous row bands for `workers` parallel tasks. Every band but the
/// last holds `rows / workers` rows; the last one also takes the remainder.
pub fn band_ranges(rows: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.clamp(1, rows.max(1));
    let chunk = rows / workers;
    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 { rows } else { start + chunk };
            start..end
        })
        .collect()
}

// Next generation for one band of rows, written into that band's slice of the back buffer.
fn compute_band(grid: &Grid, rows: Range<usize>, out: &mut [bool]) {
    let cols = grid.cols();
    for (local_row, row) in rows.enumerate() {
        let out_row = &mut out[local_row * cols..(local_row + 1) * cols];
        for (col, next) in out_row.iter_mut().enumerate() {
            let n = grid.live_neighbors_unrolled(row, col);
            *next = next_state(grid.get(row, col), n);
        }
    }
}

// --- Frame delay (simulation speed) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelay {
    current: Duration,
    min: Duration,
    max: Duration,
    step: Duration,
}

impl FrameDelay {
    pub fn new(initial: Duration, min: Duration, max: Duration, step: Duration) -> Self {
        Self {
            current: initial.clamp(min, max),
            min,
            max,
            step,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.initial_frame_delay(),
            Duration::from_millis(config.min_frame_delay_ms),
            Duration::from_millis(config.max_frame_delay_ms),
            Duration::from_millis(config.frame_delay_step_ms),
        )
    }

    /// Shorter delay, never below the minimum.
    pub fn faster(&mut self) -> Duration {
        self.current = self.current.saturating_sub(self.step).max(self.min);
        log::debug!("Frame delay: {} ms", self.millis());
        self.current
    }

    /// Longer delay, never above the maximum.
    pub fn slower(&mut self) -> Duration {
        self.current = (self.current + self.step).min(self.max);
        log::debug!("Frame delay: {} ms", self.millis());
        self.current
    }

    #[inline]
    pub fn as_duration(&self) -> Duration {
        self.current
    }

    #[inline]
    pub fn millis(&self) -> u128 {
        self.current.as_millis()
    }
}

// --- Simulation ---

pub struct Simulation {
    grid: Grid,
    // Back buffer the bands write into; swapped with the grid's cells after every step
    back: Vec<bool>,
    pool: rayon::ThreadPool,
    workers: usize,
    generation: u64,
    rng: SimRng,
    density: f64,
    spontaneous: SpontaneousConfig,
    is_paused: bool,
}

impl Simulation {
    /// Randomly seeded grid sized from the window and cell size in `config`.
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let mut sim = Self::from_grid(Grid::new(config.rows(), config.cols()), config)?;
        sim.reseed();
        log::info!(
            "Seeded {}x{} grid at density {:.2} ({} live cells, {} workers)",
            sim.grid.rows(),
            sim.grid.cols(),
            sim.density,
            sim.population(),
            sim.workers
        );
        Ok(sim)
    }

    /// Wraps an existing grid as generation 0; nothing is randomized.
    pub fn from_grid(grid: Grid, config: &GameConfig) -> Result<Self> {
        let workers = config.workers.clamp(1, grid.rows());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("life-band-{i}"))
            .build()?;
        let rng = match config.seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_entropy(),
        };
        Ok(Self {
            back: vec![false; grid.cells().len()],
            grid,
            pool,
            workers,
            generation: 0,
            rng,
            density: config.initial_density,
            spontaneous: config.spontaneous.clone(),
            is_paused: false,
        })
    }

    /// Advance one generation: every band computed in parallel from the
    /// current cells, all joined, then the back buffer becomes the grid.
    pub fn step(&mut self) {
        let cols = self.grid.cols();
        let was_alive = !self.grid.is_empty();
        let bands = band_ranges(self.grid.rows(), self.workers);

        let grid = &self.grid;
        let mut rest: &mut [bool] = &mut self.back;
        let mut jobs = Vec::with_capacity(bands.len());
        for band in bands {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * cols);
            jobs.push((band, head));
            rest = tail;
        }

        self.pool.install(|| {
            jobs.into_par_iter()
                .for_each(|(band, out)| compute_band(grid, band, out));
        });

        std::mem::swap(self.grid.cells_mut(), &mut self.back);
        self.generation += 1;
        if was_alive && self.grid.is_empty() {
            log::info!("Population died out at generation {}", self.generation);
        }

        if self.spontaneous.is_enabled() && self.generation % self.spontaneous.interval == 0 {
            self.spontaneous_generation();
        }
    }

    // Drops a random square cluster of fresh cells somewhere on the torus.
    fn spontaneous_generation(&mut self) {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let height = self.spontaneous.cluster_size.min(rows);
        let width = self.spontaneous.cluster_size.min(cols);
        let start_row = self.rng.gen_range(0..rows);
        let start_col = self.rng.gen_range(0..cols);
        let density = self.spontaneous.density.clamp(0.0, 1.0);

        let mut born = 0usize;
        for dy in 0..height {
            for dx in 0..width {
                if self.rng.gen_bool(density) {
                    self.grid.set_wrapped(
                        (start_row + dy) as isize,
                        (start_col + dx) as isize,
                        true,
                    );
                    born += 1;
                }
            }
        }
        log::trace!(
            "Spontaneous cluster at ({}, {}): {} cells",
            start_row,
            start_col,
            born
        );
    }

    /// Bring the cell at (row, col) to life. Returns false when out of bounds.
    pub fn paint(&mut self, row: usize, col: usize) -> bool {
        if row >= self.grid.rows() || col >= self.grid.cols() {
            return false;
        }
        self.grid.set(row, col, true);
        true
    }

    pub fn reseed(&mut self) {
        self.grid.randomize(self.density, &mut self.rng);
        self.generation = 0;
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.generation = 0;
    }

    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
        log::info!(
            "Simulation {}",
            if self.is_paused { "Paused" } else { "Resumed" }
        );
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }
}
