// --- File: constants.rs ---
// --- Global Simulation Constants ---
pub const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
pub const CELL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub const WINDOW_WIDTH: u32 = 1024;
pub const WINDOW_HEIGHT: u32 = 768;
pub const CELL_SIZE: u32 = 10;

// Probability of a cell starting alive when the grid is seeded
pub const INITIAL_DENSITY: f64 = 0.2;
// Row bands computed in parallel per generation
pub const WORKER_COUNT: usize = 8;

pub const INITIAL_FRAME_DELAY_MS: u64 = 50;
pub const MIN_FRAME_DELAY_MS: u64 = 10;
pub const MAX_FRAME_DELAY_MS: u64 = 1000;
pub const FRAME_DELAY_STEP_MS: u64 = 10;

// Spontaneous generation is off unless an interval is configured
pub const SPONTANEOUS_INTERVAL: u64 = 0;
pub const SPONTANEOUS_CLUSTER_SIZE: usize = 6;
pub const SPONTANEOUS_DENSITY: f64 = 0.4;

// In-window status text: top-left offset and size of one font pixel, in window pixels
pub const HUD_MARGIN_PX: f32 = 10.0;
pub const HUD_SCALE_PX: f32 = 2.0;
pub const HUD_TEXT_COLOR: [f32; 4] = [1.0, 0.86, 0.0, 1.0];
pub const HUD_BACKDROP_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.75];

pub const TITLE_UPDATE_INTERVAL_SECS: f64 = 0.5;
pub const WINDOW_TITLE: &str = "Game of Life";
