// --- File: config.rs ---
use crate::constants::*;
use crate::error::{LifeError, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SpontaneousConfig {
    // Generations between spawned clusters; 0 disables spawning
    pub interval: u64,
    pub cluster_size: usize,
    pub density: f64,
}

impl Default for SpontaneousConfig {
    fn default() -> Self {
        Self {
            interval: SPONTANEOUS_INTERVAL,
            cluster_size: SPONTANEOUS_CLUSTER_SIZE,
            density: SPONTANEOUS_DENSITY,
        }
    }
}

impl SpontaneousConfig {
    pub fn is_enabled(&self) -> bool {
        self.interval > 0 && self.cluster_size > 0 && self.density > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub cell_size: u32,
    pub initial_density: f64,
    pub workers: usize,
    pub seed: Option<u64>,

    pub initial_frame_delay_ms: u64,
    pub min_frame_delay_ms: u64,
    pub max_frame_delay_ms: u64,
    pub frame_delay_step_ms: u64,

    pub cell_color: [f32; 4],
    pub spontaneous: SpontaneousConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            cell_size: CELL_SIZE,
            initial_density: INITIAL_DENSITY,
            workers: WORKER_COUNT,
            seed: None,
            initial_frame_delay_ms: INITIAL_FRAME_DELAY_MS,
            min_frame_delay_ms: MIN_FRAME_DELAY_MS,
            max_frame_delay_ms: MAX_FRAME_DELAY_MS,
            frame_delay_step_ms: FRAME_DELAY_STEP_MS,
            cell_color: CELL_COLOR,
            spontaneous: SpontaneousConfig::default(),
        }
    }
}

impl GameConfig {
    /// Defaults overridden by any `LIFE_*` variables present in the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Split out so the override logic can be driven without touching the real environment.
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_from(&lookup, "LIFE_WIDTH", &mut config.window_width)?;
        override_from(&lookup, "LIFE_HEIGHT", &mut config.window_height)?;
        override_from(&lookup, "LIFE_CELL_SIZE", &mut config.cell_size)?;
        override_from(&lookup, "LIFE_DENSITY", &mut config.initial_density)?;
        override_from(&lookup, "LIFE_WORKERS", &mut config.workers)?;
        override_from(
            &lookup,
            "LIFE_FRAME_DELAY_MS",
            &mut config.initial_frame_delay_ms,
        )?;
        override_from(
            &lookup,
            "LIFE_SPONTANEOUS_INTERVAL",
            &mut config.spontaneous.interval,
        )?;

        let mut seed = 0u64;
        if override_from(&lookup, "LIFE_SEED", &mut seed)? {
            config.seed = Some(seed);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn rows(&self) -> usize {
        (self.window_height / self.cell_size.max(1)) as usize
    }

    pub fn cols(&self) -> usize {
        (self.window_width / self.cell_size.max(1)) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(LifeError::InvalidConfig("cell size must be positive".into()));
        }
        if self.rows() == 0 || self.cols() == 0 {
            return Err(LifeError::InvalidConfig(format!(
                "window {}x{} is smaller than one {}px cell",
                self.window_width, self.window_height, self.cell_size
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_density) {
            return Err(LifeError::InvalidConfig(format!(
                "initial density {} is outside [0, 1]",
                self.initial_density
            )));
        }
        if !(0.0..=1.0).contains(&self.spontaneous.density) {
            return Err(LifeError::InvalidConfig(format!(
                "spontaneous density {} is outside [0, 1]",
                self.spontaneous.density
            )));
        }
        if self.workers == 0 {
            return Err(LifeError::InvalidConfig("worker count must be at least 1".into()));
        }
        if self.min_frame_delay_ms > self.max_frame_delay_ms {
            return Err(LifeError::InvalidConfig(format!(
                "frame delay bounds are reversed ({} > {})",
                self.min_frame_delay_ms, self.max_frame_delay_ms
            )));
        }
        if !(self.min_frame_delay_ms..=self.max_frame_delay_ms)
            .contains(&self.initial_frame_delay_ms)
        {
            return Err(LifeError::InvalidConfig(format!(
                "initial frame delay {}ms is outside [{}, {}]",
                self.initial_frame_delay_ms, self.min_frame_delay_ms, self.max_frame_delay_ms
            )));
        }
        Ok(())
    }

    pub fn initial_frame_delay(&self) -> Duration {
        Duration::from_millis(self.initial_frame_delay_ms)
    }
}

// Returns whether the variable was present.
fn override_from<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(false);
    };
    *target = raw
        .trim()
        .parse()
        .map_err(|_| LifeError::EnvParse { var, value: raw.clone() })?;
    log::debug!("{} overridden from environment: {}", var, raw.trim());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_classic_window() {
        let config = GameConfig::default();
        assert_eq!(config.rows(), 76);
        assert_eq!(config.cols(), 102);
        assert_eq!(config.workers, 8);
        assert_eq!(config.initial_frame_delay(), Duration::from_millis(50));
        assert!(!config.spontaneous.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("LIFE_WIDTH", "200"),
            ("LIFE_HEIGHT", "100"),
            ("LIFE_CELL_SIZE", "5"),
            ("LIFE_SEED", " 42 "),
            ("LIFE_WORKERS", "3"),
            ("LIFE_DENSITY", "0.35"),
            ("LIFE_FRAME_DELAY_MS", "120"),
            ("LIFE_SPONTANEOUS_INTERVAL", "25"),
        ]))
        .unwrap();
        assert_eq!(config.cols(), 40);
        assert_eq!(config.rows(), 20);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.workers, 3);
        assert_eq!(config.initial_density, 0.35);
        assert_eq!(config.initial_frame_delay(), Duration::from_millis(120));
        assert_eq!(config.spontaneous.interval, 25);
        assert!(config.spontaneous.is_enabled());
    }

    #[test]
    fn out_of_range_env_values_are_rejected() {
        for (var, value) in [
            ("LIFE_FRAME_DELAY_MS", "5"),
            ("LIFE_FRAME_DELAY_MS", "5000"),
            ("LIFE_DENSITY", "1.5"),
            ("LIFE_WORKERS", "0"),
        ] {
            let result = GameConfig::from_lookup(lookup_from(&[(var, value)]));
            assert!(
                matches!(result, Err(LifeError::InvalidConfig(_))),
                "{var}={value} should fail validation, got {result:?}"
            );
        }
    }

    #[test]
    fn unparsable_env_value_names_the_variable() {
        let err = GameConfig::from_lookup(lookup_from(&[("LIFE_DENSITY", "lots")])).unwrap_err();
        match err {
            LifeError::EnvParse { var, value } => {
                assert_eq!(var, "LIFE_DENSITY");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.workers = 0;
        assert!(matches!(config.validate(), Err(LifeError::InvalidConfig(_))));

        let mut config = GameConfig::default();
        config.cell_size = 2000;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.initial_density = 1.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.initial_frame_delay_ms = 5;
        assert!(config.validate().is_err());
    }
}
