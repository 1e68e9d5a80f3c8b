use crate::simulation::{FrameDelay, Simulation};
use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// One-shot actions triggered by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    StepOnce,
    Reseed,
    Clear,
    Quit,
}

/// Held keys and mouse state, polled once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    faster_held: bool,
    slower_held: bool,
    painting: bool,
    cursor: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track held keys; return a command for fresh presses of one-shot keys.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) -> Option<Command> {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::ArrowUp => self.faster_held = pressed,
            KeyCode::ArrowDown => self.slower_held = pressed,
            _ => {}
        }
        if !pressed || repeat {
            return None;
        }
        match key {
            KeyCode::Space => Some(Command::TogglePause),
            KeyCode::ArrowRight => Some(Command::StepOnce),
            KeyCode::KeyR => Some(Command::Reseed),
            KeyCode::KeyC => Some(Command::Clear),
            KeyCode::Escape => Some(Command::Quit),
            _ => None,
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.painting = state == ElementState::Pressed;
        }
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
    }

    pub fn handle_cursor_left(&mut self) {
        self.cursor = None;
    }

    // Keys can be released while the window is unfocused; forget everything held.
    pub fn release_all(&mut self) {
        self.faster_held = false;
        self.slower_held = false;
        self.painting = false;
    }

    /// Per-frame effect of whatever is currently held.
    pub fn apply(&self, sim: &mut Simulation, delay: &mut FrameDelay, surface: Vec2) {
        if self.painting {
            if let Some((row, col)) = self
                .cursor
                .and_then(|cursor| sim.grid().cell_at(cursor, surface))
            {
                sim.paint(row, col);
            }
        }
        if self.faster_held {
            delay.faster();
        }
        if self.slower_held {
            delay.slower();
        }
    }
}

impl Command {
    /// Run the command against the simulation. Returns false when the app should exit.
    pub fn execute(self, sim: &mut Simulation) -> bool {
        match self {
            Command::TogglePause => sim.toggle_pause(),
            Command::StepOnce => {
                if sim.is_paused() {
                    sim.step();
                }
            }
            Command::Reseed => {
                log::info!("Reseeding grid...");
                sim.reseed();
            }
            Command::Clear => {
                log::info!("Clearing grid");
                sim.clear();
            }
            Command::Quit => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::grid::Grid;

    fn small_sim() -> Simulation {
        let config = GameConfig {
            workers: 1,
            seed: Some(5),
            ..GameConfig::default()
        };
        Simulation::from_grid(Grid::new(10, 10), &config).unwrap()
    }

    #[test]
    fn one_shot_keys_ignore_repeats_and_releases() {
        let mut input = InputState::new();
        assert_eq!(
            input.handle_key(KeyCode::Space, ElementState::Pressed, false),
            Some(Command::TogglePause)
        );
        assert_eq!(input.handle_key(KeyCode::Space, ElementState::Pressed, true), None);
        assert_eq!(input.handle_key(KeyCode::Space, ElementState::Released, false), None);
        assert_eq!(
            input.handle_key(KeyCode::Escape, ElementState::Pressed, false),
            Some(Command::Quit)
        );
    }

    #[test]
    fn held_arrow_keeps_adjusting_every_frame() {
        let mut input = InputState::new();
        let mut sim = small_sim();
        let mut delay = FrameDelay::from_config(&GameConfig::default());
        input.handle_key(KeyCode::ArrowDown, ElementState::Pressed, false);
        for _ in 0..3 {
            input.apply(&mut sim, &mut delay, Vec2::new(100.0, 100.0));
        }
        assert_eq!(delay.millis(), 80);

        input.handle_key(KeyCode::ArrowDown, ElementState::Released, false);
        input.apply(&mut sim, &mut delay, Vec2::new(100.0, 100.0));
        assert_eq!(delay.millis(), 80);
    }

    #[test]
    fn dragging_paints_cells_under_cursor() {
        let mut input = InputState::new();
        let mut sim = small_sim();
        let mut delay = FrameDelay::from_config(&GameConfig::default());
        let surface = Vec2::new(100.0, 100.0);

        input.handle_cursor_moved(PhysicalPosition::new(15.0, 25.0));
        input.apply(&mut sim, &mut delay, surface);
        assert_eq!(sim.population(), 0, "no paint without the button");

        input.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.apply(&mut sim, &mut delay, surface);
        input.handle_cursor_moved(PhysicalPosition::new(95.0, 95.0));
        input.apply(&mut sim, &mut delay, surface);
        assert!(sim.grid().get(2, 1));
        assert!(sim.grid().get(9, 9));

        input.handle_cursor_moved(PhysicalPosition::new(150.0, 50.0));
        input.apply(&mut sim, &mut delay, surface);
        assert_eq!(sim.population(), 2);
    }

    #[test]
    fn step_once_only_while_paused() {
        let mut sim = small_sim();
        assert!(Command::StepOnce.execute(&mut sim));
        assert_eq!(sim.generation(), 0);
        Command::TogglePause.execute(&mut sim);
        Command::StepOnce.execute(&mut sim);
        assert_eq!(sim.generation(), 1);
        assert!(!Command::Quit.execute(&mut sim));
    }
}
