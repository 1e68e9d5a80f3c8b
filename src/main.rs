mod config;
mod constants;
mod error;
mod grid;
mod hud;
mod input;
mod renderer;
mod rules;
mod simulation;
mod utils;

use crate::config::GameConfig;
use crate::constants::{TITLE_UPDATE_INTERVAL_SECS, WINDOW_TITLE};
use crate::input::InputState;
use crate::renderer::Renderer;
use crate::simulation::{FrameDelay, Simulation};
use glam::Vec4;
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::PhysicalKey,
    window::WindowBuilder,
};

// --- Main Function ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    run()?;
    Ok(())
}

fn run() -> error::Result<()> {
    let game_config = GameConfig::from_env()?;
    log::info!("Controls:");
    log::info!("  Left Mouse  - Paint cells");
    log::info!("  Up/Down     - Shorter / longer frame delay (hold)");
    log::info!("  Space       - Pause / Resume");
    log::info!("  Right Arrow - Step (when paused)");
    log::info!("  R           - Reseed grid");
    log::info!("  C           - Clear grid");
    log::info!("  Escape      - Quit");

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(
                game_config.window_width,
                game_config.window_height,
            ))
            .build(&event_loop)?,
    );

    let mut simulation = Simulation::new(&game_config)?;
    let mut renderer = pollster::block_on(Renderer::new(
        window.clone(),
        simulation.grid().rows(),
        simulation.grid().cols(),
    ))?;
    let mut frame_delay = FrameDelay::from_config(&game_config);
    let mut input = InputState::new();
    let cell_color = Vec4::from_array(game_config.cell_color);

    let mut next_frame = Instant::now();
    let mut last_title_update = Instant::now();
    let mut frames_since_title_update = 0u32;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| match event {
        Event::AboutToWait => {
            // Input, update, then draw: once per frame delay.
            let now = Instant::now();
            if now >= next_frame {
                input.apply(&mut simulation, &mut frame_delay, renderer.surface_size());
                if !simulation.is_paused() {
                    simulation.step();
                }
                next_frame = now + frame_delay.as_duration();
                window.request_redraw();
            }
            elwt.set_control_flow(ControlFlow::WaitUntil(next_frame));
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(physical_size) => renderer.resize(physical_size),
            WindowEvent::ScaleFactorChanged { .. } => renderer.resize(window.inner_size()),
            WindowEvent::Focused(false) => input.release_all(),
            WindowEvent::CursorMoved { position, .. } => input.handle_cursor_moved(position),
            WindowEvent::CursorLeft { .. } => input.handle_cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => {
                input.handle_mouse_button(button, state)
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let PhysicalKey::Code(code) = key_event.physical_key {
                    if let Some(command) =
                        input.handle_key(code, key_event.state, key_event.repeat)
                    {
                        if !command.execute(&mut simulation) {
                            elwt.exit();
                        }
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                frames_since_title_update += 1;
                let now = Instant::now();
                let elapsed_secs = now.duration_since(last_title_update).as_secs_f64();
                if elapsed_secs >= TITLE_UPDATE_INTERVAL_SECS {
                    let current_fps = frames_since_title_update as f64 / elapsed_secs;
                    last_title_update = now;
                    frames_since_title_update = 0;

                    let paused_text = if simulation.is_paused() {
                        " [PAUSED]"
                    } else {
                        ""
                    };
                    window.set_title(&format!(
                        "{} - Gen: {} - Pop: {} - FPS: {:.1}{}",
                        WINDOW_TITLE,
                        simulation.generation(),
                        simulation.population(),
                        current_fps,
                        paused_text
                    ));
                }

                let overlay = if simulation.is_paused() {
                    format!("Frame Delay: {} ms [PAUSED]", frame_delay.millis())
                } else {
                    format!("Frame Delay: {} ms", frame_delay.millis())
                };
                match renderer.render(simulation.grid(), cell_color, &overlay) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.reconfigure()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("WGPU Error: OutOfMemory");
                        elwt.exit();
                    }
                    Err(e) => log::warn!("WGPU Error: {:?}", e),
                }
            }
            _ => {}
        },
        _ => {}
    })?;
    Ok(())
}
