#![cfg(feature = "viewer")]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use winit::dpi::LogicalSize;
use winit::event::{Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use crate::draw::{self, Canvas};
use crate::evolve::{EvoTrainer, NetController};
use crate::snapshot::Snapshot;
use crate::stepper::{Stepper, Tick};
use crate::world::World;

/// Flies the trainer's generations in a window at the configured tick rate.
/// Escape or closing the window stops between ticks; the champion so far is
/// saved to `save` on the way out.
pub fn run(world: Arc<World>, mut trainer: EvoTrainer, save: Option<PathBuf>) -> Result<()> {
    let (width, height) = (world.config.width, world.config.height);
    let event_loop = EventLoop::new();
    let mut input = WinitInputHelper::new();
    let window = WindowBuilder::new()
        .with_title("Flappy NN Evolution")
        .with_inner_size(LogicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)?;
    let mut pixels = {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, &window);
        Pixels::new(width, height, surface_texture)?
    };

    let mut stepper: Option<Stepper<NetController>> = trainer.begin_generation(&world)?;
    let mut snapshot = stepper.as_ref().map(Stepper::snapshot).unwrap_or_default();
    let tick_duration = Duration::from_secs_f64(1.0 / trainer.config().fps as f64);
    let mut ticks_per_frame: u32 = 1;
    let mut last_update = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::RedrawRequested(_) = event {
            let mut canvas = Canvas::new(pixels.frame_mut(), width, height);
            draw::render(&mut canvas, &snapshot, &world.config, &world.sprites);
            if let Err(err) = pixels.render() {
                log::error!("render failed: {err}");
                *control_flow = ControlFlow::Exit;
                return;
            }
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.close_requested() || input.destroyed() {
                if let Some(mut s) = stepper.take() {
                    s.abort();
                    trainer.end_generation(s.finish());
                }
                save_champion(&trainer, save.as_ref());
                *control_flow = ControlFlow::Exit;
                return;
            }
            if input.key_pressed(VirtualKeyCode::NumpadAdd) || input.key_pressed(VirtualKeyCode::Equals) {
                ticks_per_frame = (ticks_per_frame.saturating_mul(2)).min(64);
            }
            if input.key_pressed(VirtualKeyCode::NumpadSubtract) || input.key_pressed(VirtualKeyCode::Minus) {
                ticks_per_frame = (ticks_per_frame / 2).max(1);
            }

            if last_update.elapsed() >= tick_duration {
                last_update = Instant::now();
                match advance(&world, &mut trainer, &mut stepper, ticks_per_frame) {
                    Ok(Some(latest)) => snapshot = latest,
                    Ok(None) => {
                        save_champion(&trainer, save.as_ref());
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                    Err(err) => {
                        log::error!("{err}");
                        *control_flow = ControlFlow::Exit;
                        return;
                    }
                }
            }
            window.request_redraw();
        }
    });
}

// Steps up to `ticks` ticks, rolling over into the next generation when the
// current one dies out. `None` once the trainer is done.
fn advance(
    world: &Arc<World>,
    trainer: &mut EvoTrainer,
    slot: &mut Option<Stepper<NetController>>,
    ticks: u32,
) -> Result<Option<Snapshot>> {
    let limit = trainer.config().tick_limit;
    for _ in 0..ticks {
        let Some(stepper) = slot.as_mut() else {
            return Ok(None);
        };
        let Ok(tick) = stepper.step();
        let cut = limit.is_some_and(|l| stepper.tick() >= l);
        if matches!(tick, Tick::Terminated) || cut {
            if let Some(mut done) = slot.take() {
                done.abort();
                trainer.end_generation(done.finish());
            }
            *slot = trainer.begin_generation(world)?;
        }
    }
    Ok(slot.as_ref().map(Stepper::snapshot))
}

fn save_champion(trainer: &EvoTrainer, path: Option<&PathBuf>) {
    if let (Some(champion), Some(path)) = (trainer.champion(), path) {
        if let Err(err) = champion.save(path) {
            log::error!("{err}");
        }
    }
}
