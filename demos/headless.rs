use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use lantern::{
    DestroyEvent, Driver, DrawEvent, Event, Gpu, InputEvent, Ops, Platform, ProfileEvent,
    RenderContext, Result, Router, Size, Stage, StageEvent, TextInputState, Vec2, Vec4,
    WindowBuilder, WindowHandle, WindowOptions,
};

struct LogDriver;

impl Driver for LogDriver {
    fn set_animating(&self, anim: bool) {
        log::info!("driver: animating={anim}");
    }

    fn set_text_input(&self, state: TextInputState) {
        log::info!("driver: keyboard {state:?}");
    }
}

struct NullContext;

impl RenderContext for NullContext {
    fn make_current(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

struct LogGpu {
    ctx: Box<dyn RenderContext>,
    frames: usize,
}

impl Gpu for LogGpu {
    fn draw(&mut self, _profiling: bool, size: Size, ops: &Ops) {
        self.frames += 1;
        log::info!("gpu: frame {} at {size}, {} ops", self.frames, ops.len());
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.ctx.present()
    }

    fn refresh(&mut self) {
        log::info!("gpu: refresh");
    }

    fn release(&mut self) {
        self.ctx.release();
        log::info!("gpu: release");
    }

    fn timings(&self) -> String {
        format!("frames:{}", self.frames)
    }
}

/// Pretends to be a display server: shows the window, asks for a few
/// frames, hides it and closes it.
struct SimulatedPlatform;

impl Platform for SimulatedPlatform {
    fn create_window(&self, window: WindowHandle, opts: &WindowOptions) -> anyhow::Result<()> {
        log::info!("platform: binding {:?}", opts.title);
        thread::Builder::new()
            .name("platform".into())
            .spawn(move || {
                window.set_driver(Arc::new(LogDriver));
                window.event(Event::Stage(StageEvent {
                    stage: Stage::Running,
                }));
                for i in 0..3 {
                    window.event(Event::Input(InputEvent::PointerMove {
                        pos: Vec2::new(10.0 * i as f32, 5.0),
                    }));
                    window.event(Event::Draw(DrawEvent::new(Size::new(800, 600))));
                    thread::sleep(Duration::from_millis(16));
                }
                window.event(Event::Stage(StageEvent {
                    stage: Stage::Visible,
                }));
                window.event(Event::Destroy(DestroyEvent::default()));
            })?;
        Ok(())
    }

    fn new_context(&self, _driver: &Arc<dyn Driver>) -> anyhow::Result<Box<dyn RenderContext>> {
        Ok(Box::new(NullContext))
    }

    fn new_gpu(&self, ctx: Box<dyn RenderContext>) -> anyhow::Result<Box<dyn Gpu>> {
        Ok(Box::new(LogGpu { ctx, frames: 0 }))
    }
}

#[derive(Default)]
struct PointerRouter {
    last: Option<Vec2>,
    profiles: Vec<ProfileEvent>,
}

impl Router for PointerRouter {
    fn add(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerMove { pos } => {
                let moved = self.last != Some(*pos);
                self.last = Some(*pos);
                moved
            }
            _ => false,
        }
    }

    fn frame(&mut self, _ops: &Ops) {}

    fn profiling(&self) -> bool {
        true
    }

    fn input_state(&self) -> TextInputState {
        TextInputState::Keep
    }

    fn redraw_time(&self) -> Option<Instant> {
        None
    }

    fn add_profile(&mut self, event: ProfileEvent) {
        log::info!("profile: {}", event.timings);
        self.profiles.push(event);
    }
}

fn main() -> Result<()> {
    lantern::init_logging();

    let window = WindowBuilder::new()
        .with_title("Headless Demo")
        .build(Arc::new(SimulatedPlatform), Box::new(PointerRouter::default()))?;

    let mut ops = Ops::new();
    for event in window.events() {
        match event {
            Event::Draw(e) => {
                ops.reset();
                ops.draw_rect(
                    Vec2::new(100.0, 100.0),
                    Vec2::new(200.0, 150.0),
                    Vec4::new(0.3, 0.6, 0.9, 1.0),
                );
                ops.draw_text("Hello Lantern!", Vec2::new(50.0, 50.0), Vec4::ONE, 24.0);
                log::info!("app: drawing {}", e.size);
                window.draw(&ops);
            }
            Event::Stage(e) => log::info!("app: stage {:?}", e.stage),
            Event::Destroy(e) => match e.cause {
                Some(cause) => log::error!("app: window died: {cause}"),
                None => log::info!("app: window closed"),
            },
            _ => {}
        }
    }
    Ok(())
}
