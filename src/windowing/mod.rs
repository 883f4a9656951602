pub(crate) mod clock;
pub mod events;
pub mod options;
pub(crate) mod sequencer;

use std::{
    mem,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use crate::{
    Result,
    driver::{Driver, Platform},
    input::{ProfileEvent, Queue, Router},
    renderer::Ops,
};

pub use events::{
    CommandEvent, CommandKind, DestroyEvent, DrawEvent, Event, Events, Stage, StageEvent,
};
pub use options::{Unit, Value, WindowBuilder, WindowOptions};

use sequencer::{Incoming, Shared};

/// Drawable size in pixels.
pub type Size = glam::UVec2;

/// An application window.
///
/// Events arrive through [`Window::events`]; frames are submitted with
/// [`Window::draw`] in response to [`Event::Draw`].
pub struct Window {
    shared: Arc<Shared>,
    events: Events,
}

impl Window {
    /// Creates a window from a set of hints.
    ///
    /// Only invalid options are reported here. If the platform fails to
    /// bind a native window, the window is returned anyway and delivers a
    /// [`DestroyEvent`] carrying the cause.
    pub fn new(
        opts: WindowOptions,
        platform: Arc<dyn Platform>,
        router: Box<dyn Router>,
    ) -> Result<Self> {
        opts.validate()?;
        let (tx, rx) = flume::bounded(0);
        let shared = Shared::new(platform.clone(), router, tx);
        let window = Self {
            shared,
            events: Events::new(rx),
        };
        log::info!("Creating window {:?}...", opts.title);
        if let Err(err) = platform.create_window(window.handle(), &opts) {
            log::warn!("failed to create window: {err:#}");
            window
                .shared
                .destroy(Some(crate::WindowError::Binding(err)));
        }
        Ok(window)
    }

    /// A handle for the platform side of this window.
    pub fn handle(&self) -> WindowHandle {
        WindowHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    /// Read access to the input router. Input events wait while the view is
    /// held, so don't hold it across [`Window::draw`] or while receiving
    /// events.
    pub fn queue(&self) -> Queue<'_> {
        Queue::new(self.shared.router.lock())
    }

    /// Draws a frame and schedules the next one.
    pub fn draw(&self, ops: &Ops) {
        let shared = &self.shared;
        let (draw_dur, stage, sync, size, driver) = {
            let mut st = shared.state.lock();
            let draw_dur = st
                .draw_start
                .take()
                .map(|start| start.elapsed())
                .unwrap_or_default();
            let sync = mem::take(&mut st.sync_gpu);
            (draw_dur, st.stage, sync, st.size, st.driver.clone())
        };
        let Some(driver) = driver else {
            return;
        };
        if stage < Stage::Running {
            return;
        }

        let mut gpu = shared.gpu.lock();
        if let Err(cause) = gpu.prepare(shared.platform.as_ref(), &driver, sync) {
            log::error!("{cause}");
            drop(gpu);
            shared.destroy(Some(cause));
            return;
        }
        let profiling = shared.router.lock().profiling();
        let gpu_timings = gpu.draw(profiling, size, ops);
        drop(gpu);
        shared.router.lock().frame(ops);

        let now = Instant::now();
        let frame_dur = shared
            .state
            .lock()
            .last_frame
            .replace(now)
            .map(|last| now - last)
            .unwrap_or_default();
        let (input_state, redraw_at) = {
            let mut router = shared.router.lock();
            if let Some(gpu_timings) = &gpu_timings {
                router.add_profile(ProfileEvent {
                    timings: profile_timings(frame_dur, draw_dur, gpu_timings),
                });
            }
            (router.input_state(), router.redraw_time())
        };

        let mut st = shared.state.lock();
        st.set_text_input(input_state);
        if gpu_timings.is_some() {
            st.clock.request_frame(None);
        }
        if let Some(at) = redraw_at {
            st.clock.request_frame(Some(at));
        }
        st.update_animation();
    }

    /// Requests a frame as soon as possible.
    pub fn redraw(&self) {
        let mut st = self.shared.state.lock();
        if !st.is_alive() {
            return;
        }
        st.clock.request_frame(None);
        st.update_animation();
    }

    pub fn size(&self) -> Size {
        self.shared.state.lock().size
    }

    pub fn stage(&self) -> Stage {
        self.shared.state.lock().stage
    }

    /// Closes the window. The final [`DestroyEvent`] arrives through the
    /// event sequence like any other event.
    pub fn close(&self) {
        self.shared.destroy(None);
    }
}

/// The platform's handle onto a [`Window`].
///
/// Doesn't keep the window alive; calls on a handle whose window was
/// dropped do nothing.
#[derive(Clone)]
pub struct WindowHandle {
    shared: Weak<Shared>,
}

impl WindowHandle {
    /// Hands over the native driver once the window is bound.
    pub fn set_driver(&self, driver: Arc<dyn Driver>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.set_driver(Some(driver));
        }
    }

    /// Delivers a platform event to the window.
    ///
    /// Blocks until the application has received the event, and for events
    /// it must fully handle (stage changes, draws, commands) until it has
    /// asked for the next one. Must not be called from within an async
    /// runtime.
    pub fn event(&self, event: Event) {
        if let Some(shared) = self.shared.upgrade() {
            shared.ingest(Incoming::Event(event));
        }
    }

    pub fn is_alive(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.state.lock().is_alive(),
            None => false,
        }
    }
}

const PROFILE_QUANTUM: Duration = Duration::from_micros(100);

fn round_to(d: Duration, q: Duration) -> Duration {
    let q = q.as_nanos();
    let rounded = (d.as_nanos() + q / 2) / q * q;
    Duration::from_nanos(rounded as u64)
}

fn profile_timings(frame: Duration, cpu: Duration, gpu: &str) -> String {
    let frame = format!("{:?}", round_to(frame, PROFILE_QUANTUM));
    let cpu = format!("{:?}", round_to(cpu, PROFILE_QUANTUM));
    format!("tot:{frame:>7} cpu:{cpu:>7} {gpu}")
}
