#![allow(dead_code)]

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::anyhow;
use lantern::{
    Driver, Event, Gpu, InputEvent, Ops, Platform, ProfileEvent, RenderContext, Router, Size,
    TextInputState, Window, WindowHandle, WindowOptions,
};
use parking_lot::Mutex;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Everything the mock platform, driver and GPU observe.
#[derive(Default)]
pub struct Recorder {
    pub animating: Mutex<Vec<bool>>,
    pub text_input: Mutex<Vec<TextInputState>>,
    pub gpu_calls: Mutex<Vec<&'static str>>,
    pub live_gpus: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub fail_binding: AtomicBool,
    pub fail_context: AtomicBool,
    pub fail_next_flush: AtomicBool,
}

impl Recorder {
    pub fn gpu_held(&self) -> bool {
        self.live_gpus.load(Ordering::SeqCst) > 0
    }

    pub fn gpu_count(&self, call: &str) -> usize {
        self.gpu_calls.lock().iter().filter(|c| **c == call).count()
    }
}

struct MockDriver(Arc<Recorder>);

impl Driver for MockDriver {
    fn set_animating(&self, anim: bool) {
        self.0.animating.lock().push(anim);
    }

    fn set_text_input(&self, state: TextInputState) {
        self.0.text_input.lock().push(state);
    }
}

struct MockContext;

impl RenderContext for MockContext {
    fn make_current(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

struct MockGpu {
    rec: Arc<Recorder>,
    ctx: Box<dyn RenderContext>,
}

impl Gpu for MockGpu {
    fn draw(&mut self, _profiling: bool, _size: Size, _ops: &Ops) {
        self.rec.gpu_calls.lock().push("draw");
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.rec.gpu_calls.lock().push("flush");
        if self.rec.fail_next_flush.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("context lost"));
        }
        self.ctx.present()
    }

    fn refresh(&mut self) {
        self.rec.gpu_calls.lock().push("refresh");
    }

    fn release(&mut self) {
        self.rec.gpu_calls.lock().push("release");
        self.ctx.release();
        self.rec.live_gpus.fetch_sub(1, Ordering::SeqCst);
    }

    fn timings(&self) -> String {
        "gpu:1ms".to_string()
    }
}

pub struct MockPlatform(pub Arc<Recorder>);

impl Platform for MockPlatform {
    fn create_window(&self, window: WindowHandle, _opts: &WindowOptions) -> anyhow::Result<()> {
        self.0.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_binding.load(Ordering::SeqCst) {
            return Err(anyhow!("no display server"));
        }
        window.set_driver(Arc::new(MockDriver(self.0.clone())));
        Ok(())
    }

    fn new_context(&self, _driver: &Arc<dyn Driver>) -> anyhow::Result<Box<dyn RenderContext>> {
        if self.0.fail_context.load(Ordering::SeqCst) {
            return Err(anyhow!("unsupported GL version"));
        }
        let mut ctx = MockContext;
        ctx.make_current()?;
        Ok(Box::new(ctx))
    }

    fn new_gpu(&self, ctx: Box<dyn RenderContext>) -> anyhow::Result<Box<dyn Gpu>> {
        self.0.gpu_calls.lock().push("new_gpu");
        self.0.live_gpus.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockGpu {
            rec: self.0.clone(),
            ctx,
        }))
    }
}

/// Router behaviour, adjustable while the window owns the router.
#[derive(Default)]
pub struct RouterState {
    pub redraw_on_input: AtomicBool,
    pub profiling: AtomicBool,
    pub input_state: Mutex<TextInputState>,
    pub redraw_time: Mutex<Option<Instant>>,
    pub profiles: Mutex<Vec<ProfileEvent>>,
    pub inputs: AtomicUsize,
    pub frames: AtomicUsize,
}

pub struct MockRouter(pub Arc<RouterState>);

impl Router for MockRouter {
    fn add(&mut self, _event: &InputEvent) -> bool {
        self.0.inputs.fetch_add(1, Ordering::SeqCst);
        self.0.redraw_on_input.load(Ordering::SeqCst)
    }

    fn frame(&mut self, _ops: &Ops) {
        self.0.frames.fetch_add(1, Ordering::SeqCst);
    }

    fn profiling(&self) -> bool {
        self.0.profiling.load(Ordering::SeqCst)
    }

    fn input_state(&self) -> TextInputState {
        *self.0.input_state.lock()
    }

    fn redraw_time(&self) -> Option<Instant> {
        *self.0.redraw_time.lock()
    }

    fn add_profile(&mut self, event: ProfileEvent) {
        self.0.profiles.lock().push(event);
    }
}

pub struct Harness {
    pub window: Window,
    pub handle: WindowHandle,
    pub rec: Arc<Recorder>,
    pub router: Arc<RouterState>,
}

pub fn harness() -> Harness {
    harness_with(Recorder::default())
}

pub fn harness_with(rec: Recorder) -> Harness {
    init_logging();
    let rec = Arc::new(rec);
    let router = Arc::new(RouterState::default());
    let window = Window::new(
        WindowOptions::default(),
        Arc::new(MockPlatform(rec.clone())),
        Box::new(MockRouter(router.clone())),
    )
    .expect("valid options");
    let handle = window.handle();
    Harness {
        window,
        handle,
        rec,
        router,
    }
}

/// Feeds events to the window from a separate platform thread.
pub fn platform_thread(
    handle: &WindowHandle,
    events: impl IntoIterator<Item = Event> + Send + 'static,
) -> thread::JoinHandle<()> {
    let handle = handle.clone();
    thread::spawn(move || {
        for event in events {
            handle.event(event);
        }
    })
}

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub fn recv(window: &Window) -> Event {
    window
        .events()
        .recv_timeout(TIMEOUT)
        .expect("event within timeout")
}

/// Polls `cond` until it holds or the timeout expires.
pub fn eventually(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
