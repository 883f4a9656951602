use std::{
    mem,
    sync::{Arc, Weak},
    thread,
    time::Instant,
};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{
    WindowError, debug,
    driver::{Driver, Platform},
    input::{Router, TextInputState},
    renderer::GpuLifecycle,
};

use super::{
    Size,
    clock::FrameClock,
    events::{Delivery, DestroyEvent, Event, Stage},
};

/// Everything the event sequencer ingests.
pub(crate) enum Incoming {
    Event(Event),
    /// The frame clock's timer reached the deadline armed for this
    /// generation.
    FrameDeadline(u64),
}

/// Window fields guarded by the state lock.
pub(crate) struct State {
    /// `None` once the window is dead.
    pub driver: Option<Arc<dyn Driver>>,
    pub stage: Stage,
    pub size: Size,
    /// The next draw must refresh cached GPU state.
    pub sync_gpu: bool,
    pub clock: FrameClock,
    pub draw_start: Option<Instant>,
    pub last_frame: Option<Instant>,
    pub text_input: TextInputState,
}

impl State {
    pub fn is_alive(&self) -> bool {
        self.driver.is_some()
    }

    pub fn update_animation(&mut self) {
        let running = self.stage >= Stage::Running;
        self.clock
            .update(Instant::now(), running, self.driver.as_deref());
    }

    /// Forwards keyboard changes to the driver; only opening and closing
    /// reach the platform.
    pub fn set_text_input(&mut self, state: TextInputState) {
        if state != self.text_input && state.is_edge() {
            if let Some(driver) = &self.driver {
                driver.set_text_input(state);
            }
        }
        if state == TextInputState::Focus {
            self.clock.request_frame(None);
            self.update_animation();
        }
        self.text_input = state;
    }

    /// Applies an event's effect on the window fields. `wants_redraw` is the
    /// router's verdict on an input event.
    fn apply(&mut self, event: &Event, now: Instant, wants_redraw: bool) -> Effect {
        match event {
            Event::Input(_) => {
                if wants_redraw {
                    self.clock.request_frame(None);
                }
                Effect::FORWARD
            }
            Event::Command(_) => Effect::ACK,
            Event::Destroy(_) => {
                self.driver = None;
                Effect {
                    died: true,
                    ..Effect::FORWARD
                }
            }
            Event::Stage(e) => {
                log::debug!("stage {:?} -> {:?}", self.stage, e.stage);
                self.stage = e.stage;
                self.sync_gpu = true;
                Effect::ACK
            }
            Event::Draw(e) => {
                if e.size == Size::ZERO {
                    panic!("internal error: zero-sized draw");
                }
                if self.stage < Stage::Running {
                    log::trace!("dropping draw event while {:?}", self.stage);
                    return Effect::default();
                }
                self.draw_start = Some(now);
                self.clock.clear();
                self.sync_gpu = e.sync();
                self.size = e.size;
                Effect::ACK
            }
        }
    }
}

/// What ingesting one event requires of the sequencer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct Effect {
    forward: bool,
    ack: bool,
    died: bool,
}

impl Effect {
    const FORWARD: Self = Self {
        forward: true,
        ack: false,
        died: false,
    };
    const ACK: Self = Self {
        forward: true,
        ack: true,
        died: false,
    };
}

pub(crate) struct Shared {
    /// The ingestion lock. Holds the sending half of the event sequence
    /// until the window is destroyed.
    events: Mutex<Option<flume::Sender<Delivery>>>,
    pub state: Mutex<State>,
    pub router: Mutex<Box<dyn Router>>,
    pub gpu: Mutex<GpuLifecycle>,
    pub platform: Arc<dyn Platform>,
    me: Weak<Shared>,
}

impl Shared {
    pub fn new(
        platform: Arc<dyn Platform>,
        router: Box<dyn Router>,
        events: flume::Sender<Delivery>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Shared>| {
            let wake = {
                let me = me.clone();
                Arc::new(move |generation: u64| {
                    if let Some(shared) = me.upgrade() {
                        shared.ingest(Incoming::FrameDeadline(generation));
                    }
                })
            };
            Self {
                events: Mutex::new(Some(events)),
                state: Mutex::new(State {
                    driver: None,
                    stage: Stage::NotRunning,
                    size: Size::ZERO,
                    sync_gpu: false,
                    clock: FrameClock::new(wake),
                    draw_start: None,
                    last_frame: None,
                    text_input: TextInputState::Keep,
                }),
                router: Mutex::new(router),
                gpu: Mutex::new(GpuLifecycle::default()),
                platform,
                me: me.clone(),
            }
        })
    }

    pub fn set_driver(&self, driver: Option<Arc<dyn Driver>>) {
        let mut st = self.state.lock();
        st.driver = driver;
        st.update_animation();
    }

    /// Kills the window: the driver is dropped right away and a destroy
    /// event carrying `cause` goes through the regular event path.
    pub fn destroy(&self, cause: Option<WindowError>) {
        self.set_driver(None);
        let Some(shared) = self.me.upgrade() else {
            return;
        };
        let spawned = thread::Builder::new()
            .name("window-destroy".into())
            .spawn(move || {
                shared.ingest(Incoming::Event(Event::Destroy(DestroyEvent { cause })));
            });
        if let Err(err) = spawned {
            log::error!("failed to deliver destroy event: {err}");
        }
    }

    /// Runs one event through the window, end to end.
    ///
    /// Only one event is in flight at a time. Delivery blocks until the
    /// application receives the event, and events that need acknowledging
    /// block until the application asks for the next one. GPU resources
    /// are released or refreshed only after that.
    pub fn ingest(&self, incoming: Incoming) {
        let mut events = self.events.lock();
        let Some(tx) = events.as_ref() else {
            if let Incoming::Event(event) = &incoming {
                log::debug!(
                    "window destroyed, dropping {} event",
                    debug::event_name(event)
                );
            }
            return;
        };

        // The router lock may be held by the application; never wait on it
        // under the state lock.
        let wants_redraw = match &incoming {
            Incoming::Event(Event::Input(input)) => self.router.lock().add(input),
            _ => false,
        };

        let now = Instant::now();
        let (incoming, effect, stage) = {
            let mut st = self.state.lock();
            let effect = match &incoming {
                Incoming::Event(event) => st.apply(event, now, wants_redraw),
                Incoming::FrameDeadline(generation) => {
                    st.clock.deadline_reached(*generation, now);
                    Effect::default()
                }
            };
            let stage = st.stage;
            st.update_animation();
            (incoming, effect, stage)
        };

        if let (true, Incoming::Event(event)) = (effect.forward, incoming) {
            log::trace!("delivering {} event", debug::event_name(&event));
            let (ack, done) = if effect.ack {
                let (ack, done) = oneshot::channel();
                (Some(ack), Some(done))
            } else {
                (None, None)
            };
            if tx.send(Delivery { event, ack }).is_err() {
                log::debug!("event receiver dropped");
            }
            if let Some(done) = done {
                // Fails immediately when the receiver is gone.
                let _ = done.blocking_recv();
            }
        }

        {
            let mut gpu = self.gpu.lock();
            if gpu.is_held() {
                let sync = mem::take(&mut self.state.lock().sync_gpu);
                if effect.died || stage < Stage::Running {
                    gpu.release();
                } else if sync {
                    gpu.refresh();
                }
            }
        }

        if effect.died {
            *events = None;
            log::debug!("window destroyed, event sequence closed");
        }
    }
}
