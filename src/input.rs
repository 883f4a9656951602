use std::{ops::Deref, time::Instant};

use glam::Vec2;
use parking_lot::MutexGuard;

use crate::renderer::Ops;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Raw input delivered by the platform.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, pos: Vec2 },
    PointerUp { button: MouseButton, pos: Vec2 },
    PointerMove { pos: Vec2 },
    PointerLeave,
    Wheel { delta: Vec2 },

    KeyDown { key: String },
    KeyUp { key: String },
    CharInput { ch: char },

    FocusIn,
    FocusOut,
}

/// Virtual keyboard state requested by the input handlers of a frame.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TextInputState {
    #[default]
    Keep,
    Close,
    Open,
    /// An editor gained focus; it wants one more frame to settle.
    Focus,
}

impl TextInputState {
    /// Whether the platform keyboard needs to hear about this state.
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Open | Self::Close)
    }
}

/// Frame timing report, fed back into the router while profiling.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProfileEvent {
    pub timings: String,
}

/// Input aggregation and routing for a window.
///
/// The window consults its router for redraw decisions and deadlines but
/// never inspects how handlers are matched to events.
pub trait Router: Send {
    /// Queues an input event. Returns whether a redraw is needed.
    fn add(&mut self, event: &InputEvent) -> bool;

    /// Collects the input handlers declared by a submitted frame.
    fn frame(&mut self, ops: &Ops);

    /// Whether some handler asked for profiling data.
    fn profiling(&self) -> bool;

    /// Keyboard state requested by the last frame.
    fn input_state(&self) -> TextInputState;

    /// The earliest redraw requested by the last frame, if any.
    fn redraw_time(&self) -> Option<Instant>;

    fn add_profile(&mut self, event: ProfileEvent);
}

/// Read-only view onto the window's router.
pub struct Queue<'a> {
    router: MutexGuard<'a, Box<dyn Router>>,
}

impl<'a> Queue<'a> {
    pub(crate) fn new(router: MutexGuard<'a, Box<dyn Router>>) -> Self {
        Self { router }
    }
}

impl Deref for Queue<'_> {
    type Target = dyn Router;

    fn deref(&self) -> &Self::Target {
        &**self.router
    }
}
