pub mod debug;
pub mod driver;
pub mod error;
pub mod input;
pub mod renderer;
pub mod windowing;

pub use driver::{Driver, Platform};
pub use error::WindowError;
pub use input::{InputEvent, MouseButton, ProfileEvent, Queue, Router, TextInputState};
pub use renderer::{Gpu, Ops, RenderContext, RenderPrimative};
pub use windowing::{
    CommandEvent, CommandKind, DestroyEvent, DrawEvent, Event, Events, Size, Stage, StageEvent,
    Unit, Value, Window, WindowBuilder, WindowHandle, WindowOptions,
};

pub use glam::{UVec2, Vec2, Vec4};

pub type Result<T> = std::result::Result<T, WindowError>;

pub fn init_logging() {
    env_logger::init();
}
