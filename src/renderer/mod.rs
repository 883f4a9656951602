pub mod gpu;
pub mod ops;

use crate::windowing::Size;

pub(crate) use gpu::GpuLifecycle;
pub use ops::{Ops, RenderPrimative};

/// A native rendering context (a GL context, a swapchain, ...).
pub trait RenderContext: Send {
    fn make_current(&mut self) -> anyhow::Result<()>;

    fn present(&mut self) -> anyhow::Result<()>;

    fn release(&mut self);
}

/// A GPU backend executing [`Ops`].
pub trait Gpu: Send {
    /// Encodes a frame. The work is submitted by the next [`Gpu::flush`].
    fn draw(&mut self, profiling: bool, size: Size, ops: &Ops);

    /// Waits for and presents the previously drawn frame.
    ///
    /// An error means the backend lost its context and must be recreated.
    fn flush(&mut self) -> anyhow::Result<()>;

    /// Discards cached state after the context may have been invalidated.
    fn refresh(&mut self);

    fn release(&mut self);

    /// Human readable timings of the last frame.
    fn timings(&self) -> String;
}
