use std::sync::Arc;

use crate::{
    input::TextInputState,
    renderer::{Gpu, RenderContext},
    windowing::{WindowHandle, WindowOptions},
};

/// The native half of a window, implemented by the platform layer.
pub trait Driver: Send + Sync {
    /// Sets the animation flag. While the window is animating, draw events
    /// are delivered as fast as the display can handle them.
    fn set_animating(&self, anim: bool);

    /// Updates the virtual keyboard state.
    fn set_text_input(&self, state: TextInputState);
}

/// Window creation and GPU bootstrap for one platform.
pub trait Platform: Send + Sync + 'static {
    /// Starts binding a native window to `window`.
    ///
    /// The options are hints. On success the platform hands its [`Driver`]
    /// over later through [`WindowHandle::set_driver`] and starts delivering
    /// events through [`WindowHandle::event`].
    fn create_window(&self, window: WindowHandle, opts: &WindowOptions) -> anyhow::Result<()>;

    /// Creates a rendering context bound to the native window behind `driver`.
    fn new_context(&self, driver: &Arc<dyn Driver>) -> anyhow::Result<Box<dyn RenderContext>>;

    /// Creates a GPU backend drawing into `ctx`.
    fn new_gpu(&self, ctx: Box<dyn RenderContext>) -> anyhow::Result<Box<dyn Gpu>>;
}
